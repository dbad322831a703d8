// The ledger workbook: product codes come in through one column, discovered
// URLs and match flags go back out through the others.

use crate::error::LedgerError;
use crate::models::{CellRange, ProductCode};
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// An open workbook with one target sheet. Changes only reach the disk on
/// [`Ledger::save`].
pub struct Ledger {
    path: PathBuf,
    sheet_name: String,
    book: Spreadsheet,
}

impl Ledger {
    pub fn open(path: impl AsRef<Path>, sheet_name: &str) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let book = umya_spreadsheet::reader::xlsx::read(&path).map_err(|source| LedgerError::Open {
            path: path.display().to_string(),
            source,
        })?;
        if book.get_sheet_by_name(sheet_name).is_none() {
            return Err(LedgerError::MissingSheet(sheet_name.to_string()));
        }
        tracing::debug!(path = %path.display(), sheet = sheet_name, "Ledger opened");
        Ok(Self {
            path,
            sheet_name: sheet_name.to_string(),
            book,
        })
    }

    fn sheet(&self) -> Result<&Worksheet, LedgerError> {
        self.book
            .get_sheet_by_name(&self.sheet_name)
            .ok_or_else(|| LedgerError::MissingSheet(self.sheet_name.clone()))
    }

    fn sheet_mut(&mut self) -> Result<&mut Worksheet, LedgerError> {
        let name = self.sheet_name.clone();
        self.book
            .get_sheet_by_name_mut(&name)
            .ok_or(LedgerError::MissingSheet(name))
    }

    /// Reads the displayed values of a column range, in row order.
    ///
    /// With an explicit `row_end` every row is returned, blank or not, so that
    /// indexes stay aligned with rows. Without one, reading stops at the first
    /// blank cell.
    pub fn read_column(&self, range: &CellRange) -> Result<Vec<ProductCode>, LedgerError> {
        validate(range)?;
        let sheet = self.sheet()?;
        let column = range.column_start;

        let values = match range.row_end {
            Some(end) => (range.row_start..=end)
                .map(|row| sheet.get_value((column, row)).trim().to_string())
                .collect(),
            None => {
                let last = sheet.get_highest_row();
                (range.row_start..=last)
                    .map(|row| sheet.get_value((column, row)).trim().to_string())
                    .take_while(|value| !value.is_empty())
                    .collect()
            }
        };
        Ok(values)
    }

    /// Writes `value` into the cell of `range` that belongs to the product code
    /// at `index`.
    pub fn write(&mut self, range: &CellRange, index: usize, value: &str) -> Result<(), LedgerError> {
        validate(range)?;
        let cell = range.cell_for(index);
        self.sheet_mut()?.get_cell_mut(cell.as_str()).set_value_string(value);
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path).map_err(|source| LedgerError::Save {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Releases the workbook. Unsaved changes are discarded.
    pub fn close(self) {
        tracing::debug!(path = %self.path.display(), "Ledger closed");
    }
}

fn validate(range: &CellRange) -> Result<(), LedgerError> {
    if range.column_start == 0 || range.row_start == 0 {
        return Err(LedgerError::InvalidRange(format!(
            "columns and rows start at 1, got column {} row {}",
            range.column_start, range.row_start
        )));
    }
    if let Some(end) = range.row_end {
        if end < range.row_start {
            return Err(LedgerError::InvalidRange(format!(
                "row_end {} is before row_start {}",
                end, range.row_start
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const SHEET: &str = "Sheet1";

    /// Creates a workbook whose column A holds `codes` starting at row 2.
    pub(crate) fn workbook_with_codes(codes: &[&str]) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut(SHEET).unwrap();
        sheet.get_cell_mut("A1").set_value_string("Stok Kodu");
        for (i, code) in codes.iter().enumerate() {
            sheet.get_cell_mut((1, 2 + i as u32)).set_value_string(*code);
        }
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
        (dir, path)
    }

    pub(crate) fn codes_range() -> CellRange {
        CellRange {
            column_start: 1,
            row_start: 2,
            row_end: None,
        }
    }

    #[test]
    fn reads_codes_until_first_blank() {
        let (_dir, path) = workbook_with_codes(&["A1", "A2", "A3"]);
        let ledger = Ledger::open(&path, SHEET).unwrap();

        assert_eq!(ledger.read_column(&codes_range()).unwrap(), vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn explicit_row_end_keeps_blank_rows() {
        let (_dir, path) = workbook_with_codes(&["A1", "", "A3"]);
        let ledger = Ledger::open(&path, SHEET).unwrap();
        let range = CellRange {
            row_end: Some(5),
            ..codes_range()
        };

        assert_eq!(ledger.read_column(&range).unwrap(), vec!["A1", "", "A3", "", ""]);
    }

    #[test]
    fn written_values_survive_save_and_reopen() {
        let (_dir, path) = workbook_with_codes(&["A1", "A2"]);
        let urls = CellRange {
            column_start: 2,
            row_start: 2,
            row_end: None,
        };

        let mut ledger = Ledger::open(&path, SHEET).unwrap();
        ledger.write(&urls, 1, "https://example.com/p/2").unwrap();
        ledger.save().unwrap();
        ledger.close();

        let reopened = Ledger::open(&path, SHEET).unwrap();
        let sheet = reopened.sheet().unwrap();
        assert_eq!(sheet.get_value("B3"), "https://example.com/p/2");
        assert_eq!(sheet.get_value("B2"), "");
    }

    #[test]
    fn unsaved_writes_are_not_persisted() {
        let (_dir, path) = workbook_with_codes(&["A1"]);
        let urls = CellRange {
            column_start: 2,
            row_start: 2,
            row_end: None,
        };

        let mut ledger = Ledger::open(&path, SHEET).unwrap();
        ledger.write(&urls, 0, "lost").unwrap();
        ledger.close();

        let reopened = Ledger::open(&path, SHEET).unwrap();
        assert_eq!(reopened.sheet().unwrap().get_value("B2"), "");
    }

    #[test]
    fn missing_sheet_is_reported() {
        let (_dir, path) = workbook_with_codes(&["A1"]);

        assert!(matches!(
            Ledger::open(&path, "Ürünler"),
            Err(LedgerError::MissingSheet(name)) if name == "Ürünler"
        ));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            Ledger::open(dir.path().join("nope.xlsx"), SHEET),
            Err(LedgerError::Open { .. })
        ));
    }

    #[test]
    fn rejects_backwards_range() {
        let (_dir, path) = workbook_with_codes(&["A1"]);
        let ledger = Ledger::open(&path, SHEET).unwrap();
        let range = CellRange {
            column_start: 1,
            row_start: 5,
            row_end: Some(2),
        };

        assert!(matches!(ledger.read_column(&range), Err(LedgerError::InvalidRange(_))));
    }
}
