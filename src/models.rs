// Data structures shared between the drivers, the ledger and the report.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Product codes are opaque strings; they are the join key across every site.
pub type ProductCode = String;

/// Discovered product URLs for one marketplace, keyed by product code.
/// `None` means the marketplace search did not return a product link.
pub type UrlMap = HashMap<ProductCode, Option<String>>;

// Login details for one site. Supplied through configuration, never written out.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where a named column of values lives in the ledger sheet.
///
/// `column_start` is a 1-based column index (1 = `A`). The value for the
/// product code at position `i` always lives in row `row_start + i`, in every
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CellRange {
    pub column_start: u32,
    pub row_start: u32,
    // Only meaningful for the product-code range; when missing the codes run
    // until the first blank cell.
    #[serde(default)]
    pub row_end: Option<u32>,
}

impl CellRange {
    pub fn column_letter(&self) -> String {
        column_letter(self.column_start)
    }

    /// Row that holds the value for the product code at `index`.
    pub fn row_for(&self, index: usize) -> u32 {
        self.row_start + index as u32
    }

    /// Cell address (e.g. `B7`) for the product code at `index`.
    pub fn cell_for(&self, index: usize) -> String {
        format!("{}{}", self.column_letter(), self.row_for(index))
    }
}

/// Converts a 1-based column index to its spreadsheet letters (1 -> A, 27 -> AA).
pub fn column_letter(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Name and description scraped from one product page. Either may be absent
/// when the page does not show it; that is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub description: Option<String>,
}

// Outcome of comparing a marketplace product name with the Omniens name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFlag {
    Correct,
    Incorrect,
}

impl MatchFlag {
    /// Byte-for-byte equality. A missing name only matches another missing
    /// name.
    pub fn compare(marketplace_name: Option<&str>, internal_name: Option<&str>) -> Self {
        if marketplace_name == internal_name {
            MatchFlag::Correct
        } else {
            MatchFlag::Incorrect
        }
    }

    /// Localised marker written to the ledger.
    pub fn as_cell_value(&self) -> &'static str {
        match self {
            MatchFlag::Correct => "DOĞRU",
            MatchFlag::Incorrect => "YANLIŞ",
        }
    }
}

// One row of the description comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEntry {
    pub code: ProductCode,
    pub omniens_desc: Option<String>,
    pub trendyol_desc: Option<String>,
    pub hepsiburada_desc: Option<String>,
}

impl ComparisonEntry {
    /// Only codes with at least one marketplace description go into the report.
    pub fn has_marketplace_description(&self) -> bool {
        self.trendyol_desc.is_some() || self.hepsiburada_desc.is_some()
    }
}
