// Description comparison report.
//
// The whole document is rendered again from every accumulated entry each time
// one is added, so the file on disk always reflects the run so far.

use crate::error::ReportError;
use crate::models::ComparisonEntry;
use askama::Template;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Template)]
#[template(path = "product_desc_comparison.html")]
struct ComparisonTemplate<'a> {
    products: &'a [ComparisonEntry],
    generated_at: String,
}

pub struct ComparisonReport {
    output_path: PathBuf,
    entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ComparisonEntry] {
        &self.entries
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Adds an entry and rewrites the report file.
    pub fn append(&mut self, entry: ComparisonEntry) -> Result<(), ReportError> {
        self.entries.push(entry);
        self.write()
    }

    pub fn render(&self) -> Result<String, ReportError> {
        let template = ComparisonTemplate {
            products: &self.entries,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        Ok(template.render()?)
    }

    fn write(&self) -> Result<(), ReportError> {
        let html = self.render()?;
        let io_err = |source| ReportError::Write {
            path: self.output_path.display().to_string(),
            source,
        };
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(&self.output_path, html).map_err(io_err)?;
        tracing::debug!(path = %self.output_path.display(), entries = self.entries.len(), "Comparison report written");
        Ok(())
    }
}
