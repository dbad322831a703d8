// Error types shared by the drivers, the ledger and the report.
//
// Hard failures (login, mandatory navigation) go through `AppError` and abort
// the run. Per-product fields that cannot be read are `Option::None` and never
// show up here.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a browser session for a single UI action.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
    #[error(transparent)]
    Command(#[from] fantoccini::error::CmdError),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open workbook {path}")]
    Open {
        path: String,
        #[source]
        source: umya_spreadsheet::XlsxError,
    },
    #[error("failed to save workbook {path}")]
    Save {
        path: String,
        #[source]
        source: umya_spreadsheet::XlsxError,
    },
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),
    #[error("invalid cell range: {0}")]
    InvalidRange(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render comparison template")]
    Render(#[from] askama::Error),
    #[error("failed to write report to {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// Top-level application error. Login and WebDriver are the two fatal
// automation failures; the cause is always chained.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not log in to {site}")]
    Login {
        site: &'static str,
        #[source]
        source: SessionError,
    },
    #[error("{context}")]
    WebDriver {
        context: String,
        #[source]
        source: SessionError,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn login(site: &'static str) -> impl FnOnce(SessionError) -> AppError {
        move |source| AppError::Login { site, source }
    }

    pub fn web_driver(context: impl Into<String>) -> impl FnOnce(SessionError) -> AppError {
        let context = context.into();
        move |source| AppError::WebDriver { context, source }
    }
}

// Define a custom Result type using our AppError
pub type AppResult<T> = Result<T, AppError>;
