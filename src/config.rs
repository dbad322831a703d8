// Configuration loading.
// Defaults, then an optional config.toml, then APP_-prefixed environment
// variables (nested keys separated by "__", e.g. APP_CREDENTIALS__TRENDYOL__PASSWORD).

use crate::models::{CellRange, Credentials};
use anyhow::Result;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub webdriver: WebDriverSettings,
    pub timeouts: TimeoutSettings,
    pub ledger: LedgerSettings,
    pub report: ReportSettings,
    pub omniens: OmniensSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Deserialize)]
pub struct WebDriverSettings {
    pub url: String,
    pub headless: bool,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct TimeoutSettings {
    pub login_secs: u64,
    pub lookup_secs: u64,
}

impl TimeoutSettings {
    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn lookup(&self) -> Duration {
        Duration::from_secs(self.lookup_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    pub path: PathBuf,
    pub sheet_name: String,
    pub product_codes: CellRange,
    pub trendyol_urls: CellRange,
    pub hepsiburada_urls: CellRange,
    pub trendyol_matches: CellRange,
    pub hepsiburada_matches: CellRange,
}

#[derive(Debug, Deserialize)]
pub struct ReportSettings {
    pub output_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OmniensSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialSettings {
    pub trendyol: Credentials,
    pub hepsiburada: Credentials,
    pub omniens: Credentials,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let builder = Config::builder()
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            .add_source(environment());
        Self::from_builder(builder)
    }

    // Values are left as strings; serde converts the numeric and boolean ones.
    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .set_default("webdriver.url", "http://localhost:4444")?
            .set_default("webdriver.headless", false)?
            .set_default("webdriver.poll_interval_ms", 250)?
            .set_default("timeouts.login_secs", 300)?
            .set_default("timeouts.lookup_secs", 3)?
            .set_default("report.output_path", "temp/product_description_comparison.html")?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("APP").prefix_separator("_").separator("__")
}
