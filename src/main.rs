use anyhow::{Context, Result};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::browser::{BrowserSession, SessionOptions};
use crate::config::Settings;
use crate::service::ProductContentService;
use crate::sites::{Hepsiburada, Omniens, Trendyol};

// Declare modules
mod browser;
mod config;
mod error;
mod ledger;
mod markup;
mod models;
mod report;
mod service;
mod sites;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "product_content_rust=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Starting product content check...");

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    let omniens = Omniens::new(&settings.omniens.base_url).context("Invalid Omniens configuration")?;
    let service = ProductContentService::new(
        settings.ledger.clone(),
        settings.report.output_path.clone(),
        settings.timeouts.login(),
        settings.timeouts.lookup(),
    );

    let session = BrowserSession::connect(&SessionOptions {
        webdriver_url: settings.webdriver.url.clone(),
        headless: settings.webdriver.headless,
        poll_interval: Duration::from_millis(settings.webdriver.poll_interval_ms),
    })
    .await
    .with_context(|| format!("Failed to connect to WebDriver at {}", settings.webdriver.url))?;

    // The session is closed whether the run succeeds or not.
    let outcome = service
        .run(&session, &Trendyol::default(), &Hepsiburada::default(), &omniens, &settings.credentials)
        .await;
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    let report = outcome
        .inspect_err(|e| tracing::error!("Run aborted: {}", e))
        .context("Product content check aborted")?;
    tracing::info!(
        "Done. {} products in the comparison report at {}.",
        report.entries().len(),
        report.output_path().display()
    );
    Ok(())
}
