// Product content service: reads product codes from the ledger, discovers
// each product's URL on every marketplace, then compares marketplace names and
// descriptions against Omniens.
//
// Everything runs one code at a time on a single browser session. The ledger
// is saved after every cell written, so an aborted run loses at most the row
// that was in flight.

use crate::{
    browser::WebSession,
    config::{CredentialSettings, LedgerSettings},
    error::AppResult,
    ledger::Ledger,
    models::{CellRange, ComparisonEntry, Credentials, MatchFlag, ProductCode, UrlMap},
    report::ComparisonReport,
    sites::{InternalCatalog, Marketplace},
};
use std::path::PathBuf;
use std::time::Duration;

pub struct ProductContentService {
    ledger: LedgerSettings,
    report_path: PathBuf,
    login_timeout: Duration,
    lookup_timeout: Duration,
}

// A marketplace together with what the URL pass found on it and where its
// match flags go.
pub struct MarketplaceListing<'a, M> {
    pub marketplace: &'a M,
    pub urls: &'a UrlMap,
    pub match_cells: CellRange,
}

impl<M> MarketplaceListing<'_, M> {
    fn url_for(&self, code: &str) -> Option<&str> {
        self.urls.get(code).and_then(|url| url.as_deref())
    }
}

impl ProductContentService {
    pub fn new(
        ledger: LedgerSettings,
        report_path: PathBuf,
        login_timeout: Duration,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            report_path,
            login_timeout,
            lookup_timeout,
        }
    }

    fn open_ledger(&self) -> AppResult<Ledger> {
        Ok(Ledger::open(&self.ledger.path, &self.ledger.sheet_name)?)
    }

    /// Reads the product codes, in row order. Their position is the index used
    /// for every later write.
    pub fn get_product_codes(&self) -> AppResult<Vec<ProductCode>> {
        let ledger = self.open_ledger()?;
        let codes = ledger.read_column(&self.ledger.product_codes)?;
        ledger.close();
        tracing::info!("Read {} product codes from the ledger.", codes.len());
        Ok(codes)
    }

    /// Logs in to `marketplace`, looks up every code and writes the URL (or an
    /// empty string) into `url_cells`.
    pub async fn save_product_urls<S: WebSession, M: Marketplace>(
        &self,
        session: &S,
        marketplace: &M,
        credentials: &Credentials,
        url_cells: &CellRange,
        product_codes: &[ProductCode],
    ) -> AppResult<UrlMap> {
        let site = marketplace.name();
        let mut ledger = self.open_ledger()?;
        let mut product_urls = UrlMap::new();

        marketplace.login(session, credentials, self.login_timeout).await?;

        for (i, code) in product_codes.iter().enumerate() {
            let row = url_cells.row_for(i);
            let product_url = if code.is_empty() {
                tracing::debug!(row, "Blank product code, skipping search");
                None
            } else {
                marketplace.find_product_url(session, code, self.lookup_timeout).await?
            };

            match &product_url {
                Some(url) => {
                    ledger.write(url_cells, i, url)?;
                    tracing::info!("{} - {} - {} URL: {}", row, code, site, url);
                }
                None => {
                    ledger.write(url_cells, i, "")?;
                    tracing::info!("{} - {} - Not Found On {}", row, code, site);
                }
            }
            ledger.save()?;
            product_urls.insert(code.clone(), product_url);
        }

        ledger.close();
        let found = product_urls.values().filter(|url| url.is_some()).count();
        tracing::info!(site, found, total = product_codes.len(), "URL pass complete.");
        Ok(product_urls)
    }

    /// Compares each marketplace listing found in the URL passes with Omniens.
    ///
    /// Match flags are written only for codes that have a URL on that
    /// marketplace. Codes with at least one marketplace description are added
    /// to the report, which is rewritten after every addition.
    pub async fn compare_product_info<S, C, A, B>(
        &self,
        session: &S,
        catalog: &C,
        catalog_credentials: &Credentials,
        trendyol: MarketplaceListing<'_, A>,
        hepsiburada: MarketplaceListing<'_, B>,
        product_codes: &[ProductCode],
    ) -> AppResult<ComparisonReport>
    where
        S: WebSession,
        C: InternalCatalog,
        A: Marketplace,
        B: Marketplace,
    {
        let mut ledger = self.open_ledger()?;
        let mut report = ComparisonReport::new(&self.report_path);

        catalog.login(session, catalog_credentials, self.login_timeout).await?;

        for (i, code) in product_codes.iter().enumerate() {
            if code.is_empty() {
                continue;
            }
            let internal = catalog.fetch_product_info(session, code, self.lookup_timeout).await?;
            let internal_name = internal.name.as_deref();

            let trendyol_desc = self
                .check_listing(session, &mut ledger, &trendyol, i, code, internal_name)
                .await?;
            let hepsiburada_desc = self
                .check_listing(session, &mut ledger, &hepsiburada, i, code, internal_name)
                .await?;

            let entry = ComparisonEntry {
                code: code.clone(),
                omniens_desc: internal.description,
                trendyol_desc,
                hepsiburada_desc,
            };
            if entry.has_marketplace_description() {
                report.append(entry)?;
            }
        }

        ledger.close();
        tracing::info!(
            site = catalog.name(),
            entries = report.entries().len(),
            path = %report.output_path().display(),
            "Comparison pass complete."
        );
        Ok(report)
    }

    // Fetches the marketplace record for `code` if the URL pass found one,
    // writes the match flag and returns the description.
    async fn check_listing<S: WebSession, M: Marketplace>(
        &self,
        session: &S,
        ledger: &mut Ledger,
        listing: &MarketplaceListing<'_, M>,
        index: usize,
        code: &str,
        internal_name: Option<&str>,
    ) -> AppResult<Option<String>> {
        let Some(url) = listing.url_for(code) else {
            return Ok(None);
        };
        let site = listing.marketplace.name();
        let record = listing
            .marketplace
            .fetch_product_info(session, url, self.lookup_timeout)
            .await?;

        let flag = MatchFlag::compare(record.name.as_deref(), internal_name);
        ledger.write(&listing.match_cells, index, flag.as_cell_value())?;
        ledger.save()?;
        tracing::info!(
            "{} - {} - {} name: {}",
            listing.match_cells.row_for(index),
            code,
            site,
            flag.as_cell_value()
        );
        if flag == MatchFlag::Incorrect {
            tracing::debug!(
                site,
                code,
                marketplace_name = ?record.name,
                internal_name = ?internal_name,
                "Product name mismatch"
            );
        }
        Ok(record.description)
    }

    /// Runs the full sequence: read codes, Trendyol URLs, Hepsiburada URLs,
    /// comparison. The first login or navigation failure aborts the run.
    pub async fn run<S, A, B, C>(
        &self,
        session: &S,
        trendyol: &A,
        hepsiburada: &B,
        catalog: &C,
        credentials: &CredentialSettings,
    ) -> AppResult<ComparisonReport>
    where
        S: WebSession,
        A: Marketplace,
        B: Marketplace,
        C: InternalCatalog,
    {
        let product_codes = self.get_product_codes()?;

        let trendyol_urls = self
            .save_product_urls(
                session,
                trendyol,
                &credentials.trendyol,
                &self.ledger.trendyol_urls,
                &product_codes,
            )
            .await?;
        let hepsiburada_urls = self
            .save_product_urls(
                session,
                hepsiburada,
                &credentials.hepsiburada,
                &self.ledger.hepsiburada_urls,
                &product_codes,
            )
            .await?;

        self.compare_product_info(
            session,
            catalog,
            &credentials.omniens,
            MarketplaceListing {
                marketplace: trendyol,
                urls: &trendyol_urls,
                match_cells: self.ledger.trendyol_matches,
            },
            MarketplaceListing {
                marketplace: hepsiburada,
                urls: &hepsiburada_urls,
                match_cells: self.ledger.hepsiburada_matches,
            },
            &product_codes,
        )
        .await
    }
}
