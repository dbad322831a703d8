// Site drivers: one per marketplace portal plus the internal catalog.
//
// The sequences shared by every site live here. Each driver owns its own URLs
// and selectors and decides how the steps are combined.

use crate::{
    browser::{By, WebSession},
    error::{AppError, AppResult, SessionError},
    markup,
    models::{Credentials, ProductRecord},
};
use std::cell::Cell;
use std::time::Duration;

pub mod hepsiburada;
pub mod omniens;
pub mod trendyol;

pub use hepsiburada::Hepsiburada;
pub use omniens::Omniens;
pub use trendyol::Trendyol;

// OneTrust consent banner, used by both marketplaces.
const COOKIE_ACCEPT: By = By::Css("#onetrust-accept-btn-handler");
const COOKIE_TIMEOUT: Duration = Duration::from_secs(2);
const COOKIE_RECHECK_TIMEOUT: Duration = Duration::from_millis(250);

/// A marketplace partner portal: log in, find a product's public URL by code,
/// read the product page.
#[allow(async_fn_in_trait)]
pub trait Marketplace {
    fn name(&self) -> &'static str;

    /// Fails with `AppError::Login` when the login form or the logged-in page
    /// does not show up within `timeout`.
    async fn login<S: WebSession>(&self, session: &S, credentials: &Credentials, timeout: Duration) -> AppResult<()>;

    /// `Ok(None)` when the search ran but found no product. Failing to reach
    /// the listing page or submit the search is `AppError::WebDriver`.
    async fn find_product_url<S: WebSession>(
        &self,
        session: &S,
        code: &str,
        timeout: Duration,
    ) -> AppResult<Option<String>>;

    /// Only navigation can fail; name and description are read independently
    /// and are `None` when missing.
    async fn fetch_product_info<S: WebSession>(
        &self,
        session: &S,
        url: &str,
        timeout: Duration,
    ) -> AppResult<ProductRecord>;
}

/// The internal product-information system, addressed directly by product code.
#[allow(async_fn_in_trait)]
pub trait InternalCatalog {
    fn name(&self) -> &'static str;

    async fn login<S: WebSession>(&self, session: &S, credentials: &Credentials, timeout: Duration) -> AppResult<()>;

    async fn fetch_product_info<S: WebSession>(
        &self,
        session: &S,
        code: &str,
        timeout: Duration,
    ) -> AppResult<ProductRecord>;
}

// Selectors and URLs of a username/password login form.
pub(crate) struct LoginForm<'a> {
    pub url: &'a str,
    pub username_input: By,
    pub password_input: By,
    pub submit: By,
    pub logged_in_urls: &'a [&'a str],
    pub accept_cookies: bool,
}

pub(crate) async fn submit_login<S: WebSession>(
    session: &S,
    form: &LoginForm<'_>,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<String, SessionError> {
    open(session, form.url).await?;
    if form.accept_cookies {
        dismiss_cookie_banner(session).await;
    }
    session.send_keys(form.username_input, &credentials.username, timeout).await?;
    session.send_keys(form.password_input, &credentials.password, timeout).await?;
    session.click(form.submit, timeout).await?;
    session.wait_for_url(form.logged_in_urls, timeout).await
}

// Selectors of a partner-portal product listing with a code filter.
pub(crate) struct ListingSearch {
    pub listing_url: &'static str,
    pub search_input: By,
    pub submit: By,
    pub product_link: By,
    pub not_found: By,
}

pub(crate) async fn search_listing<S: WebSession>(
    session: &S,
    site: &str,
    search: &ListingSearch,
    code: &str,
    timeout: Duration,
) -> AppResult<Option<String>> {
    open(session, search.listing_url)
        .await
        .map_err(AppError::web_driver(format!("Could not reach {} partner products page.", site)))?;

    let search_failed =
        |e: SessionError| AppError::web_driver(format!("Error during {} product search.", site))(e);
    let submitted: Result<(), SessionError> = async {
        session.clear(search.search_input, timeout).await?;
        session.send_keys(search.search_input, code, timeout).await?;
        session.click(search.submit, timeout).await
    }
    .await;
    submitted.map_err(search_failed)?;

    // Nothing showing up in time means not found. A broken session does not.
    match session.first_present(&[search.product_link, search.not_found], timeout).await {
        Ok(0) => match session.attribute(search.product_link, "href", timeout).await {
            Ok(Some(href)) if !href.trim().is_empty() => Ok(Some(href)),
            Ok(_) => {
                tracing::debug!(site, code, "Product link has no href");
                Ok(None)
            }
            Err(e @ SessionError::Timeout { .. }) => {
                tracing::debug!(site, code, error = %e, "Could not read product link");
                Ok(None)
            }
            Err(e) => Err(search_failed(e)),
        },
        Ok(_) => {
            tracing::debug!(site, code, "Search reported no results");
            Ok(None)
        }
        Err(e @ SessionError::Timeout { .. }) => {
            tracing::debug!(site, code, error = %e, "No search result appeared");
            Ok(None)
        }
        Err(e) => Err(search_failed(e)),
    }
}

// Selectors of a product detail page.
pub(crate) struct ProductPage {
    pub brand: Option<By>,
    pub title: By,
    pub description: By,
}

/// Reads name and description from the page the session is currently on.
pub(crate) async fn read_product_page<S: WebSession>(
    session: &S,
    site: &str,
    page: &ProductPage,
    timeout: Duration,
) -> ProductRecord {
    let brand = match page.brand {
        Some(target) => read_text(session, site, target, timeout).await,
        None => None,
    };
    let title = read_text(session, site, page.title, timeout).await;

    let description = match session.inner_html(page.description, timeout).await {
        Ok(html) => markup::child_elements_html(&html),
        Err(e) => {
            tracing::debug!(site, error = %e, "Description not found");
            None
        }
    };

    ProductRecord {
        name: markup::join_name(brand, title),
        description,
    }
}

async fn read_text<S: WebSession>(session: &S, site: &str, target: By, timeout: Duration) -> Option<String> {
    match session.text(target, timeout).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(site, %target, error = %e, "Text not found");
            None
        }
    }
}

/// Navigates to `url` unless the session is already there.
pub(crate) async fn open<S: WebSession>(session: &S, url: &str) -> Result<(), SessionError> {
    if session.current_url().await? != url {
        session.goto(url).await?;
    }
    Ok(())
}

/// Clicks the consent banner if it shows up. Missing banner is fine.
pub(crate) async fn dismiss_cookie_banner<S: WebSession>(session: &S) {
    accept_cookie_banner(session, COOKIE_TIMEOUT).await;
}

async fn accept_cookie_banner<S: WebSession>(session: &S, wait: Duration) -> bool {
    match session.click(COOKIE_ACCEPT, wait).await {
        Ok(()) => {
            tracing::debug!("Cookie banner accepted");
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "No cookie banner to accept");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ConsentState {
    #[default]
    Unchecked,
    Absent,
    Accepted,
}

/// Consent banner state of one storefront for the lifetime of a driver.
///
/// The banner is waited for on the first product page only. Once accepted it
/// never shows again; if the first page had none, later pages take a short look.
#[derive(Debug, Default)]
pub(crate) struct CookieConsent {
    state: Cell<ConsentState>,
}

impl CookieConsent {
    pub(crate) async fn dismiss<S: WebSession>(&self, session: &S) {
        let wait = match self.state.get() {
            ConsentState::Accepted => return,
            ConsentState::Unchecked => COOKIE_TIMEOUT,
            ConsentState::Absent => COOKIE_RECHECK_TIMEOUT,
        };
        let state = if accept_cookie_banner(session, wait).await {
            ConsentState::Accepted
        } else {
            ConsentState::Absent
        };
        self.state.set(state);
    }
}
