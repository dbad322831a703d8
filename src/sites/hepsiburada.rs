// Hepsiburada merchant portal driver.
//
// Both the merchant portal and the storefront put a consent banner over the
// page until it is accepted, so it is dismissed before login and before each
// product page read.

use super::{
    CookieConsent, ListingSearch, LoginForm, Marketplace, ProductPage, open, read_product_page, search_listing,
    submit_login,
};
use crate::{
    browser::{By, WebSession},
    error::{AppError, AppResult},
    models::{Credentials, ProductRecord},
};
use std::time::Duration;

const SITE: &str = "Hepsiburada";

const LOGIN_URL: &str = "https://merchant.hepsiburada.com/v2/login";
const LOGGED_IN_URLS: &[&str] = &[
    "https://merchant.hepsiburada.com/v2/dashboard",
    "https://merchant.hepsiburada.com/v2/home",
];

const LOGIN_FORM: LoginForm<'static> = LoginForm {
    url: LOGIN_URL,
    username_input: By::Css(r#"input[name="username"]"#),
    password_input: By::Css(r#"input[name="password"]"#),
    submit: By::Css(r#"button[type="submit"]"#),
    logged_in_urls: LOGGED_IN_URLS,
    accept_cookies: true,
};

const PRODUCT_SEARCH: ListingSearch = ListingSearch {
    listing_url: "https://merchant.hepsiburada.com/v2/listings",
    search_input: By::Css(r#"input[data-testid="listing-search-input"]"#),
    submit: By::Css(r#"button[data-testid="listing-search-button"]"#),
    product_link: By::Css(r#"a[data-testid="listing-product-link"]"#),
    not_found: By::Css(r#"[data-testid="listing-empty-state"]"#),
};

const PRODUCT_PAGE: ProductPage = ProductPage {
    brand: Some(By::Css(r#"span.brand-name a"#)),
    title: By::Css("h1#product-name"),
    description: By::Css("div#productDescriptionContent"),
};

#[derive(Debug, Default)]
pub struct Hepsiburada {
    storefront_consent: CookieConsent,
}

impl Marketplace for Hepsiburada {
    fn name(&self) -> &'static str {
        SITE
    }

    async fn login<S: WebSession>(&self, session: &S, credentials: &Credentials, timeout: Duration) -> AppResult<()> {
        tracing::info!(site = SITE, "Logging in...");
        let landed = submit_login(session, &LOGIN_FORM, credentials, timeout)
            .await
            .map_err(AppError::login(SITE))?;
        tracing::info!(site = SITE, url = %landed, "Logged in.");
        Ok(())
    }

    async fn find_product_url<S: WebSession>(
        &self,
        session: &S,
        code: &str,
        timeout: Duration,
    ) -> AppResult<Option<String>> {
        search_listing(session, SITE, &PRODUCT_SEARCH, code, timeout).await
    }

    async fn fetch_product_info<S: WebSession>(
        &self,
        session: &S,
        url: &str,
        timeout: Duration,
    ) -> AppResult<ProductRecord> {
        open(session, url).await.map_err(AppError::web_driver(
            "Could not get product information, could not reach Hepsiburada product page.",
        ))?;
        self.storefront_consent.dismiss(session).await;
        Ok(read_product_page(session, SITE, &PRODUCT_PAGE, timeout).await)
    }
}
