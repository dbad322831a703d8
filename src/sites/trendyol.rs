// Trendyol partner portal driver.

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

const SITE: &str = "Trendyol";

const LOGIN_URL: &str = "https://partner.trendyol.com/account/login";
const LOGGED_IN_URLS: &[&str] = &[
    "https://partner.trendyol.com/dashboard",
    "https://partner.trendyol.com/account/info?tab=contractAndDocuments&openApproveModal=true",
];

const LOGIN_FORM: LoginForm<'static> = LoginForm {
    url: LOGIN_URL,
    username_input: By::XPath(r#"//div[@class="email-phone g-input"]//input"#),
    password_input: By::XPath(r#"//div[@class="password g-input"]//input"#),
    submit: By::XPath(
        r#"//button[@class="invisible-captcha-btn btn btn-lg btn-mp-primary btn-block g-button -primary"]"#,
    ),
    logged_in_urls: LOGGED_IN_URLS,
    accept_cookies: true,
};

const PRODUCT_SEARCH: ListingSearch = ListingSearch {
    listing_url: "https://partner.trendyol.com/product-listing/all-products",
    search_input: By::XPath(r#"//bl-input[@cy-id="stockCodeFilter"]"#),
    submit: By::XPath(r#"//bl-button[@cy-id="submitFilter"]"#),
    product_link: By::XPath("//sc-product-info"),
    not_found: By::XPath(r#"//*[@cy-id="emptyState"]"#),
};

const PRODUCT_PAGE: ProductPage = ProductPage {
    brand: Some(By::XPath(r#"//div[@class="product-detail-wrapper"]//h1[@class="pr-new-br"]/a"#)),
    title: By::XPath(r#"//div[@class="product-detail-wrapper"]//h1[@class="pr-new-br"]/span"#),
    description: By::XPath(r#"//div[@class="info-wrapper"]"#),
};

#[derive(Debug, Default)]
pub struct Trendyol {
    storefront_consent: CookieConsent,
}

impl Marketplace for Trendyol {
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
            "Could not get product information, could not reach Trendyol product page.",
        ))?;
        // The storefront shows its own consent banner on first visit.
        self.storefront_consent.dismiss(session).await;
        Ok(read_product_page(session, SITE, &PRODUCT_PAGE, timeout).await)
    }
}
