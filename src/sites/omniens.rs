// Omniens, the internal product-information system. Used as the ground truth
// for product names. Unlike the marketplaces, a product page is addressed by
// its code, so there is no search step.

use super::{InternalCatalog, LoginForm, ProductPage, open, read_product_page, submit_login};
use crate::{
    browser::{By, WebSession},
    error::{AppError, AppResult},
    models::{Credentials, ProductRecord},
};
use std::time::Duration;
use url::Url;

const SITE: &str = "Omniens";

const USERNAME_INPUT: By = By::Css("input#username");
const PASSWORD_INPUT: By = By::Css("input#password");
const LOGIN_BUTTON: By = By::Css(r#"button[type="submit"]"#);

const PRODUCT_PAGE: ProductPage = ProductPage {
    brand: None,
    title: By::Css("#product-name"),
    description: By::Css("#product-description"),
};

#[derive(Debug, Clone)]
pub struct Omniens {
    login_url: String,
    logged_in_urls: Vec<String>,
    products_url: Url,
}

impl Omniens {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("omniens.base_url '{}': {}", base_url, e)))?;
        // Joining relative paths drops the last segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| AppError::Config(format!("omniens.base_url '{}': {}", base_url, e)))
        };

        Ok(Self {
            login_url: join("login")?.to_string(),
            logged_in_urls: vec![join("dashboard")?.to_string(), base.to_string()],
            products_url: join("products")?,
        })
    }

    /// Product page for `code`; the code is sent as a query parameter.
    pub fn product_url(&self, code: &str) -> String {
        let mut url = self.products_url.clone();
        url.query_pairs_mut().append_pair("code", code);
        url.to_string()
    }
}

impl InternalCatalog for Omniens {
    fn name(&self) -> &'static str {
        SITE
    }

    async fn login<S: WebSession>(&self, session: &S, credentials: &Credentials, timeout: Duration) -> AppResult<()> {
        tracing::info!(site = SITE, "Logging in...");
        let logged_in: Vec<&str> = self.logged_in_urls.iter().map(String::as_str).collect();
        let form = LoginForm {
            url: &self.login_url,
            username_input: USERNAME_INPUT,
            password_input: PASSWORD_INPUT,
            submit: LOGIN_BUTTON,
            logged_in_urls: &logged_in,
            accept_cookies: false,
        };
        let landed = submit_login(session, &form, credentials, timeout)
            .await
            .map_err(AppError::login(SITE))?;
        tracing::info!(site = SITE, url = %landed, "Logged in.");
        Ok(())
    }

    async fn fetch_product_info<S: WebSession>(
        &self,
        session: &S,
        code: &str,
        timeout: Duration,
    ) -> AppResult<ProductRecord> {
        let url = self.product_url(code);
        open(session, &url).await.map_err(AppError::web_driver(format!(
            "Could not get product information, could not reach Omniens page for {}.",
            code
        )))?;
        Ok(read_product_page(session, SITE, &PRODUCT_PAGE, timeout).await)
    }
}
