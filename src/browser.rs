// Browser session abstraction used by every site driver.
//
// Each operation waits at most once for its target, bounded by the timeout the
// caller passes in. There is no retry here; the drivers decide whether a
// failure is fatal or just means "not present".

use crate::error::SessionError;
use fantoccini::{Client, ClientBuilder, Locator, elements::Element};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, sleep};

#[cfg(test)]
pub mod fake;

// How often `first_present` and `wait_for_url` re-check the page.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// An element target on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Css(&'static str),
    XPath(&'static str),
}

impl By {
    fn locator(self) -> Locator<'static> {
        match self {
            By::Css(selector) => Locator::Css(selector),
            By::XPath(path) => Locator::XPath(path),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Css(selector) => write!(f, "css `{}`", selector),
            By::XPath(path) => write!(f, "xpath `{}`", path),
        }
    }
}

/// The operations the site drivers need from a browser session.
///
/// Element operations first wait for the target to be present (at most
/// `timeout`) and then act on it.
#[allow(async_fn_in_trait)]
pub trait WebSession {
    async fn current_url(&self) -> Result<String, SessionError>;

    async fn goto(&self, url: &str) -> Result<(), SessionError>;

    async fn send_keys(&self, target: By, text: &str, timeout: Duration) -> Result<(), SessionError>;

    async fn clear(&self, target: By, timeout: Duration) -> Result<(), SessionError>;

    async fn click(&self, target: By, timeout: Duration) -> Result<(), SessionError>;

    async fn text(&self, target: By, timeout: Duration) -> Result<String, SessionError>;

    async fn attribute(&self, target: By, name: &str, timeout: Duration) -> Result<Option<String>, SessionError>;

    /// Inner markup of the target element.
    async fn inner_html(&self, target: By, timeout: Duration) -> Result<String, SessionError>;

    /// Waits until any of `targets` is present and returns the index of the
    /// first one found, in the order given. Only "not present yet" is retried;
    /// other WebDriver failures are returned immediately.
    async fn first_present(&self, targets: &[By], timeout: Duration) -> Result<usize, SessionError>;

    /// Waits until the current URL is one of `urls` and returns it.
    async fn wait_for_url(&self, urls: &[&str], timeout: Duration) -> Result<String, SessionError>;
}

/// Connection options for the WebDriver server.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub poll_interval: Duration,
}

/// A live WebDriver session backed by fantoccini.
pub struct BrowserSession {
    client: Client,
    poll_interval: Duration,
}

impl BrowserSession {
    pub async fn connect(options: &SessionOptions) -> anyhow::Result<Self> {
        let mut capabilities = serde_json::Map::new();
        if options.headless {
            capabilities.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new", "--window-size=1920,1080"] }),
            );
            capabilities.insert("moz:firefoxOptions".to_string(), json!({ "args": ["--headless"] }));
        }

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&options.webdriver_url)
            .await?;
        tracing::info!(webdriver = %options.webdriver_url, headless = options.headless, "Browser session started.");

        let poll_interval = if options.poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            options.poll_interval
        };
        Ok(Self { client, poll_interval })
    }

    /// Ends the WebDriver session. Consumes the handle so it cannot be used afterwards.
    pub async fn close(self) -> Result<(), SessionError> {
        self.client.close().await?;
        tracing::info!("Browser session closed.");
        Ok(())
    }

    async fn element(&self, target: By, timeout: Duration) -> Result<Element, SessionError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(target.locator())
            .await
            .map_err(|e| match e {
                fantoccini::error::CmdError::WaitTimeout => SessionError::Timeout {
                    what: target.to_string(),
                    timeout,
                },
                other => SessionError::Command(other),
            })
    }
}

impl WebSession for BrowserSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        tracing::debug!(url, "Navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn send_keys(&self, target: By, text: &str, timeout: Duration) -> Result<(), SessionError> {
        self.element(target, timeout).await?.send_keys(text).await?;
        Ok(())
    }

    async fn clear(&self, target: By, timeout: Duration) -> Result<(), SessionError> {
        self.element(target, timeout).await?.clear().await?;
        Ok(())
    }

    async fn click(&self, target: By, timeout: Duration) -> Result<(), SessionError> {
        self.element(target, timeout).await?.click().await?;
        Ok(())
    }

    async fn text(&self, target: By, timeout: Duration) -> Result<String, SessionError> {
        Ok(self.element(target, timeout).await?.text().await?)
    }

    async fn attribute(&self, target: By, name: &str, timeout: Duration) -> Result<Option<String>, SessionError> {
        Ok(self.element(target, timeout).await?.attr(name).await?)
    }

    async fn inner_html(&self, target: By, timeout: Duration) -> Result<String, SessionError> {
        Ok(self.element(target, timeout).await?.html(true).await?)
    }

    async fn first_present(&self, targets: &[By], timeout: Duration) -> Result<usize, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            for (index, target) in targets.iter().enumerate() {
                match self.client.find(target.locator()).await {
                    Ok(_) => return Ok(index),
                    // Expected while the page loads; anything else is a real failure.
                    Err(e) if e.is_no_such_element() => {}
                    Err(e) => return Err(e.into()),
                }
            }
            if Instant::now() >= deadline {
                let what = targets.iter().map(ToString::to_string).collect::<Vec<_>>().join(" or ");
                return Err(SessionError::Timeout { what, timeout });
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn wait_for_url(&self, urls: &[&str], timeout: Duration) -> Result<String, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            let current = self.current_url().await?;
            if urls.contains(&current.as_str()) {
                return Ok(current);
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: format!("url to be one of {:?} (currently {})", urls, current),
                    timeout,
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
