// Scripted in-memory session for driver tests.
//
// Pages are keyed by URL and hold a fixed set of elements. An element can
// navigate on click; the target URL may contain `{query}`, which is replaced by
// the last text typed into any element. Missing elements fail immediately with
// a timeout error instead of waiting; broken ones fail with a command error.

use super::{By, WebSession};
use crate::error::SessionError;
use fantoccini::error::CmdError;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    inner_html: String,
    navigates_to: Option<String>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn inner_html(mut self, html: &str) -> Self {
        self.inner_html = html.to_string();
        self
    }

    pub fn on_click(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<By, FakeElement>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: By, element: FakeElement) -> Self {
        self.elements.insert(target, element);
        self
    }
}

#[derive(Debug, Default)]
struct State {
    current_url: String,
    pages: HashMap<String, FakePage>,
    unreachable: HashSet<String>,
    broken: HashSet<By>,
    last_typed: String,
    typed: Vec<(By, String)>,
    cleared: Vec<By>,
    clicked: Vec<By>,
    visits: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeSession {
    state: RefCell<State>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.state.borrow_mut().pages.insert(url.to_string(), page);
        self
    }

    /// Navigating to `url` fails.
    pub fn unreachable(self, url: &str) -> Self {
        self.state.borrow_mut().unreachable.insert(url.to_string());
        self
    }

    /// Any lookup of `target` fails as if the WebDriver session were gone.
    pub fn broken(self, target: By) -> Self {
        self.state.borrow_mut().broken.insert(target);
        self
    }

    pub fn starting_at(self, url: &str) -> Self {
        self.state.borrow_mut().current_url = url.to_string();
        self
    }

    pub fn typed(&self) -> Vec<(By, String)> {
        self.state.borrow().typed.clone()
    }

    pub fn cleared(&self) -> Vec<By> {
        self.state.borrow().cleared.clone()
    }

    pub fn clicked(&self) -> Vec<By> {
        self.state.borrow().clicked.clone()
    }

    /// URLs reached through `goto`, in order.
    pub fn visits(&self) -> Vec<String> {
        self.state.borrow().visits.clone()
    }

    fn find(&self, target: By) -> Result<FakeElement, SessionError> {
        let state = self.state.borrow();
        if state.broken.contains(&target) {
            return Err(CmdError::NotJson("session lost".to_string()).into());
        }
        state
            .pages
            .get(&state.current_url)
            .and_then(|page| page.elements.get(&target))
            .cloned()
            .ok_or_else(|| SessionError::Timeout {
                what: target.to_string(),
                timeout: Duration::ZERO,
            })
    }
}

impl WebSession for FakeSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.state.borrow().current_url.clone())
    }

    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        if state.unreachable.contains(url) {
            return Err(SessionError::Timeout {
                what: format!("page {}", url),
                timeout: Duration::ZERO,
            });
        }
        state.current_url = url.to_string();
        state.visits.push(url.to_string());
        Ok(())
    }

    async fn send_keys(&self, target: By, text: &str, _timeout: Duration) -> Result<(), SessionError> {
        self.find(target)?;
        let mut state = self.state.borrow_mut();
        state.last_typed = text.to_string();
        state.typed.push((target, text.to_string()));
        Ok(())
    }

    async fn clear(&self, target: By, _timeout: Duration) -> Result<(), SessionError> {
        self.find(target)?;
        self.state.borrow_mut().cleared.push(target);
        Ok(())
    }

    async fn click(&self, target: By, _timeout: Duration) -> Result<(), SessionError> {
        let element = self.find(target)?;
        let mut state = self.state.borrow_mut();
        state.clicked.push(target);
        if let Some(url) = element.navigates_to {
            let url = url.replace("{query}", &state.last_typed);
            state.current_url = url;
        }
        Ok(())
    }

    async fn text(&self, target: By, _timeout: Duration) -> Result<String, SessionError> {
        Ok(self.find(target)?.text)
    }

    async fn attribute(&self, target: By, name: &str, _timeout: Duration) -> Result<Option<String>, SessionError> {
        Ok(self.find(target)?.attrs.get(name).cloned())
    }

    async fn inner_html(&self, target: By, _timeout: Duration) -> Result<String, SessionError> {
        Ok(self.find(target)?.inner_html)
    }

    async fn first_present(&self, targets: &[By], timeout: Duration) -> Result<usize, SessionError> {
        for (index, target) in targets.iter().enumerate() {
            match self.find(*target) {
                Ok(_) => return Ok(index),
                Err(SessionError::Timeout { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Err(SessionError::Timeout {
            what: format!("{:?}", targets),
            timeout,
        })
    }

    async fn wait_for_url(&self, urls: &[&str], timeout: Duration) -> Result<String, SessionError> {
        let current = self.state.borrow().current_url.clone();
        if urls.contains(&current.as_str()) {
            Ok(current)
        } else {
            Err(SessionError::Timeout {
                what: format!("url to be one of {:?}", urls),
                timeout,
            })
        }
    }
}
