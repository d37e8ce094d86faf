use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// Nothing matched within the wait bound. Callers treat this as absence.
    #[error("timed out waiting for {selector}")]
    Timeout { selector: String },
    /// The element vanished from the page while it was being read.
    #[error("stale element reference")]
    StaleElement,
    #[error("invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("no page loaded")]
    NoPage,
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
}

/// Snapshot of one element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageElement {
    attributes: HashMap<String, String>,
    text: String,
}

impl PageElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            attributes: HashMap::new(),
            text: text.into(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A single page session: one focused page at a time.
///
/// Waits are bounded; an unmet wait yields [`NavError::Timeout`], never blocks.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), NavError>;

    async fn wait_for_elements(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<PageElement>, NavError>;

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<PageElement, NavError> {
        self.wait_for_elements(selector, timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| NavError::Timeout {
                selector: selector.to_string(),
            })
    }

    /// Asks the page to load more content (page down).
    async fn trigger_scroll(&self) -> Result<(), NavError>;

    /// Releases the session. Called once, on every exit path of a run.
    async fn close(&self) {}
}

/// CSS selectors for the parts of a pin's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelectors {
    pub asset_image: String,
    pub title: String,
    pub source_link: String,
    pub caption: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            asset_image: "div[class='Pj7 sLG XiG eEj m1e'] > div[class='XiG zI7 iyn Hsu'] > img"
                .to_string(),
            title: "h1[class='lH1 dyH iFc ky3 pBj DrD IZT']".to_string(),
            source_link: "div[class='Jea jzS zI7 iyn Hsu'] a[class='linkModuleActionButton']"
                .to_string(),
            caption: "span[class='tBJ dyH iFc MF7 pBj DrD IZT swG']".to_string(),
        }
    }
}
