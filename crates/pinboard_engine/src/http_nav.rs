use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::{decode_page, is_html};
use crate::navigate::{NavError, Navigator, PageElement};
use crate::Fetcher;
use pinboard_logging::{pinboard_debug, pinboard_trace};

/// Navigator over server-rendered HTML.
///
/// Each `navigate` fetches the page once and selectors run against that
/// snapshot. The snapshot never changes, so waits resolve immediately and
/// scrolling is a no-op; a board served this way stalls after its first
/// batch.
pub struct HttpNavigator {
    fetcher: Arc<dyn Fetcher>,
    page: Mutex<Option<LoadedPage>>,
}

#[derive(Clone)]
struct LoadedPage {
    base_url: Url,
    html: String,
}

impl HttpNavigator {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            page: Mutex::new(None),
        }
    }

    fn current_page(&self) -> Option<LoadedPage> {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&self, url: &str) -> Result<(), NavError> {
        let nav_error = |message: String| NavError::Navigation {
            url: url.to_string(),
            message,
        };
        let requested = Url::parse(url).map_err(|err| nav_error(err.to_string()))?;
        let output = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|err| nav_error(err.to_string()))?;

        let content_type = output.metadata.content_type.as_deref();
        if !is_html(content_type) {
            return Err(nav_error(format!(
                "not an html page: {}",
                content_type.unwrap_or_default()
            )));
        }

        let decoded = decode_page(&output.bytes, content_type);
        let base_url = Url::parse(&output.metadata.final_url).unwrap_or(requested);
        pinboard_debug!(
            "Loaded {} ({} bytes, {})",
            base_url,
            output.bytes.len(),
            decoded.encoding_label
        );

        *self.page.lock().unwrap_or_else(PoisonError::into_inner) = Some(LoadedPage {
            base_url,
            html: decoded.html,
        });
        Ok(())
    }

    async fn wait_for_elements(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Vec<PageElement>, NavError> {
        let page = self.current_page().ok_or(NavError::NoPage)?;
        let elements = select_elements(&page, selector)?;
        if elements.is_empty() {
            return Err(NavError::Timeout {
                selector: selector.to_string(),
            });
        }
        Ok(elements)
    }

    async fn trigger_scroll(&self) -> Result<(), NavError> {
        pinboard_trace!("Scroll requested on a static page; nothing to load");
        Ok(())
    }

    async fn close(&self) {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

fn select_elements(page: &LoadedPage, selector: &str) -> Result<Vec<PageElement>, NavError> {
    let parsed = Selector::parse(selector).map_err(|err| NavError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })?;
    let document = Html::parse_document(&page.html);
    Ok(document
        .select(&parsed)
        .map(|element| snapshot(element, &page.base_url))
        .collect())
}

fn snapshot(element: ElementRef, base_url: &Url) -> PageElement {
    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut snapshot = PageElement::new(text);
    for (name, value) in element.value().attrs() {
        // Like a browser's href/src properties: always absolute.
        let value = match name {
            "href" | "src" => resolve_url(value, base_url).unwrap_or_else(|| value.to_string()),
            _ => value.to_string(),
        };
        snapshot = snapshot.with_attribute(name, value);
    }
    snapshot
}

fn resolve_url(reference: &str, base: &Url) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.join(trimmed).ok().map(Into::into)
}
