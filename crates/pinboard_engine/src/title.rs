use std::sync::Arc;

use scraper::{Html, Selector};

use crate::decode::{decode_page, is_html};
use crate::{FailureKind, FetchError, Fetcher};

/// Looks up the title of an outbound source page.
#[async_trait::async_trait]
pub trait TitleSource: Send + Sync {
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpTitleSource {
    fetcher: Arc<dyn Fetcher>,
}

impl HttpTitleSource {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl TitleSource for HttpTitleSource {
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError> {
        let output = self.fetcher.fetch(url).await?;
        let content_type = output.metadata.content_type.as_deref();
        if !is_html(content_type) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: content_type.unwrap_or_default().to_string(),
                },
                "source is not an html page",
            ));
        }
        let page = decode_page(&output.bytes, content_type);
        extract_title(&page.html)
            .ok_or_else(|| FetchError::new(FailureKind::MissingTitle, url.to_string()))
    }
}

/// `<title>` text, falling back to the `og:title` meta tag.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let title_sel = Selector::parse("title").ok();
    let og_sel = Selector::parse("meta[property='og:title']").ok();

    let from_title = title_sel
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(|t| collapse_whitespace(&t.text().collect::<String>()));
    let from_og = || {
        og_sel
            .as_ref()
            .and_then(|sel| doc.select(sel).next())
            .and_then(|meta| meta.value().attr("content"))
            .map(collapse_whitespace)
    };

    from_title
        .filter(|t| !t.is_empty())
        .or_else(|| from_og().filter(|t| !t.is_empty()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::extract_title;

    #[test]
    fn title_element_is_preferred() {
        let html = r#"<html><head><title>  Best
            Pancakes </title><meta property="og:title" content="OG"></head></html>"#;
        assert_eq!(extract_title(html).as_deref(), Some("Best Pancakes"));
    }

    #[test]
    fn og_title_fills_in_for_blank_title() {
        let html = r#"<html><head><title> </title><meta property="og:title" content="Recipe"></head></html>"#;
        assert_eq!(extract_title(html).as_deref(), Some("Recipe"));
    }

    #[test]
    fn no_title_at_all() {
        assert_eq!(extract_title("<html><body>x</body></html>"), None);
    }
}
