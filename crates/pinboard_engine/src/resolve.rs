use std::fmt;
use std::time::Duration;

use pinboard_core::{
    is_not_available, or_not_available, upgrade_to_high_res, Dimensions, ItemLink, OutcomeKind,
    PinRecord, SizeBounds, TitleOrigin, NOT_AVAILABLE,
};
use pinboard_logging::{pinboard_debug, pinboard_info, pinboard_warn};

use crate::navigate::{NavError, Navigator, PageSelectors};
use crate::probe::{DimensionProbe, ProbeError};
use crate::session::BoardSession;
use crate::title::TitleSource;
use crate::{FetchError, Fetcher};

#[derive(Debug, Clone)]
pub struct ResolveSettings {
    pub selectors: PageSelectors,
    /// Bound for each element wait on a pin page.
    pub element_timeout: Duration,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            selectors: PageSelectors::default(),
            element_timeout: Duration::from_secs(2),
        }
    }
}

/// Result of resolving one item link.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Asset, metadata entry and index row were all written.
    Accepted(PinRecord),
    Rejected(RejectReason),
    Aborted(AbortReason),
    Failed(ItemFailure),
}

impl ItemOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ItemOutcome::Accepted(_) => OutcomeKind::Accepted,
            ItemOutcome::Rejected(_) => OutcomeKind::Rejected,
            ItemOutcome::Aborted(_) => OutcomeKind::Aborted,
            ItemOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Accepted(record) => write!(f, "accepted as {}", record.image_filename),
            ItemOutcome::Rejected(reason) => write!(f, "rejected: {reason}"),
            ItemOutcome::Aborted(reason) => write!(f, "aborted: {reason}"),
            ItemOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("no high-res variant for {asset_url}")]
    NoHighResVariant { asset_url: String },
    #[error("image not greater than bounds: {dims} < {bounds}")]
    BelowBounds { dims: Dimensions, bounds: SizeBounds },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbortReason {
    #[error("could not open pin page: {0}")]
    Navigation(NavError),
    #[error("no image found")]
    NoAssetElement,
    #[error("image element has no src")]
    MissingAssetSource,
    #[error("{0}")]
    Probe(ProbeError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemFailure {
    #[error("image request failed: {0}")]
    Download(FetchError),
    #[error("could not persist pin: {0}")]
    Persist(String),
}

/// Turns item links into persisted pins.
pub struct Resolver<'a> {
    navigator: &'a dyn Navigator,
    fetcher: &'a dyn Fetcher,
    probe: &'a dyn DimensionProbe,
    titles: &'a dyn TitleSource,
    settings: &'a ResolveSettings,
}

impl<'a> Resolver<'a> {
    pub fn new(
        navigator: &'a dyn Navigator,
        fetcher: &'a dyn Fetcher,
        probe: &'a dyn DimensionProbe,
        titles: &'a dyn TitleSource,
        settings: &'a ResolveSettings,
    ) -> Self {
        Self {
            navigator,
            fetcher,
            probe,
            titles,
            settings,
        }
    }

    pub async fn resolve(&self, link: &ItemLink, session: &mut BoardSession) -> ItemOutcome {
        if let Err(err) = self.navigator.navigate(link.as_str()).await {
            return ItemOutcome::Aborted(AbortReason::Navigation(err));
        }

        let selectors = &self.settings.selectors;
        let image = match self
            .navigator
            .wait_for_element(&selectors.asset_image, self.settings.element_timeout)
            .await
        {
            Ok(image) => image,
            Err(err) => {
                pinboard_debug!("No asset element on {}: {}", link, err);
                return ItemOutcome::Aborted(AbortReason::NoAssetElement);
            }
        };
        let Some(thumbnail_url) = image.attribute("src").map(str::to_string) else {
            return ItemOutcome::Aborted(AbortReason::MissingAssetSource);
        };
        pinboard_info!("Initial request: {}", thumbnail_url);

        let Some(asset_url) = upgrade_to_high_res(&thumbnail_url) else {
            return ItemOutcome::Rejected(RejectReason::NoHighResVariant {
                asset_url: thumbnail_url,
            });
        };
        pinboard_info!("Final request: {}", asset_url);

        let bounds = session.bounds();
        if !bounds.is_unfiltered() {
            match self.probe.probe(&asset_url).await {
                Ok(dims) if bounds.admits(dims) => {
                    pinboard_debug!("{} is {}", asset_url, dims);
                }
                Ok(dims) => {
                    return ItemOutcome::Rejected(RejectReason::BelowBounds { dims, bounds });
                }
                Err(err) => return ItemOutcome::Aborted(AbortReason::Probe(err)),
            }
        }

        let page_title = or_not_available(self.text_of(&selectors.title).await);
        let source = or_not_available(
            self.attribute_of(&selectors.source_link, "href").await,
        );
        let caption = or_not_available(self.text_of(&selectors.caption).await);

        let (title, title_origin) = if !is_not_available(&page_title) {
            (page_title, TitleOrigin::Page)
        } else if !is_not_available(&source) {
            self.title_from_source(&source).await
        } else {
            (NOT_AVAILABLE.to_string(), TitleOrigin::Missing)
        };
        pinboard_debug!("Title: {} | Source: {} | Caption: {}", title, source, caption);

        let record = PinRecord {
            image_filename: session.next_filename(),
            title,
            source,
            caption,
            item_url: link.as_str().to_string(),
            title_origin,
        };

        let asset = match self.fetcher.fetch(&asset_url).await {
            Ok(output) => output.bytes,
            Err(err) => return ItemOutcome::Failed(ItemFailure::Download(err)),
        };

        match session.commit(&record, &asset) {
            Ok(_) => ItemOutcome::Accepted(record),
            Err(err) => ItemOutcome::Failed(ItemFailure::Persist(err.to_string())),
        }
    }

    async fn title_from_source(&self, source: &str) -> (String, TitleOrigin) {
        match self.titles.fetch_title(source).await {
            Ok(title) if !title.trim().is_empty() => (title.trim().to_string(), TitleOrigin::Source),
            Ok(_) => (NOT_AVAILABLE.to_string(), TitleOrigin::Missing),
            Err(err) => {
                pinboard_warn!("Could not read title from {}: {}", source, err);
                (NOT_AVAILABLE.to_string(), TitleOrigin::Missing)
            }
        }
    }

    async fn text_of(&self, selector: &str) -> Option<String> {
        self.find(selector)
            .await
            .map(|element| element.text().to_string())
    }

    async fn attribute_of(&self, selector: &str, name: &str) -> Option<String> {
        self.find(selector)
            .await
            .and_then(|element| element.attribute(name).map(str::to_string))
    }

    async fn find(&self, selector: &str) -> Option<crate::PageElement> {
        match self
            .navigator
            .wait_for_element(selector, self.settings.element_timeout)
            .await
        {
            Ok(element) => Some(element),
            Err(NavError::Timeout { .. }) => None,
            Err(err) => {
                pinboard_debug!("Lookup of {} failed: {}", selector, err);
                None
            }
        }
    }
}
