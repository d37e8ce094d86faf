#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinboard_core::Dimensions;
use pinboard_engine::{
    DimensionProbe, DownloadRoot, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher,
    HarvestSettings, ItemOutcome, NavError, Navigator, PageElement, PageSelectors,
    PipelineConfig, PipelineEvent, ProbeError, ProgressSink, ResolveSettings, TitleSource,
};
use tokio_util::sync::CancellationToken;

pub const BOARD_URL: &str = "https://www.pinterest.com/someone/recipes/";

pub fn init_logging() {
    pinboard_logging::initialize_for_tests();
}

pub fn pin_url(id: usize) -> String {
    format!("https://www.pinterest.com/pin/{id}/")
}

pub fn thumb_url(id: usize) -> String {
    format!("https://i.pinimg.com/236x/aa/{id}.jpg")
}

pub fn full_url(id: usize) -> String {
    format!("https://i.pinimg.com/736x/aa/{id}.jpg")
}

/// Settings with every wait disabled so tests never sleep.
pub fn fast_config(root: Option<DownloadRoot>) -> PipelineConfig {
    PipelineConfig {
        root,
        harvest: HarvestSettings {
            settle_timeout: Duration::ZERO,
            query_timeout: Duration::ZERO,
            ..HarvestSettings::default()
        },
        resolve: ResolveSettings {
            element_timeout: Duration::ZERO,
            ..ResolveSettings::default()
        },
    }
}

/// Content of a pin detail page, keyed by the default selectors.
#[derive(Debug, Clone, Default)]
pub struct PinPage {
    pub image_src: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub caption: Option<String>,
}

impl PinPage {
    pub fn with_image(src: impl Into<String>) -> Self {
        Self {
            image_src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    fn elements(&self) -> HashMap<String, Vec<PageElement>> {
        let selectors = PageSelectors::default();
        let mut map = HashMap::new();
        if let Some(src) = &self.image_src {
            map.insert(
                selectors.asset_image,
                vec![PageElement::new("").with_attribute("src", src.as_str())],
            );
        }
        if let Some(title) = &self.title {
            map.insert(selectors.title, vec![PageElement::new(title.as_str())]);
        }
        if let Some(source) = &self.source {
            map.insert(
                selectors.source_link,
                vec![PageElement::new("Visit").with_attribute("href", source.as_str())],
            );
        }
        if let Some(caption) = &self.caption {
            map.insert(selectors.caption, vec![PageElement::new(caption.as_str())]);
        }
        map
    }
}

#[derive(Default)]
struct NavState {
    batches: Vec<Vec<String>>,
    scrolls: usize,
    link_queries: usize,
    stale_queries: HashSet<usize>,
    pages: HashMap<String, HashMap<String, Vec<PageElement>>>,
    broken_pages: HashSet<String>,
    current: Option<String>,
    visited: Vec<String>,
    closed: bool,
}

/// In-memory navigator: the board shows `batches[scrolls]` (the last batch
/// once scrolling runs past the script), pin pages come from `PinPage`s.
#[derive(Clone, Default)]
pub struct ScriptedNavigator {
    state: Arc<Mutex<NavState>>,
}

impl ScriptedNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batches(self, batches: Vec<Vec<String>>) -> Self {
        self.state.lock().unwrap().batches = batches;
        self
    }

    /// Board showing all `links` from the first round on.
    pub fn with_links(self, links: &[String]) -> Self {
        self.with_batches(vec![links.to_vec()])
    }

    /// The `n`th link query (0-based) fails with a stale element.
    pub fn with_stale_query(self, n: usize) -> Self {
        self.state.lock().unwrap().stale_queries.insert(n);
        self
    }

    pub fn with_page(self, url: &str, page: PinPage) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), page.elements());
        self
    }

    pub fn with_broken_page(self, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .broken_pages
            .insert(url.to_string());
        self
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn link_queries(&self) -> usize {
        self.state.lock().unwrap().link_queries
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait::async_trait]
impl Navigator for ScriptedNavigator {
    async fn navigate(&self, url: &str) -> Result<(), NavError> {
        let mut state = self.state.lock().unwrap();
        state.visited.push(url.to_string());
        if state.broken_pages.contains(url) {
            return Err(NavError::Navigation {
                url: url.to_string(),
                message: "connection reset".into(),
            });
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_elements(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Vec<PageElement>, NavError> {
        let mut state = self.state.lock().unwrap();
        let current = state.current.clone().ok_or(NavError::NoPage)?;
        let timeout = || NavError::Timeout {
            selector: selector.to_string(),
        };

        if current == BOARD_URL {
            let query = state.link_queries;
            state.link_queries += 1;
            if state.stale_queries.contains(&query) {
                return Err(NavError::StaleElement);
            }
            let batch = match state.batches.len() {
                0 => Vec::new(),
                len => state.batches[state.scrolls.min(len - 1)].clone(),
            };
            if batch.is_empty() {
                return Err(timeout());
            }
            return Ok(batch
                .into_iter()
                .map(|href| PageElement::new("").with_attribute("href", href))
                .collect());
        }

        match state.pages.get(&current).and_then(|page| page.get(selector)) {
            Some(elements) if !elements.is_empty() => Ok(elements.clone()),
            _ => Err(timeout()),
        }
    }

    async fn trigger_scroll(&self) -> Result<(), NavError> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn close(&self) {
        self.state.lock().unwrap().closed = true;
    }
}

/// Serves canned bodies by url; anything else is a 404.
#[derive(Default)]
pub struct StubFetcher {
    bodies: Mutex<HashMap<String, Result<Vec<u8>, FetchError>>>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: &[u8]) -> Self {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn with_failure(self, url: &str) -> Self {
        self.bodies.lock().unwrap().insert(
            url.to_string(),
            Err(FetchError::new(FailureKind::Timeout, "asset timed out")),
        );
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        let body = self.bodies.lock().unwrap().get(url).cloned();
        match body {
            Some(Ok(bytes)) => Ok(FetchOutput {
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("image/jpeg".to_string()),
                    byte_len: bytes.len() as u64,
                    truncated: false,
                },
                bytes,
            }),
            Some(Err(err)) => Err(err),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "404 Not Found")),
        }
    }
}

/// Reports configured dimensions; unknown urls are large enough for any bound.
#[derive(Default)]
pub struct StubProbe {
    sizes: HashMap<String, Dimensions>,
    probed: Mutex<Vec<String>>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, url: &str, width: u32, height: u32) -> Self {
        self.sizes
            .insert(url.to_string(), Dimensions::new(width, height));
        self
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DimensionProbe for StubProbe {
    async fn probe(&self, url: &str) -> Result<Dimensions, ProbeError> {
        self.probed.lock().unwrap().push(url.to_string());
        Ok(self
            .sizes
            .get(url)
            .copied()
            .unwrap_or(Dimensions::new(4096, 4096)))
    }
}

/// Source-page titles by url; unknown urls fail.
#[derive(Default)]
pub struct StubTitles {
    titles: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StubTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, url: &str, title: &str) -> Self {
        self.titles.insert(url.to_string(), title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TitleSource for StubTitles {
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.titles
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(FailureKind::MissingTitle, url))
    }
}

type ItemHook = Box<dyn Fn(usize) + Send + Sync>;

/// Keeps every event; can fire a cancellation after a number of harvest
/// rounds or finished items, or run a hook as each item starts.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
    cancel_after_rounds: Option<(u32, CancellationToken)>,
    cancel_after_items: Option<(usize, CancellationToken)>,
    on_item_started: Option<ItemHook>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(rounds: u32, token: CancellationToken) -> Self {
        Self {
            cancel_after_rounds: Some((rounds, token)),
            ..Self::default()
        }
    }

    pub fn cancelling_after_items(items: usize, token: CancellationToken) -> Self {
        Self {
            cancel_after_items: Some((items, token)),
            ..Self::default()
        }
    }

    /// Calls `hook` with the 1-based position before each item is resolved.
    pub fn on_item_started(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_item_started = Some(Box::new(hook));
        self
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<ItemOutcome> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::ItemFinished { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        match (&event, &self.cancel_after_rounds, &self.cancel_after_items) {
            (PipelineEvent::HarvestRound(view), Some((rounds, token)), _) if view.rounds >= *rounds => {
                token.cancel();
            }
            (PipelineEvent::ItemFinished { position, .. }, _, Some((items, token)))
                if *position >= *items =>
            {
                token.cancel();
            }
            _ => {}
        }
        if let (PipelineEvent::ItemStarted { position, .. }, Some(hook)) =
            (&event, &self.on_item_started)
        {
            hook(*position);
        }
        self.events.lock().unwrap().push(event);
    }
}
