use std::time::Duration;

use pinboard_core::{update, BoardReference, Effect, FinishReason, HarvestState, ItemLink, Msg, MAX_TRIES};
use pinboard_logging::{pinboard_debug, pinboard_warn};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::navigate::{NavError, Navigator, PageElement};
use crate::progress::{PipelineEvent, ProgressSink};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub item_link_selector: String,
    /// Upper bound for waiting on newly rendered items before each query.
    /// Zero skips the wait.
    pub settle_timeout: Duration,
    /// Poll interval while settling.
    pub settle_poll: Duration,
    /// Bound for the per-round link query.
    pub query_timeout: Duration,
    pub max_tries: u32,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            item_link_selector: "a[href*='/pin/']".to_string(),
            settle_timeout: Duration::from_secs(2),
            settle_poll: Duration::from_millis(100),
            query_timeout: Duration::from_secs(2),
            max_tries: MAX_TRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub links: Vec<ItemLink>,
    pub rounds: u32,
    pub reason: FinishReason,
}

/// Scrolls a board and collects the distinct item links it shows.
pub struct LinkHarvester<'a> {
    navigator: &'a dyn Navigator,
    settings: &'a HarvestSettings,
    sink: &'a dyn ProgressSink,
}

impl<'a> LinkHarvester<'a> {
    pub fn new(
        navigator: &'a dyn Navigator,
        settings: &'a HarvestSettings,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            navigator,
            settings,
            sink,
        }
    }

    /// Loads the board and harvests until growth stalls, the query fails, or
    /// `cancel` fires. Only a failure to load the board itself is an error.
    pub async fn harvest(
        &self,
        board: &BoardReference,
        cancel: &CancellationToken,
    ) -> Result<HarvestReport, NavError> {
        self.navigator.navigate(board.url()).await?;

        let mut state = HarvestState::with_max_tries(self.settings.max_tries);
        let mut visible = 0usize;
        loop {
            let msg = if cancel.is_cancelled() {
                Msg::CancelRequested
            } else {
                self.settle(visible, cancel).await;
                if cancel.is_cancelled() {
                    Msg::CancelRequested
                } else {
                    self.query_round().await
                }
            };
            if let Msg::BatchQueried(batch) = &msg {
                visible = batch.len();
            }

            let (next, effects) = update(state, msg);
            state = next;
            self.sink.emit(PipelineEvent::HarvestRound(state.view()));

            for effect in effects {
                match effect {
                    Effect::Scroll => {
                        if let Err(err) = self.navigator.trigger_scroll().await {
                            pinboard_warn!("Scroll failed: {}", err);
                        }
                    }
                    Effect::Finish { reason } => {
                        let rounds = state.view().rounds;
                        let links = state.into_links();
                        self.sink.emit(PipelineEvent::HarvestFinished {
                            links: links.len(),
                            reason: reason.clone(),
                        });
                        return Ok(HarvestReport {
                            links,
                            rounds,
                            reason,
                        });
                    }
                }
            }
        }
    }

    async fn query_round(&self) -> Msg {
        let selector = &self.settings.item_link_selector;
        match self
            .navigator
            .wait_for_elements(selector, self.settings.query_timeout)
            .await
        {
            Ok(elements) => Msg::BatchQueried(hrefs(&elements)),
            Err(NavError::Timeout { .. }) => Msg::BatchQueried(Vec::new()),
            Err(NavError::StaleElement) => {
                pinboard_debug!("Stale element while querying links; retrying round");
                Msg::BatchStale
            }
            Err(err) => Msg::QueryFailed(err.to_string()),
        }
    }

    /// Waits until the number of visible links differs from `previous`, or
    /// the settle bound runs out.
    async fn settle(&self, previous: usize, cancel: &CancellationToken) {
        if self.settings.settle_timeout.is_zero() {
            return;
        }
        let deadline = Instant::now() + self.settings.settle_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            if let Ok(elements) = self
                .navigator
                .wait_for_elements(&self.settings.item_link_selector, Duration::ZERO)
                .await
            {
                if elements.len() != previous {
                    return;
                }
            }
            tokio::select! {
                _ = sleep(self.settings.settle_poll.min(remaining)) => {}
                _ = cancel.cancelled() => return,
            }
        }
    }
}

fn hrefs(elements: &[PageElement]) -> Vec<String> {
    elements
        .iter()
        .filter_map(|element| element.attribute("href"))
        .map(str::to_string)
        .collect()
}
