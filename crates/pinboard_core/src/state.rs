use crate::model::{ItemLink, LinkSet};
use crate::view_model::HarvestView;
use crate::FinishReason;

/// Consecutive no-growth rounds after which harvesting stops.
pub const MAX_TRIES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HarvestPhase {
    #[default]
    Running,
    Finished(FinishReason),
}

/// Bookkeeping for one board's link discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    links: LinkSet,
    previous_batch: Vec<String>,
    tries: u32,
    max_tries: u32,
    rounds: u32,
    stale_rounds: u32,
    phase: HarvestPhase,
}

impl Default for HarvestState {
    fn default() -> Self {
        Self::with_max_tries(MAX_TRIES)
    }
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tries(max_tries: u32) -> Self {
        Self {
            links: LinkSet::new(),
            previous_batch: Vec::new(),
            tries: 0,
            max_tries: max_tries.max(1),
            rounds: 0,
            stale_rounds: 0,
            phase: HarvestPhase::Running,
        }
    }

    pub fn view(&self) -> HarvestView {
        HarvestView {
            rounds: self.rounds,
            tries: self.tries,
            max_tries: self.max_tries,
            stale_rounds: self.stale_rounds,
            link_count: self.links.len(),
            finished: self.finish_reason().cloned(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == HarvestPhase::Running
    }

    pub fn finish_reason(&self) -> Option<&FinishReason> {
        match &self.phase {
            HarvestPhase::Running => None,
            HarvestPhase::Finished(reason) => Some(reason),
        }
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn into_links(self) -> Vec<ItemLink> {
        self.links.into_links()
    }

    /// Merges the batch and updates the stall counter. Returns `true` once
    /// the stall limit is reached.
    pub(crate) fn observe_batch(&mut self, batch: Vec<String>) -> bool {
        self.rounds += 1;
        self.links.merge(batch.iter().map(String::as_str));
        if batch == self.previous_batch {
            self.tries += 1;
        } else {
            self.tries = 0;
            self.previous_batch = batch;
        }
        self.tries >= self.max_tries
    }

    pub(crate) fn note_stale(&mut self) {
        self.stale_rounds += 1;
    }

    pub(crate) fn finish(&mut self, reason: FinishReason) {
        self.phase = HarvestPhase::Finished(reason);
    }
}
