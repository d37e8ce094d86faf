use crate::FinishReason;

/// Snapshot of harvest progress for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestView {
    pub rounds: u32,
    pub tries: u32,
    pub max_tries: u32,
    pub stale_rounds: u32,
    pub link_count: usize,
    pub finished: Option<FinishReason>,
}

/// How a single item left the resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Accepted,
    Rejected,
    Aborted,
    Failed,
}

/// Totals for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub links_found: usize,
    pub processed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub aborted: usize,
    pub failed: usize,
    /// Link discovery was stopped before the board stalled.
    pub harvest_stopped: bool,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn record(&mut self, kind: OutcomeKind) {
        self.processed += 1;
        match kind {
            OutcomeKind::Accepted => self.accepted += 1,
            OutcomeKind::Rejected => self.rejected += 1,
            OutcomeKind::Aborted => self.aborted += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
    }
}
