use pinboard_core::{FinishReason, HarvestView};
use pinboard_logging::{pinboard_debug, pinboard_info, pinboard_warn};

use crate::resolve::ItemOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    SessionOpened { dir: String },
    HarvestRound(HarvestView),
    HarvestFinished { links: usize, reason: FinishReason },
    ItemStarted { position: usize, total: usize, url: String },
    ItemFinished { position: usize, outcome: ItemOutcome },
    Cancelled { processed: usize, total: usize },
}

/// Observer for per-round and per-item progress.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProgressSink;

impl ProgressSink for LoggingProgressSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::SessionOpened { dir } => pinboard_info!("Writing to {}", dir),
            PipelineEvent::HarvestRound(view) => pinboard_debug!(
                "round {}: {} links, tries {}/{}",
                view.rounds,
                view.link_count,
                view.tries,
                view.max_tries
            ),
            PipelineEvent::HarvestFinished { links, reason } => {
                pinboard_info!("Harvest finished with {} links ({:?})", links, reason)
            }
            PipelineEvent::ItemStarted {
                position,
                total,
                url,
            } => pinboard_info!("({}/{}): {}", position, total, url),
            PipelineEvent::ItemFinished { position, outcome } => match &outcome {
                ItemOutcome::Accepted(record) => {
                    pinboard_info!("({}) saved {}", position, record.image_filename)
                }
                other => pinboard_warn!("({}) {}", position, other),
            },
            PipelineEvent::Cancelled { processed, total } => {
                pinboard_warn!("Cancelled after {} of {} items", processed, total)
            }
        }
    }
}
