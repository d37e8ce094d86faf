use std::sync::Arc;

use pinboard_core::{BoardReference, FinishReason, RunSummary, SizeBounds};
use pinboard_logging::pinboard_info;

use crate::harvest::{HarvestSettings, LinkHarvester};
use crate::navigate::{NavError, Navigator};
use crate::persist::{DownloadRoot, PersistError};
use crate::probe::{DimensionProbe, HttpDimensionProbe};
use crate::progress::{LoggingProgressSink, PipelineEvent, ProgressSink};
use crate::resolve::{ResolveSettings, Resolver};
use crate::session::BoardSession;
use crate::stop::StopSignals;
use crate::title::{HttpTitleSource, TitleSource};
use crate::Fetcher;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub root: Option<DownloadRoot>,
    pub harvest: HarvestSettings,
    pub resolve: ResolveSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("setup failed: {0}")]
    Setup(#[from] PersistError),
    #[error("could not load board: {0}")]
    Board(#[from] NavError),
}

/// Harvest → resolve → persist for one board, on one navigation session.
pub struct Pipeline {
    config: PipelineConfig,
    navigator: Box<dyn Navigator>,
    fetcher: Arc<dyn Fetcher>,
    probe: Arc<dyn DimensionProbe>,
    titles: Arc<dyn TitleSource>,
    sink: Arc<dyn ProgressSink>,
}

impl Pipeline {
    /// Probing and source titles default to HTTP over `fetcher`.
    pub fn new(config: PipelineConfig, navigator: Box<dyn Navigator>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            navigator,
            probe: Arc::new(HttpDimensionProbe::new(fetcher.clone())),
            titles: Arc::new(HttpTitleSource::new(fetcher.clone())),
            fetcher,
            sink: Arc::new(LoggingProgressSink),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn DimensionProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_title_source(mut self, titles: Arc<dyn TitleSource>) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs the board to completion or cancellation. The navigator is closed
    /// before returning, whatever the outcome.
    pub async fn run(
        self,
        board: BoardReference,
        bounds: SizeBounds,
        stops: &StopSignals,
    ) -> Result<RunSummary, PipelineError> {
        let result = self.run_session(board, bounds, stops).await;
        self.navigator.close().await;
        result
    }

    async fn run_session(
        &self,
        board: BoardReference,
        bounds: SizeBounds,
        stops: &StopSignals,
    ) -> Result<RunSummary, PipelineError> {
        let mut session = BoardSession::open(self.config.root.as_ref(), board, bounds)?;
        self.sink.emit(PipelineEvent::SessionOpened {
            dir: session.dir().display().to_string(),
        });

        let harvester = LinkHarvester::new(
            self.navigator.as_ref(),
            &self.config.harvest,
            self.sink.as_ref(),
        );
        let report = harvester
            .harvest(session.board(), stops.harvest_token())
            .await?;
        // Discovery is over; from here on an interrupt cancels the run.
        stops.stop_harvest();

        let total = report.links.len();
        let mut summary = RunSummary {
            links_found: total,
            harvest_stopped: report.reason == FinishReason::Cancelled,
            ..RunSummary::default()
        };
        if summary.harvest_stopped && !stops.is_cancelled() {
            pinboard_info!("Link discovery stopped early; resolving {} links", total);
        }

        let resolver = Resolver::new(
            self.navigator.as_ref(),
            self.fetcher.as_ref(),
            self.probe.as_ref(),
            self.titles.as_ref(),
            &self.config.resolve,
        );
        for (position, link) in report.links.iter().enumerate() {
            if stops.is_cancelled() {
                summary.cancelled = true;
                self.sink.emit(PipelineEvent::Cancelled {
                    processed: summary.processed,
                    total,
                });
                break;
            }
            self.sink.emit(PipelineEvent::ItemStarted {
                position: position + 1,
                total,
                url: link.to_string(),
            });
            let outcome = resolver.resolve(link, &mut session).await;
            summary.record(outcome.kind());
            self.sink.emit(PipelineEvent::ItemFinished {
                position: position + 1,
                outcome,
            });
        }

        pinboard_info!(
            "{}: {} accepted, {} rejected, {} aborted, {} failed of {} links",
            session.board().keyword(),
            summary.accepted,
            summary.rejected,
            summary.aborted,
            summary.failed,
            summary.links_found
        );
        Ok(summary)
    }
}
