mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use pinboard_core::{BoardReference, RunSummary};
use pinboard_engine::{Fetcher, HttpNavigator, Pipeline, ReqwestFetcher, StopSignals};
use pinboard_logging::{pinboard_info, pinboard_warn};

use crate::config::AppConfig;
use crate::logging::LogDestination;

/// Download full-size images, titles and captions from a pin board
#[derive(Parser, Debug)]
#[command(name = "pinboard", version)]
struct Cli {
    /// Board URL to harvest
    board_url: String,

    /// Search keyword; names the download directory and image files
    keyword: String,

    /// Existing directory to create the board directory in (default: current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Skip images narrower than this many pixels
    #[arg(long, value_name = "PX")]
    min_width: Option<u32>,

    /// Skip images shorter than this many pixels
    #[arg(long, value_name = "PX")]
    min_height: Option<u32>,

    /// RON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, default_value = "terminal")]
    log: LogDestination,

    /// Log file used by `--log file` and `--log both`
    #[arg(long, value_name = "FILE", default_value = "pinboard.log")]
    log_file: PathBuf,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level, &cli.log_file);

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let board = BoardReference::new(cli.board_url, cli.keyword).context("invalid board")?;
    let bounds = config.resolve_bounds(cli.min_width, cli.min_height)?;
    let root = config.resolve_root(cli.root)?;

    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch_settings()));
    let navigator = Box::new(HttpNavigator::new(fetcher.clone()));
    let pipeline = Pipeline::new(config.pipeline_config(root), navigator, fetcher);

    let stops = StopSignals::new();
    let on_interrupt = stops.clone();
    tokio::spawn(async move {
        // First Ctrl-C ends link discovery, the next one ends the run.
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_interrupt.harvest_stopped() {
                pinboard_warn!("Interrupted; finishing the current item");
            } else {
                pinboard_warn!("Interrupted; processing the links found so far (Ctrl-C again to stop)");
            }
            on_interrupt.interrupt();
            if on_interrupt.is_cancelled() {
                break;
            }
        }
    });

    pinboard_info!("Harvesting {} into '{}'", board.url(), board.keyword());
    let summary = pipeline.run(board, bounds, &stops).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} links found{}, {} processed: {} saved, {} rejected, {} aborted, {} failed{}",
        summary.links_found,
        if summary.harvest_stopped { " (discovery stopped)" } else { "" },
        summary.processed,
        summary.accepted,
        summary.rejected,
        summary.aborted,
        summary.failed,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
}
