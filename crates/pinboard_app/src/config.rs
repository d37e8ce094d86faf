//! RON configuration file for the `pinboard` binary.
//!
//! Every field is optional in the file; anything left out keeps the engine
//! default. Durations are given in milliseconds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use pinboard_core::SizeBounds;
use pinboard_engine::{
    DownloadRoot, FetchSettings, HarvestSettings, PageSelectors, PipelineConfig, ResolveSettings,
};
use pinboard_logging::pinboard_info;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root: Option<PathBuf>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub harvest: HarvestConfig,
    pub resolve: ResolveConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub item_link_selector: String,
    pub settle_timeout_ms: u64,
    pub settle_poll_ms: u64,
    pub query_timeout_ms: u64,
    pub max_tries: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let settings = HarvestSettings::default();
        Self {
            item_link_selector: settings.item_link_selector,
            settle_timeout_ms: millis(settings.settle_timeout),
            settle_poll_ms: millis(settings.settle_poll),
            query_timeout_ms: millis(settings.query_timeout),
            max_tries: settings.max_tries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub asset_image_selector: String,
    pub title_selector: String,
    pub source_link_selector: String,
    pub caption_selector: String,
    pub element_timeout_ms: u64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        let settings = ResolveSettings::default();
        Self {
            asset_image_selector: settings.selectors.asset_image,
            title_selector: settings.selectors.title,
            source_link_selector: settings.selectors.source_link,
            caption_selector: settings.selectors.caption,
            element_timeout_ms: millis(settings.element_timeout),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: millis(settings.connect_timeout),
            request_timeout_ms: millis(settings.request_timeout),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            user_agent: settings.user_agent,
        }
    }
}

impl AppConfig {
    /// Reads a config file. A missing or malformed file is an error, never a
    /// silent fallback to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config = ron::from_str(&content)
            .with_context(|| format!("could not parse config file {}", path.display()))?;
        pinboard_info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Pipeline settings for a run under `root`.
    pub fn pipeline_config(&self, root: Option<DownloadRoot>) -> PipelineConfig {
        PipelineConfig {
            root,
            harvest: HarvestSettings {
                item_link_selector: self.harvest.item_link_selector.clone(),
                settle_timeout: Duration::from_millis(self.harvest.settle_timeout_ms),
                settle_poll: Duration::from_millis(self.harvest.settle_poll_ms),
                query_timeout: Duration::from_millis(self.harvest.query_timeout_ms),
                max_tries: self.harvest.max_tries,
            },
            resolve: ResolveSettings {
                selectors: PageSelectors {
                    asset_image: self.resolve.asset_image_selector.clone(),
                    title: self.resolve.title_selector.clone(),
                    source_link: self.resolve.source_link_selector.clone(),
                    caption: self.resolve.caption_selector.clone(),
                },
                element_timeout: Duration::from_millis(self.resolve.element_timeout_ms),
            },
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            user_agent: self.fetch.user_agent.clone(),
        }
    }

    /// Command-line root wins over the file.
    pub fn resolve_root(&self, cli_root: Option<PathBuf>) -> anyhow::Result<Option<DownloadRoot>> {
        cli_root
            .or_else(|| self.root.clone())
            .map(|path| DownloadRoot::new(path).context("invalid download root"))
            .transpose()
    }

    /// Command-line bounds win over the file, per axis. Both axes or neither.
    pub fn resolve_bounds(
        &self,
        cli_width: Option<u32>,
        cli_height: Option<u32>,
    ) -> anyhow::Result<SizeBounds> {
        let width = cli_width.or(self.min_width);
        let height = cli_height.or(self.min_height);
        match (width, height) {
            (None, None) => Ok(SizeBounds::unfiltered()),
            (Some(width), Some(height)) => Ok(SizeBounds::new(width, height)?),
            _ => bail!("minimum width and height must be given together"),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("pinboard.ron");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"(
                min_width: Some(450),
                min_height: Some(500),
                harvest: (settle_timeout_ms: 500),
                fetch: (user_agent: "pinboard-test"),
            )"#,
        );

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.min_width, Some(450));
        assert_eq!(config.harvest.settle_timeout_ms, 500);
        assert_eq!(config.harvest.max_tries, pinboard_core::MAX_TRIES);
        assert_eq!(config.resolve, ResolveConfig::default());

        let pipeline = config.pipeline_config(None);
        assert_eq!(pipeline.harvest.settle_timeout, Duration::from_millis(500));
        assert_eq!(pipeline.resolve.selectors, PageSelectors::default());
        assert_eq!(config.fetch_settings().user_agent, "pinboard-test");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.ron")).unwrap_err();
        assert!(err.to_string().contains("could not read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "(harvest: (max_tries: \"many\"))");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("could not parse config file"));
    }

    #[test]
    fn command_line_bounds_override_the_file() {
        let config = AppConfig {
            min_width: Some(100),
            min_height: Some(200),
            ..AppConfig::default()
        };

        let bounds = config.resolve_bounds(Some(450), None).unwrap();
        assert_eq!((bounds.min_width(), bounds.min_height()), (450, 200));

        assert!(AppConfig::default()
            .resolve_bounds(None, None)
            .unwrap()
            .is_unfiltered());
        assert!(AppConfig::default().resolve_bounds(Some(10), None).is_err());
        assert!(AppConfig::default().resolve_bounds(Some(0), Some(10)).is_err());
    }

    #[test]
    fn root_must_exist() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            root: Some(dir.path().join("missing")),
            ..AppConfig::default()
        };
        assert!(config.resolve_root(None).is_err());

        let root = config
            .resolve_root(Some(dir.path().to_path_buf()))
            .unwrap()
            .unwrap();
        assert_eq!(root.path(), dir.path());
    }
}
