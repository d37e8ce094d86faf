use std::io::Cursor;
use std::sync::Arc;

use image::ImageReader;
use pinboard_core::Dimensions;
use pinboard_logging::pinboard_debug;

use crate::{FetchError, Fetcher};

/// Bytes requested for a header-only dimension read.
pub const DEFAULT_PROBE_PREFIX: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not read image dimensions: {0}")]
    Decode(String),
}

/// Reports an asset's pixel dimensions.
#[async_trait::async_trait]
pub trait DimensionProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<Dimensions, ProbeError>;
}

/// Reads dimensions from the image header of a ranged prefix fetch, and
/// falls back to the whole body when the prefix is not enough.
pub struct HttpDimensionProbe {
    fetcher: Arc<dyn Fetcher>,
    prefix_len: usize,
}

impl HttpDimensionProbe {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_prefix_len(fetcher, DEFAULT_PROBE_PREFIX)
    }

    pub fn with_prefix_len(fetcher: Arc<dyn Fetcher>, prefix_len: usize) -> Self {
        Self {
            fetcher,
            prefix_len,
        }
    }
}

#[async_trait::async_trait]
impl DimensionProbe for HttpDimensionProbe {
    async fn probe(&self, url: &str) -> Result<Dimensions, ProbeError> {
        let prefix = self.fetcher.fetch_prefix(url, self.prefix_len).await?;
        match read_dimensions(&prefix.bytes) {
            Ok(dims) => return Ok(dims),
            Err(err) if prefix.metadata.truncated => {
                pinboard_debug!("Header probe of {} failed ({}); fetching whole asset", url, err);
            }
            Err(err) => return Err(err),
        }
        let full = self.fetcher.fetch(url).await?;
        read_dimensions(&full.bytes)
    }
}

/// Decodes only the image header.
pub fn read_dimensions(bytes: &[u8]) -> Result<Dimensions, ProbeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| ProbeError::Decode(err.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|err| ProbeError::Decode(err.to_string()))?;
    Ok(Dimensions::new(width, height))
}
