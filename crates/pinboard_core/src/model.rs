use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::naming::directory_name;

/// Fallback value for metadata that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum number of characters kept in the index's partial caption column.
pub const PARTIAL_CAPTION_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid board url {url}: {message}")]
    InvalidBoardUrl { url: String, message: String },
    #[error("keyword {0:?} does not yield a usable directory name")]
    EmptyKeyword(String),
    #[error("keyword {0:?} would place files outside the download directory")]
    UnsafeKeyword(String),
    #[error("size bounds must be positive, got {min_width}x{min_height}")]
    InvalidBounds { min_width: u32, min_height: u32 },
}

/// The board to harvest and the search keyword it is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardReference {
    url: String,
    keyword: String,
}

impl BoardReference {
    pub fn new(url: impl Into<String>, keyword: impl Into<String>) -> Result<Self, ModelError> {
        let url = url.into().trim().to_string();
        let keyword = keyword.into();
        Url::parse(&url).map_err(|err| ModelError::InvalidBoardUrl {
            url: url.clone(),
            message: err.to_string(),
        })?;
        let name = directory_name(&keyword);
        if name.is_empty() {
            return Err(ModelError::EmptyKeyword(keyword));
        }
        // The keyword becomes one path component under the root.
        if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            return Err(ModelError::UnsafeKeyword(keyword));
        }
        Ok(Self { url, keyword })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

/// URL of a single pin's detail page. Identity is byte equality of the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemLink(String);

impl ItemLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplicated set of item links that remembers first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkSet {
    ordered: Vec<ItemLink>,
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the url was not present before.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.ordered.push(ItemLink::new(url));
        true
    }

    /// Merges a batch and returns how many urls were new.
    pub fn merge<'a>(&mut self, batch: impl IntoIterator<Item = &'a str>) -> usize {
        batch.into_iter().filter(|url| self.insert(url)).count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemLink> {
        self.ordered.iter()
    }

    pub fn into_links(self) -> Vec<ItemLink> {
        self.ordered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Minimum accepted asset size. `(0, 0)` means unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeBounds {
    min_width: u32,
    min_height: u32,
}

impl SizeBounds {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// A filter must be positive on both axes.
    pub fn new(min_width: u32, min_height: u32) -> Result<Self, ModelError> {
        if min_width == 0 || min_height == 0 {
            return Err(ModelError::InvalidBounds {
                min_width,
                min_height,
            });
        }
        Ok(Self {
            min_width,
            min_height,
        })
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    pub fn is_unfiltered(&self) -> bool {
        self.min_width == 0 && self.min_height == 0
    }

    /// Rejects only when a dimension is strictly below its minimum.
    pub fn admits(&self, dims: Dimensions) -> bool {
        dims.width >= self.min_width && dims.height >= self.min_height
    }
}

impl fmt::Display for SizeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.min_width, self.min_height)
    }
}

/// Where a pin's title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOrigin {
    Page,
    Source,
    Missing,
}

/// Extracted metadata for one accepted pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRecord {
    pub image_filename: String,
    pub title: String,
    pub source: String,
    pub caption: String,
    pub item_url: String,
    pub title_origin: TitleOrigin,
}

impl PinRecord {
    /// Index column text: the page title when the pin had one, else the caption.
    pub fn partial_caption(&self) -> String {
        let text = match self.title_origin {
            TitleOrigin::Page => &self.title,
            TitleOrigin::Source | TitleOrigin::Missing => &self.caption,
        };
        truncate_chars(text, PARTIAL_CAPTION_LEN)
    }
}

/// Entry shape of the `metadata.json` store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub image_filename: String,
    pub title: String,
    pub source: String,
    pub caption: String,
}

impl From<&PinRecord> for MetadataEntry {
    fn from(record: &PinRecord) -> Self {
        Self {
            image_filename: record.image_filename.clone(),
            title: record.title.clone(),
            source: record.source.clone(),
            caption: record.caption.clone(),
        }
    }
}

/// Whole `metadata.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub image: Vec<MetadataEntry>,
}

/// One row of `infographics.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub image_filename: String,
    pub keyword: String,
    pub partial_caption: String,
    pub item_url: String,
}

impl IndexRow {
    pub fn for_record(record: &PinRecord, keyword: &str) -> Self {
        Self {
            image_filename: record.image_filename.clone(),
            keyword: keyword.to_string(),
            partial_caption: record.partial_caption(),
            item_url: record.item_url.clone(),
        }
    }
}

/// Truncates on character boundaries, not bytes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Normalizes extracted text: blank means absent.
pub fn or_not_available(text: Option<String>) -> String {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn is_not_available(value: &str) -> bool {
    value == NOT_AVAILABLE
}
