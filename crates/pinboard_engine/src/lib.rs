//! Pinboard engine: navigation, fetching, resolution and persistence for a
//! board harvest.
mod decode;
mod fetch;
mod harvest;
mod http_nav;
mod index;
mod metadata;
mod navigate;
mod persist;
mod pipeline;
mod probe;
mod progress;
mod resolve;
mod session;
mod stop;
mod title;
mod types;

pub use decode::{decode_page, is_html, DecodedPage};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use harvest::{HarvestReport, HarvestSettings, LinkHarvester};
pub use http_nav::HttpNavigator;
pub use index::{CsvIndex, INDEX_FILENAME, INDEX_HEADER};
pub use metadata::{MetadataStore, METADATA_FILENAME};
pub use navigate::{NavError, Navigator, PageElement, PageSelectors};
pub use persist::{ensure_directory, AtomicFileWriter, DownloadRoot, PersistError};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use probe::{read_dimensions, DimensionProbe, HttpDimensionProbe, ProbeError, DEFAULT_PROBE_PREFIX};
pub use progress::{LoggingProgressSink, PipelineEvent, ProgressSink};
pub use resolve::{AbortReason, ItemFailure, ItemOutcome, RejectReason, ResolveSettings, Resolver};
pub use session::BoardSession;
pub use stop::StopSignals;
pub use title::{extract_title, HttpTitleSource, TitleSource};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
