//! Pinboard core: pin data model, naming rules and the pure harvest state machine.
mod effect;
mod model;
mod msg;
mod naming;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, FinishReason};
pub use model::{
    is_not_available, or_not_available, truncate_chars, BoardReference, Dimensions, IndexRow,
    ItemLink, LinkSet, MetadataDocument, MetadataEntry, ModelError, PinRecord, SizeBounds,
    TitleOrigin, NOT_AVAILABLE, PARTIAL_CAPTION_LEN,
};
pub use msg::Msg;
pub use naming::{
    directory_name, download_dir, image_filename, upgrade_to_high_res, HIGH_RES_SEGMENT,
    LOW_RES_SEGMENT,
};
pub use state::{HarvestPhase, HarvestState, MAX_TRIES};
pub use update::update;
pub use view_model::{HarvestView, OutcomeKind, RunSummary};
