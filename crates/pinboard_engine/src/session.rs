use std::path::{Path, PathBuf};

use pinboard_core::{download_dir, image_filename, BoardReference, IndexRow, PinRecord, SizeBounds};
use pinboard_logging::pinboard_warn;

use crate::index::CsvIndex;
use crate::metadata::MetadataStore;
use crate::persist::{ensure_directory, AtomicFileWriter, DownloadRoot, PersistError};

/// Per-board harvest state: the board, its bounds, its directory and stores,
/// and the success counter that numbers image files.
///
/// The session is the single writer for its directory; all writes go
/// through `&mut self`.
#[derive(Debug)]
pub struct BoardSession {
    board: BoardReference,
    bounds: SizeBounds,
    dir: PathBuf,
    metadata: MetadataStore,
    index: CsvIndex,
    next_index: u32,
}

impl BoardSession {
    /// Creates (or reuses) the board directory and both stores.
    pub fn open(
        root: Option<&DownloadRoot>,
        board: BoardReference,
        bounds: SizeBounds,
    ) -> Result<Self, PersistError> {
        if let Some(root) = root {
            if !root.path().is_dir() {
                return Err(PersistError::InvalidRoot(root.path().to_path_buf()));
            }
        }
        let dir = download_dir(root.map(DownloadRoot::path), board.keyword());
        ensure_directory(&dir)?;
        let index = CsvIndex::ensure(&dir)?;
        let metadata = MetadataStore::ensure(&dir)?;
        // Continue numbering after pins from earlier runs in this directory.
        let existing = metadata.load()?.image.len() as u32;
        Ok(Self {
            board,
            bounds,
            dir,
            metadata,
            index,
            next_index: existing + 1,
        })
    }

    pub fn board(&self) -> &BoardReference {
        &self.board
    }

    pub fn bounds(&self) -> SizeBounds {
        self.bounds
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename the next accepted pin will get. Not consumed until `commit`.
    pub fn next_filename(&self) -> String {
        image_filename(self.board.keyword(), self.next_index)
    }

    /// Writes the asset, then the metadata entry, then the index row.
    ///
    /// A failed index row takes the metadata entry back out, so the stores
    /// hold both records or neither. The filename slot is consumed only when
    /// all three succeed; after a failure the next pin reuses the slot and
    /// overwrites any orphaned asset. If the metadata entry cannot be taken
    /// back, the slot is consumed anyway so no filename is listed twice.
    pub fn commit(&mut self, record: &PinRecord, asset: &[u8]) -> Result<PathBuf, PersistError> {
        let asset_path =
            AtomicFileWriter::new(self.dir.clone()).write(&record.image_filename, asset)?;
        let before = self.metadata.append(record)?;
        if let Err(err) = self
            .index
            .append_row(&IndexRow::for_record(record, self.board.keyword()))
        {
            if let Err(restore_err) = self.metadata.restore(&before) {
                pinboard_warn!(
                    "Could not remove metadata entry for {}: {}",
                    record.image_filename,
                    restore_err
                );
                self.next_index += 1;
            }
            return Err(err);
        }
        self.next_index += 1;
        Ok(asset_path)
    }
}
