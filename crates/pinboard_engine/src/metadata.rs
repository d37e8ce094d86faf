use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pinboard_core::{MetadataDocument, MetadataEntry, PinRecord};
use pinboard_logging::pinboard_info;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::persist::{AtomicFileWriter, PersistError};

pub const METADATA_FILENAME: &str = "metadata.json";

/// The `metadata.json` document of one board directory.
///
/// Appends read the whole document, add one entry and write it back through
/// a temp file + rename, so a crash leaves the old or the new document.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    /// Opens the store in `dir`, creating `{"image": []}` only when absent.
    pub fn ensure(dir: &Path) -> Result<Self, PersistError> {
        let store = Self {
            dir: dir.to_path_buf(),
        };
        let path = store.path();
        if path.is_file() {
            pinboard_info!("{} found!", path.display());
        } else {
            pinboard_info!("{} not found... Creating a new copy", path.display());
            store.write(&MetadataDocument::default())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(METADATA_FILENAME)
    }

    pub fn load(&self) -> Result<MetadataDocument, PersistError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(PersistError::CorruptStore {
                    path,
                    message: "store file is missing".into(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content).map_err(|err| PersistError::CorruptStore {
            path,
            message: err.to_string(),
        })
    }

    /// Adds one entry and returns the document as it was before the append.
    pub fn append(&self, record: &PinRecord) -> Result<MetadataDocument, PersistError> {
        let before = self.load()?;
        let mut document = before.clone();
        document.image.push(MetadataEntry::from(record));
        self.write(&document)?;
        Ok(before)
    }

    /// Puts back a document returned by `append`.
    pub fn restore(&self, document: &MetadataDocument) -> Result<(), PersistError> {
        self.write(document)
    }

    fn write(&self, document: &MetadataDocument) -> Result<(), PersistError> {
        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;
        AtomicFileWriter::new(self.dir.clone()).write(METADATA_FILENAME, &buffer)?;
        Ok(())
    }
}
