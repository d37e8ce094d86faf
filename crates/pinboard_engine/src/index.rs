use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use pinboard_core::IndexRow;
use pinboard_logging::pinboard_info;

use crate::persist::PersistError;

pub const INDEX_FILENAME: &str = "infographics.csv";
pub const INDEX_HEADER: &str = "Image filename, Search keyword, Partial caption, URL";

/// The `infographics.csv` index of one board directory. Rows are appended
/// one at a time: open in append mode, write, close.
#[derive(Debug, Clone)]
pub struct CsvIndex {
    path: PathBuf,
}

impl CsvIndex {
    /// Opens the index in `dir`, writing the header only when the file is new.
    pub fn ensure(dir: &Path) -> Result<Self, PersistError> {
        let path = dir.join(INDEX_FILENAME);
        if path.is_file() {
            pinboard_info!("{} found!", path.display());
        } else {
            pinboard_info!("{} not found... Creating a new copy", path.display());
            // `create_new` keeps a concurrently created file intact.
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => writeln!(file, "{INDEX_HEADER}")?,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_row(&self, row: &IndexRow) -> Result<(), PersistError> {
        let file: File = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            row.image_filename.as_str(),
            row.keyword.as_str(),
            row.partial_caption.as_str(),
            row.item_url.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}
