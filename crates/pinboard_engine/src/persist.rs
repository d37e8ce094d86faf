use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pinboard_logging::pinboard_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download root {0} does not exist or is not a directory")]
    InvalidRoot(PathBuf),
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("metadata store {path} is unreadable: {message}")]
    CorruptStore { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Existing directory that board directories are created under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRoot(PathBuf);

impl DownloadRoot {
    /// The root must already exist; it is never created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        if path.is_dir() {
            Ok(Self(path))
        } else {
            Err(PersistError::InvalidRoot(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Ensure the directory exists and is writable; create it if missing.
/// Existing content is never touched.
pub fn ensure_directory(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        pinboard_info!("{} found!", dir.display());
    } else {
        pinboard_info!("{} not found... Creating a new directory", dir.display());
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file in
/// the same directory then renaming it over the target.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        if !self.dir.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // `persist` renames over an existing target.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
