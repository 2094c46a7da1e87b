//! Relocation of loaded files into the processed area.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::error::ArchiveError;

/// Default name of the processed subdirectory inside the data directory.
pub const DEFAULT_PROCESSED_DIR: &str = "processed";

/// Moves files into a processed directory, keeping their names.
///
/// The move is the only "done" marker for a file, so it must run only after
/// the file's batch has been committed.
#[derive(Debug, Clone)]
pub struct Archiver {
    processed_dir: PathBuf,
}

impl Archiver {
    /// Creates an archiver that moves files into `processed_dir`.
    pub fn new(processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            processed_dir: processed_dir.into(),
        }
    }

    /// Moves `source` into the processed directory and returns the new path.
    ///
    /// The directory is created when absent. An existing file with the same
    /// name is replaced.
    pub async fn archive(&self, source: &Path) -> Result<PathBuf, ArchiveError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| ArchiveError::NoFileName(source.to_path_buf()))?;

        fs::create_dir_all(&self.processed_dir)
            .await
            .map_err(|e| ArchiveError::CreateDir {
                path: self.processed_dir.clone(),
                source: e,
            })?;

        let target = self.processed_dir.join(file_name);
        if fs::try_exists(&target).await.unwrap_or(false) {
            warn!(target = %target.display(), "Replacing previously archived file");
        }

        fs::rename(source, &target)
            .await
            .map_err(|e| ArchiveError::Move {
                from: source.to_path_buf(),
                to: target.clone(),
                source: e,
            })?;

        info!(from = %source.display(), to = %target.display(), "File archived");
        Ok(target)
    }
}
