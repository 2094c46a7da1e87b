//! Retention cleanup for generated exports.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::info;

use super::Result;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Deletes `*.<extension>` files directly inside `dir` whose modification
/// time is more than `days_to_keep` days old. Returns the number deleted.
pub fn cleanup_old_files(dir: &Path, extension: &str, days_to_keep: u32) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(u64::from(days_to_keep) * SECS_PER_DAY))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        if metadata.modified()? < cutoff {
            info!(file = %path.display(), "Removing expired export");
            std::fs::remove_file(&path)?;
            deleted += 1;
        }
    }

    info!(deleted, days_to_keep, "Cleanup finished");
    Ok(deleted)
}
