//! Active / paused classification from file modification times.
//!
//! Steam keeps a paused download's staging directory in place, so the only
//! evidence of an active transfer is that files under it keep changing.

use crate::models::DownloadStatus;
use camino::Utf8Path;
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// A staging directory counts as active if a file changed within this window.
pub const ACTIVITY_WINDOW: Duration = Duration::from_secs(120);

/// Most recent modification time of any regular file under `dir`.
///
/// `None` when the directory is missing or holds no readable files.
pub fn latest_mtime(dir: &Utf8Path) -> Option<SystemTime> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok()?.modified().ok())
        .max()
}

/// Classifies a latest modification time relative to `now`.
///
/// Exactly [`ACTIVITY_WINDOW`] old is already paused; a time in the future
/// counts as recent.
pub fn classify_mtime(latest: Option<SystemTime>, now: SystemTime) -> DownloadStatus {
    let Some(latest) = latest else {
        return DownloadStatus::Paused;
    };

    let age = now.duration_since(latest).unwrap_or(Duration::ZERO);
    if age < ACTIVITY_WINDOW {
        DownloadStatus::Downloading
    } else {
        DownloadStatus::Paused
    }
}

/// Classifies a staging directory.
pub fn classify(dir: &Utf8Path, now: SystemTime) -> DownloadStatus {
    classify_mtime(latest_mtime(dir), now)
}
