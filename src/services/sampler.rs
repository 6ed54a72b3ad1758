//! Throughput estimation from the growth of a staging directory.

use camino::Utf8Path;
use std::collections::HashMap;
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Errors from walking a staging directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Staging directory not found: {0}")]
    NotFound(String),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// Total size of every regular file under `dir`.
///
/// Entries that vanish or become unreadable mid-walk are skipped; only a
/// missing or unreadable root is an error.
pub fn staged_bytes(dir: &Utf8Path) -> Result<u64, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotFound(dir.to_string()));
    }

    let mut total = 0u64;
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: dir.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", dir, e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => total = total.saturating_add(metadata.len()),
            Err(e) => tracing::debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    Ok(total)
}

/// Last observation of one app's staging directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSample {
    pub bytes: u64,
    pub observed_at: SystemTime,
}

/// Per-app size samples and the throughput between consecutive ones.
#[derive(Debug, Default)]
pub struct SizeSampler {
    samples: HashMap<String, SizeSample>,
}

impl SizeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `dir` and returns the throughput since the previous sample in MiB/s.
    ///
    /// A missing or unreadable directory yields 0 and leaves the stored sample
    /// untouched.
    pub fn sample(&mut self, app_id: &str, dir: &Utf8Path, now: SystemTime) -> f64 {
        match staged_bytes(dir) {
            Ok(bytes) => self.record(app_id, bytes, now),
            Err(e) => {
                tracing::debug!("No size sample for {}: {}", app_id, e);
                0.0
            }
        }
    }

    /// Stores `(bytes, now)` for `app_id` and returns the throughput since the
    /// previous sample in MiB/s.
    ///
    /// The first sample of an app, a non-positive elapsed time and a shrinking
    /// directory all yield 0. The sample is replaced in every case.
    pub fn record(&mut self, app_id: &str, bytes: u64, now: SystemTime) -> f64 {
        let current = SizeSample {
            bytes,
            observed_at: now,
        };

        let speed = match self.samples.insert(app_id.to_string(), current) {
            Some(previous) => throughput(previous, current),
            None => 0.0,
        };

        tracing::debug!("AppID {} staged {} bytes, {:.2} MB/s", app_id, bytes, speed);
        speed
    }

    pub fn last_sample(&self, app_id: &str) -> Option<SizeSample> {
        self.samples.get(app_id).copied()
    }
}

fn throughput(previous: SizeSample, current: SizeSample) -> f64 {
    let elapsed = match current.observed_at.duration_since(previous.observed_at) {
        Ok(elapsed) if !elapsed.is_zero() => elapsed.as_secs_f64(),
        _ => return 0.0,
    };

    let delta = current.bytes as f64 - previous.bytes as f64;
    (delta / elapsed / BYTES_PER_MIB).max(0.0)
}
