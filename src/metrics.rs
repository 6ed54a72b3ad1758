// Run metrics
//
// Counts what a monitor run observed, logged as a summary on shutdown.

use crate::models::DownloadStatusRecord;
use std::time::{Duration, Instant};

/// Per-run counters, owned by the monitor loop.
#[derive(Debug)]
pub struct Metrics {
    /// Poll cycles performed
    polls: u64,

    /// Polls that produced no record
    empty_polls: u64,

    /// Records reported as downloading
    downloading_records: u64,

    /// Records reported as paused
    paused_records: u64,

    /// Highest speed seen in any record, MB/s
    peak_speed_mbps: f64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            polls: 0,
            empty_polls: 0,
            downloading_records: 0,
            paused_records: 0,
            peak_speed_mbps: 0.0,
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of one poll cycle
    pub fn record_poll(&mut self, records: &[DownloadStatusRecord]) {
        self.polls += 1;
        if records.is_empty() {
            self.empty_polls += 1;
        }

        for record in records {
            if record.status.is_downloading() {
                self.downloading_records += 1;
            } else {
                self.paused_records += 1;
            }
            self.peak_speed_mbps = self.peak_speed_mbps.max(record.speed_mbps);
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn empty_polls(&self) -> u64 {
        self.empty_polls
    }

    pub fn records(&self) -> u64 {
        self.downloading_records + self.paused_records
    }

    pub fn peak_speed_mbps(&self) -> f64 {
        self.peak_speed_mbps
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Monitor Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!("Polls: {} ({} without records)", self.polls, self.empty_polls);
        tracing::info!(
            "Records: {} downloading, {} paused",
            self.downloading_records,
            self.paused_records
        );
        tracing::info!("Peak speed: {:.2} MB/s", self.peak_speed_mbps);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
