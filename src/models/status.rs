use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Whether a title is actively transferring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloading,
    Paused,
}

impl DownloadStatus {
    pub fn is_downloading(self) -> bool {
        self == DownloadStatus::Downloading
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::Downloading => write!(f, "downloading"),
            DownloadStatus::Paused => write!(f, "paused"),
        }
    }
}

/// One observation of one title, produced by a single poll.
///
/// Records are never persisted; the presentation layer consumes them as they
/// are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadStatusRecord {
    pub app_id: String,
    pub display_name: String,
    /// Throughput in MiB per second. Always `>= 0`, and `0` for paused titles.
    pub speed_mbps: f64,
    pub status: DownloadStatus,
    pub timestamp: DateTime<Local>,
}

impl DownloadStatusRecord {
    pub fn new(
        app_id: impl Into<String>,
        display_name: impl Into<String>,
        speed_mbps: f64,
        status: DownloadStatus,
        observed_at: SystemTime,
    ) -> Self {
        let speed_mbps = if status.is_downloading() && speed_mbps.is_finite() {
            speed_mbps.max(0.0)
        } else {
            0.0
        };

        Self {
            app_id: app_id.into(),
            display_name: display_name.into(),
            speed_mbps,
            status,
            timestamp: DateTime::<Local>::from(observed_at),
        }
    }

    /// Throughput in megabits per second (MB/s x 8), as shown next to MB/s.
    pub fn speed_mbit(&self) -> f64 {
        self.speed_mbps * 8.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_record_has_zero_speed() {
        let now = SystemTime::now();
        let record = DownloadStatusRecord::new("10", "Half-Life", 4.2, DownloadStatus::Paused, now);
        assert_eq!(record.speed_mbps, 0.0);
    }

    #[test]
    fn test_negative_speed_clamped() {
        let record = DownloadStatusRecord::new(
            "10",
            "Half-Life",
            -3.0,
            DownloadStatus::Downloading,
            SystemTime::now(),
        );
        assert_eq!(record.speed_mbps, 0.0);
    }

    #[test]
    fn test_speed_mbit() {
        let record = DownloadStatusRecord::new(
            "10",
            "Half-Life",
            2.5,
            DownloadStatus::Downloading,
            SystemTime::now(),
        );
        assert_eq!(record.speed_mbit(), 20.0);
    }
}
