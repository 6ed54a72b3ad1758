use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which detection strategy the monitor loop drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Tail `logs/content_log.txt` and parse speed / pause lines
    Log,
    /// Watch staging directories and manifest state flags
    Filesystem,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Log => write!(f, "log"),
            StrategyKind::Filesystem => write!(f, "filesystem"),
        }
    }
}

/// Monitor configuration from steamwatch.yaml
///
/// Every field has a default so a partial (or missing) file is valid.
/// Values can also be overridden with `STEAMWATCH_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Total monitoring time
    pub duration_minutes: u64,

    /// Pause between two poll cycles
    pub interval_seconds: u64,

    pub strategy: StrategyKind,

    /// Explicit Steam install root; skips registry probing when it exists
    pub steam_path: Option<String>,

    pub log_dir: String,

    pub debug_mode: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration_minutes(),
            interval_seconds: default_interval_seconds(),
            strategy: StrategyKind::Filesystem,
            steam_path: None,
            log_dir: "logs".to_string(),
            debug_mode: false,
        }
    }
}

impl MonitorConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

fn default_duration_minutes() -> u64 {
    5
}

fn default_interval_seconds() -> u64 {
    60
}
