// steamwatch - Steam download progress monitor
//
// This is the library crate containing install discovery, the two detection
// strategies and the monitor loop. The binary crate (main.rs) provides the
// command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod monitor;
pub mod services;
pub mod strategy;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{DownloadStatus, DownloadStatusRecord, MonitorConfig, StrategyKind};
pub use monitor::{EventSink, MonitorEvent, MonitorLoop, MonitorOutcome, Schedule};
pub use strategy::{DetectionStrategy, build_strategy};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
