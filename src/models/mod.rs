//! Data models for steamwatch.
//!
//! This module contains the plain data structures shared by the services, the
//! detection strategies and the monitor loop:
//! - [`MonitorConfig`]: Duration, interval, strategy and path overrides
//!   loaded from `steamwatch.yaml`
//! - [`StrategyKind`]: Selects log-based or filesystem-based detection
//! - [`DownloadStatusRecord`]: One per-poll observation of a title, consumed
//!   by the presentation layer
//! - [`ManifestRecord`]: Display name and state flags read from an `appmanifest_<id>.acf`

pub mod config;
pub mod manifest;
pub mod status;

pub use config::{MonitorConfig, StrategyKind};
pub use manifest::ManifestRecord;
pub use status::{DownloadStatus, DownloadStatusRecord};
