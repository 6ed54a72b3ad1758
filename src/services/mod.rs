//! Services module - the download-state inference engine.
//!
//! Everything here reads state owned by the Steam client (registry, logs,
//! manifests, staging directories) and never writes to it. Missing or
//! malformed inputs are treated as "no signal": they are logged at `debug`
//! and turned into empty results, never propagated.
//!
//! # Components
//!
//! - [`location`]: Finds the install root from the registry (or its
//!   `registry.vdf` mirror) and conventional install directories
//! - [`library`]: Builds the [`LibrarySet`] from `libraryfolders.vdf`
//! - [`manifest`]: [`ManifestIndex`] name / `StateFlags` lookup in `appmanifest_<id>.acf`
//! - [`vdf`]: Line-oriented `"key" "value"` extraction behind [`FieldExtractor`]
//!
//! Log-based detection:
//! - [`log_reader`]: [`LogCursorReader`] tails `logs/content_log.txt`
//! - [`log_parser`]: [`LogEventParser`] pulls app id, speed and pause signals from lines
//!
//! Filesystem-based detection:
//! - [`discovery`]: Candidate app ids from manifests and staging directories
//! - [`sampler`]: [`SizeSampler`] turns staging directory growth into MB/s
//! - [`activity`]: Active / paused classification from file modification times

pub mod activity;
pub mod discovery;
pub mod library;
pub mod location;
pub mod log_parser;
pub mod log_reader;
pub mod manifest;
pub mod sampler;
pub mod vdf;

pub use activity::{ACTIVITY_WINDOW, classify};
pub use discovery::{discover_active, staging_dir};
pub use library::{LibrarySet, enumerate_libraries};
pub use location::{KeyValueStore, LocationResolver, StoreProbe, StoreScope, SystemStore};
pub use log_parser::{LogEvent, LogEventParser};
pub use log_reader::LogCursorReader;
pub use manifest::ManifestIndex;
pub use sampler::{ScanError, SizeSampler};
pub use vdf::{FieldExtractor, QuotedPairExtractor};
