//! Detection strategies.
//!
//! Both strategies answer the same question ("what is downloading right
//! now?") from different evidence, and own whatever state they need between
//! polls. The monitor loop owns the strategy and only sees [`DetectionStrategy`].

pub mod filesystem;
pub mod log_based;

pub use filesystem::FilesystemStrategy;
pub use log_based::LogStrategy;

use crate::models::{DownloadStatusRecord, StrategyKind};
use camino::Utf8Path;
use std::time::SystemTime;

/// Produces the current status records on each poll.
pub trait DetectionStrategy {
    fn kind(&self) -> StrategyKind;

    /// What is being watched, for the start banner and logs.
    fn source(&self) -> String;

    /// Something the operator should know before the first poll, such as a
    /// missing input file the strategy will wait for.
    fn startup_warning(&self) -> Option<String> {
        None
    }

    /// One poll cycle. `now` is the wall-clock time of the poll.
    fn poll(&mut self, now: SystemTime) -> Vec<DownloadStatusRecord>;
}

/// Builds the strategy selected by `kind` for an install root.
pub fn build_strategy(kind: StrategyKind, install_root: &Utf8Path) -> Box<dyn DetectionStrategy> {
    match kind {
        StrategyKind::Log => Box::new(LogStrategy::new(install_root)),
        StrategyKind::Filesystem => Box::new(FilesystemStrategy::new(install_root)),
    }
}
