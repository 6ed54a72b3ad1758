//! Strategy A: infer download state from Steam's content log.

use crate::models::{DownloadStatus, DownloadStatusRecord, StrategyKind};
use crate::services::library::enumerate_libraries;
use crate::services::log_parser::LogEventParser;
use crate::services::log_reader::LogCursorReader;
use crate::services::manifest::ManifestIndex;
use crate::strategy::DetectionStrategy;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// Log-based detection: tails the content log and reports the newest signal.
///
/// Emits at most one record per poll, and none when nothing relevant was
/// appended since the previous poll.
pub struct LogStrategy {
    install_root: Utf8PathBuf,
    reader: LogCursorReader,
    parser: LogEventParser,
}

impl LogStrategy {
    pub fn new(install_root: &Utf8Path) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            reader: LogCursorReader::for_install_root(install_root),
            parser: LogEventParser::new(),
        }
    }

    pub fn reader(&self) -> &LogCursorReader {
        &self.reader
    }
}

impl DetectionStrategy for LogStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Log
    }

    fn source(&self) -> String {
        self.reader.path().to_string()
    }

    fn startup_warning(&self) -> Option<String> {
        if self.reader.path().exists() {
            return None;
        }
        tracing::warn!("Content log not found at {}", self.reader.path());
        Some(format!(
            "Log file not found at {}, waiting for it to be created",
            self.reader.path()
        ))
    }

    fn poll(&mut self, now: SystemTime) -> Vec<DownloadStatusRecord> {
        let lines = self.reader.poll();
        let Some(event) = self.parser.latest(&lines) else {
            tracing::debug!("No download signal in {} new log lines", lines.len());
            return Vec::new();
        };

        let index = ManifestIndex::new(enumerate_libraries(&self.install_root));
        let status = if event.paused {
            DownloadStatus::Paused
        } else {
            DownloadStatus::Downloading
        };

        vec![DownloadStatusRecord::new(
            event.app_id.as_str(),
            index.display_name(&event.app_id),
            event.speed_mbps,
            status,
            now,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::log_reader::CONTENT_LOG;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::TempDir;

    fn steam_root(dir: &TempDir) -> Utf8PathBuf {
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("logs")).unwrap();
        fs::create_dir_all(root.join("steamapps")).unwrap();
        root
    }

    fn append_log(root: &Utf8Path, text: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(root.join(CONTENT_LOG))
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn test_latest_signal_reported_once() {
        let dir = TempDir::new().unwrap();
        let root = steam_root(&dir);
        fs::write(
            root.join("steamapps/appmanifest_620.acf"),
            "\"name\"\t\t\"Portal 2\"\n",
        )
        .unwrap();
        append_log(
            &root,
            "AppID 620 update, downloaded 10 MB at 1.25 MB/s\n\
             AppID 620 update, downloaded 20 MB at 3.75 MB/s\n",
        );

        let mut strategy = LogStrategy::new(&root);
        let records = strategy.poll(SystemTime::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "Portal 2");
        assert_eq!(records[0].speed_mbps, 3.75);
        assert_eq!(records[0].status, DownloadStatus::Downloading);

        let cursor = strategy.reader().cursor();
        assert!(cursor > 0);
        assert!(strategy.poll(SystemTime::now()).is_empty());
        assert_eq!(strategy.reader().cursor(), cursor);
    }

    #[test]
    fn test_missing_log_warns_until_created() {
        let dir = TempDir::new().unwrap();
        let root = steam_root(&dir);
        let strategy = LogStrategy::new(&root);

        let warning = strategy.startup_warning().unwrap();
        assert!(warning.contains("content_log.txt"));
        assert!(warning.contains("waiting for it to be created"));

        append_log(&root, "AppID 620 update started\n");
        assert_eq!(strategy.startup_warning(), None);
    }

    #[test]
    fn test_pause_signal() {
        let dir = TempDir::new().unwrap();
        let root = steam_root(&dir);
        append_log(&root, "AppID 620 update, downloaded 20 MB at 3.75 MB/s\n");

        let mut strategy = LogStrategy::new(&root);
        strategy.poll(SystemTime::now());

        append_log(&root, "AppID 620 paused\n");
        let records = strategy.poll(SystemTime::now());
        assert_eq!(records[0].status, DownloadStatus::Paused);
        assert_eq!(records[0].speed_mbps, 0.0);
        assert_eq!(records[0].display_name, "AppID 620");
    }
}
