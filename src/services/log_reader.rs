//! Incremental reader for Steam's append-only `content_log.txt`.
//!
//! Each poll reads only the bytes appended since the previous poll, so the
//! cost of a poll does not grow with the total size of the log.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Content log, relative to the install root.
pub const CONTENT_LOG: &str = "logs/content_log.txt";

/// Byte offset into exactly one log file.
///
/// The offset never decreases for the lifetime of the reader.
#[derive(Debug)]
pub struct LogCursorReader {
    path: Utf8PathBuf,
    cursor: u64,
    shrink_reported: bool,
}

impl LogCursorReader {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: 0,
            shrink_reported: false,
        }
    }

    /// Reader for `<install_root>/logs/content_log.txt`.
    pub fn for_install_root(install_root: &Utf8Path) -> Self {
        Self::new(install_root.join(CONTENT_LOG))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Lines appended since the previous poll, oldest first.
    ///
    /// A missing file yields nothing and leaves the cursor alone. Invalid
    /// UTF-8 is replaced, never fatal. A trailing line without a newline is
    /// returned and the cursor moves past it.
    pub fn poll(&mut self) -> Vec<String> {
        match self.read_appended() {
            Ok(bytes) => split_lines(&bytes),
            Err(e) => {
                tracing::debug!("Content log {} not readable: {}", self.path, e);
                Vec::new()
            }
        }
    }

    fn read_appended(&mut self) -> std::io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();

        if len < self.cursor {
            if !self.shrink_reported {
                tracing::warn!(
                    "Content log {} shrank to {} bytes (cursor at {}); waiting for it to grow",
                    self.path,
                    len,
                    self.cursor
                );
                self.shrink_reported = true;
            }
            return Ok(Vec::new());
        }
        self.shrink_reported = false;

        if len == self.cursor {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.cursor))?;
        let mut bytes = Vec::with_capacity((len - self.cursor) as usize);
        file.read_to_end(&mut bytes)?;

        self.cursor += bytes.len() as u64;
        tracing::debug!("Read {} new bytes from {}", bytes.len(), self.path);
        Ok(bytes)
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::TempDir;

    fn log_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().join("content_log.txt")).unwrap()
    }

    fn append(path: &Utf8Path, bytes: &[u8]) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn test_missing_file_leaves_cursor() {
        let dir = TempDir::new().unwrap();
        let mut reader = LogCursorReader::new(log_path(&dir));
        assert!(reader.poll().is_empty());
        assert_eq!(reader.cursor(), 0);
    }

    #[test]
    fn test_only_new_lines_returned() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut reader = LogCursorReader::new(&path);

        append(&path, b"first\nsecond\n");
        assert_eq!(reader.poll(), vec!["first", "second"]);
        assert_eq!(reader.cursor(), 13);

        append(&path, b"third\r\n");
        assert_eq!(reader.poll(), vec!["third"]);
        assert!(reader.poll().is_empty());
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut reader = LogCursorReader::new(&path);

        append(&path, b"AppID 1 \xff\xfe paused\n");
        let lines = reader.poll();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("AppID 1 "));
        assert!(lines[0].ends_with(" paused"));
    }

    #[test]
    fn test_partial_line_consumed() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut reader = LogCursorReader::new(&path);

        append(&path, b"complete\npart");
        assert_eq!(reader.poll(), vec!["complete", "part"]);
        append(&path, b"ial\n");
        assert_eq!(reader.poll(), vec!["ial"]);
    }

    #[test]
    fn test_shrunk_file_does_not_move_cursor_back() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut reader = LogCursorReader::new(&path);

        append(&path, b"0123456789\n");
        reader.poll();
        std::fs::write(&path, b"abc\n").unwrap();

        assert!(reader.poll().is_empty());
        assert_eq!(reader.cursor(), 11);
    }
}
