//! Content log line parsing: download speed and pause signals.

use regex::Regex;

/// A download signal extracted from one content log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub app_id: String,
    pub speed_mbps: f64,
    pub paused: bool,
}

/// Parser for Steam content log lines.
///
/// Recognized shapes:
///
/// - `speed_pattern`: an `AppID <digits>` token followed later by a number
///   directly before `MB/s`
///   - Pattern: `AppID (\d+).*?(\d+\.?\d*)\s*MB/s`
///   - Example match: "AppID 123 update, downloaded 10 MB at 5.50 MB/s"
///
/// - `app_pattern` plus a pause keyword (`paused` or `suspended`, any case)
///   and no speed
///   - Pattern: `AppID (\d+)`
///   - Example match: "AppID 123 paused"
///
/// The parser is stateless; [`LogEventParser::latest`] picks the most recent
/// signal out of a batch.
pub struct LogEventParser {
    speed_pattern: Regex,
    app_pattern: Regex,
}

impl LogEventParser {
    pub fn new() -> Self {
        Self {
            speed_pattern: Regex::new(r"AppID (\d+).*?(\d+\.?\d*)\s*MB/s")
                .expect("Invalid speed regex"),
            app_pattern: Regex::new(r"AppID (\d+)").expect("Invalid app id regex"),
        }
    }

    /// Signal carried by `line`, if any.
    pub fn parse_line(&self, line: &str) -> Option<LogEvent> {
        let paused = has_pause_keyword(line);

        if let Some(caps) = self.speed_pattern.captures(line) {
            if let Ok(speed) = caps[2].parse::<f64>() {
                return Some(LogEvent {
                    app_id: caps[1].to_string(),
                    speed_mbps: speed,
                    paused,
                });
            }
        }

        if paused {
            let caps = self.app_pattern.captures(line)?;
            return Some(LogEvent {
                app_id: caps[1].to_string(),
                speed_mbps: 0.0,
                paused: true,
            });
        }

        None
    }

    /// The most recent signal in a batch ordered oldest to newest.
    pub fn latest<S: AsRef<str>>(&self, lines: &[S]) -> Option<LogEvent> {
        lines
            .iter()
            .rev()
            .find_map(|line| self.parse_line(line.as_ref()))
    }
}

impl Default for LogEventParser {
    fn default() -> Self {
        Self::new()
    }
}

fn has_pause_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("paused") || lower.contains("suspended")
}
