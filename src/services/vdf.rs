//! Field extraction from Valve's KeyValues text files (`.vdf`, `.acf`).
//!
//! Callers only need a handful of scalar fields (`path`, `name`, `StateFlags`,
//! `SteamPath`), so extraction is line-oriented: every line of the form
//! `"key"   "value"` is a candidate, nesting is ignored. Callers go through
//! [`FieldExtractor`] so a structured KeyValues parser can replace
//! [`QuotedPairExtractor`] without touching them.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `"key"<whitespace>"value"` at the start of a (trimmed) line.
/// Escaped quotes inside values are not supported.
static QUOTED_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"([^"]+)"\s+"([^"]*)""#).expect("Invalid quoted pair regex")
});

/// Extracts string values for a key from KeyValues text.
pub trait FieldExtractor {
    /// Every value for `key`, in file order. Key comparison is ASCII
    /// case-insensitive, as in Steam's own reader.
    fn values(&self, content: &str, key: &str) -> Vec<String>;

    /// First non-empty value for `key`.
    fn first(&self, content: &str, key: &str) -> Option<String> {
        self.values(content, key)
            .into_iter()
            .find(|value| !value.is_empty())
    }

    /// First value for `key` that parses as an unsigned integer.
    fn first_u32(&self, content: &str, key: &str) -> Option<u32> {
        self.values(content, key)
            .iter()
            .find_map(|value| value.trim().parse().ok())
    }
}

/// Line-oriented `"key" "value"` extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedPairExtractor;

impl FieldExtractor for QuotedPairExtractor {
    fn values(&self, content: &str, key: &str) -> Vec<String> {
        content
            .lines()
            .filter_map(|line| QUOTED_PAIR.captures(line))
            .filter(|caps| caps[1].eq_ignore_ascii_case(key))
            .map(|caps| unescape(&caps[2]))
            .collect()
    }
}

/// KeyValues files escape backslashes, so Windows paths appear as `C:\\Games`.
fn unescape(value: &str) -> String {
    value.replace("\\\\", "\\")
}
