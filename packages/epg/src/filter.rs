//! Noise filtering and region keys for channel list lines.
//!
//! The channel list PDF interleaves channel identifiers with page numbers
//! and `--`-delimited banner lines. Anything matching one of the noise
//! patterns below is dropped; every other non-empty line is a channel.

use std::sync::LazyLock;

use regex::Regex;

/// A line made only of digits (page number).
static PAGE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// A `-- epg_ripper_...` source header.
static RIPPER_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^--\s*epg_ripper_").expect("valid regex"));

/// A `--...--` banner line.
static BANNER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^--.*--$").expect("valid regex"));

/// Whether an already-trimmed line is a page number, ripper header, or
/// banner.
#[must_use]
pub fn is_noise(line: &str) -> bool {
    PAGE_NUMBER_RE.is_match(line) || RIPPER_HEADER_RE.is_match(line) || BANNER_RE.is_match(line)
}

/// Trims `raw` and returns it if it is a channel line.
///
/// Returns `None` for blank lines and noise.
#[must_use]
pub fn clean_line(raw: &str) -> Option<&str> {
    let line = raw.trim();
    if line.is_empty() || is_noise(line) {
        return None;
    }
    Some(line)
}

/// Region key of a channel token: the text after its final `.`, lowercased.
///
/// A token without a `.` is its own region.
#[must_use]
pub fn region_of(token: &str) -> String {
    token
        .rsplit_once('.')
        .map_or(token, |(_, suffix)| suffix)
        .to_lowercase()
}
