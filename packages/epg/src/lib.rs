#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds `tvg-ids.json` from the epgshare01 channel list PDF.
//!
//! The PDF lists every channel identifier (`"BBC One.uk"`) the EPG ripper
//! knows about, interleaved with page numbers and banner lines. This crate
//! downloads it, reads it page by page, drops the noise, and streams each
//! new channel into a [`JsonGroupWriter`] grouped by its region suffix:
//!
//! ```json
//! {
//!   "uk": {
//!     "BBC One.uk": 1
//!   }
//! }
//! ```

pub mod filter;
pub mod pages;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tv_ids_assign::{AssignError, AssignSummary, Assigner, JsonGroupWriter};
use tv_ids_fetch::progress::ProgressCallback;
use tv_ids_fetch::{FetchError, FetchOptions, fetch_bytes};

use crate::pages::{ChannelLines, PdfPages};

/// Channel list published by epgshare01.
pub const PDF_URL: &str = "https://epgshare01.online/epgshare01/epg_ripper_ALL_SOURCES1.pdf";

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "tvg-ids.json";

/// Default timeout for the PDF download.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from building the channel ID table.
#[derive(Debug, thiserror::Error)]
pub enum EpgError {
    /// Downloading the PDF failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The output file could not be created.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the ID table failed.
    #[error(transparent)]
    Assign(#[from] AssignError),
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct EpgConfig {
    /// Where to download the PDF from.
    pub url: String,
    /// Where to write the JSON table.
    pub output: PathBuf,
    /// Timeout for the download.
    pub timeout: Duration,
}

impl EpgConfig {
    /// Default settings with the output file placed in `dir`.
    ///
    /// The binary passes its own directory, so the table lands next to the
    /// program regardless of the working directory.
    #[must_use]
    pub fn alongside(dir: &Path) -> Self {
        Self {
            url: PDF_URL.to_owned(),
            output: dir.join(DEFAULT_OUTPUT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Streams channel lines into `out` as a region-grouped ID table.
///
/// Each distinct channel gets the next ID in first-seen order; repeats are
/// skipped. A new region block starts whenever the region changes.
///
/// # Errors
///
/// Returns the first error from `lines` (entries already written stay in
/// `out`), or [`EpgError::Assign`] if writing to `out` fails.
pub fn write_channel_ids<W: Write>(
    lines: impl IntoIterator<Item = Result<String, EpgError>>,
    out: W,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AssignSummary, EpgError> {
    let mut assigner = Assigner::new(JsonGroupWriter::new(out)?);

    for channel in lines {
        let channel = channel?;
        let region = filter::region_of(&channel);
        if assigner.push(&channel, &region)?.is_some() {
            progress.inc(1);
        }
    }

    let (_, summary) = assigner.finish()?;
    Ok(summary)
}

/// Writes the channel ID table to the file at `path`, replacing it.
///
/// # Errors
///
/// Returns [`EpgError::Io`] if the file cannot be created, otherwise the
/// first error from `lines` or from writing. A partially written file is
/// left in place.
pub fn write_channel_ids_to_path(
    lines: impl IntoIterator<Item = Result<String, EpgError>>,
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AssignSummary, EpgError> {
    let file = File::create(path).map_err(|e| EpgError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    write_channel_ids(lines, BufWriter::new(file), progress)
}

/// Downloads the channel list PDF and writes the ID table.
///
/// # Errors
///
/// Returns the first download, extraction, or write error; nothing is
/// retried and a partially written output file is left in place.
pub async fn run(
    config: &EpgConfig,
    download_progress: &Arc<dyn ProgressCallback>,
    assign_progress: &Arc<dyn ProgressCallback>,
) -> Result<AssignSummary, EpgError> {
    let options = FetchOptions::default().with_timeout(config.timeout);
    let pdf = fetch_bytes(&config.url, &options, download_progress).await?;

    let pages = PdfPages::load(&pdf)?;
    drop(pdf);

    log::info!(
        "Writing {} from {} pages",
        config.output.display(),
        pages.remaining()
    );

    let summary =
        write_channel_ids_to_path(ChannelLines::new(pages), &config.output, assign_progress)?;

    log::info!(
        "{} written ({} channel IDs, {} regions, {} duplicates skipped)",
        config.output.display(),
        summary.ids,
        summary.groups,
        summary.duplicates
    );
    assign_progress.finish(format!("{} channel IDs", summary.ids));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tv_ids_fetch::progress::null_progress;

    fn to_strings(lines: &[&str]) -> Vec<Result<String, EpgError>> {
        lines.iter().map(|l| Ok((*l).to_owned())).collect()
    }

    #[test]
    fn groups_channels_by_region_in_first_seen_order() {
        let mut buf = Vec::new();
        let summary = write_channel_ids(
            to_strings(&["BBC One.uk", "BBC One.uk", "CNN.us", "France 2.fr"]),
            &mut buf,
            &null_progress(),
        )
        .unwrap();

        assert_eq!(summary.ids, 3);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\n  \"uk\": {\n    \"BBC One.uk\": 1\n  },\n  \"us\": {\n    \"CNN.us\": 2\n  },\n  \"fr\": {\n    \"France 2.fr\": 3\n  }\n}\n"
        );
    }

    #[test]
    fn pages_to_file_round_trip_through_json() {
        let tmp = std::env::temp_dir().join("tv_ids_epg_write_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("tvg-ids.json");

        let pages = to_strings(&[
            "-- epg_ripper_ALL_SOURCES1 --\n1\nBBC One.uk\nITV.UK\n",
            "2\n-- US --\nCNN.us\nBBC One.uk\nNoRegion\n",
        ]);

        let summary =
            write_channel_ids_to_path(ChannelLines::new(pages), &path, &null_progress()).unwrap();
        assert_eq!(summary.ids, 4);
        assert_eq!(summary.duplicates, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "uk": { "BBC One.uk": 1, "ITV.UK": 2 },
                "us": { "CNN.us": 3 },
                "noregion": { "NoRegion": 4 },
            })
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_output_directory_is_an_io_error() {
        let path = std::env::temp_dir()
            .join("tv_ids_epg_missing_dir")
            .join("nested")
            .join("tvg-ids.json");
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("tv_ids_epg_missing_dir"));

        let result = write_channel_ids_to_path(to_strings(&[]), &path, &null_progress());
        assert!(matches!(result, Err(EpgError::Io { .. })));
    }

    #[test]
    fn page_error_keeps_earlier_entries_on_disk() {
        let tmp = std::env::temp_dir().join("tv_ids_epg_partial_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("tvg-ids.json");

        let pages = vec![
            Ok("1\nBBC One.uk\nITV.uk\n".to_owned()),
            Err(EpgError::Extraction("failed to extract page 2".to_owned())),
            Ok("CNN.us\n".to_owned()),
        ];

        let result = write_channel_ids_to_path(ChannelLines::new(pages), &path, &null_progress());
        assert!(matches!(result, Err(EpgError::Extraction(_))));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"uk\": {\n    \"BBC One.uk\": 1,\n    \"ITV.uk\": 2"));
        assert!(!text.contains("CNN.us"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn defaults_match_published_source() {
        let dir = Path::new("/opt/tv-ids");
        let config = EpgConfig::alongside(dir);
        assert_eq!(config.url, PDF_URL);
        assert_eq!(config.output, PathBuf::from("/opt/tv-ids/tvg-ids.json"));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
