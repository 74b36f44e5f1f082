#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds `logos.json` from the `tv-logo/tv-logos` repository archive.
//!
//! The repository keeps its images under `countries/<country>/...`. This
//! crate downloads the repository zip, extracts it, and numbers every image
//! file country by country (countries sorted case-insensitively), producing
//! `{ "<country>": { "<country>/<relative path>": id, ... }, ... }`.
//!
//! The table is small, so it is built in memory as [`GroupedIds`] and
//! written in one go with a four-space indent.

pub mod archive;
pub mod walk;

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tv_ids_assign::{AssignError, AssignSummary, Assigner, GroupedIds};
use tv_ids_fetch::progress::ProgressCallback;
use tv_ids_fetch::{FetchError, FetchOptions, fetch_bytes};

use crate::walk::{LogoFiles, country_dirs};

/// Zip of the logo repository's main branch.
pub const ZIP_URL: &str = "https://github.com/tv-logo/tv-logos/archive/refs/heads/main.zip";

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "logos.json";

/// Top-level directory inside the repository zip.
pub const ARCHIVE_ROOT: &str = "tv-logos-main";

/// Directory under [`ARCHIVE_ROOT`] holding one subdirectory per country.
pub const COUNTRIES_DIR: &str = "countries";

/// Image extensions that count as logos, lowercase and without the dot.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Errors from building the logo ID table.
#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    /// Downloading the archive failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The archive could not be read or extracted.
    #[error("Archive error: {0}")]
    Archive(String),

    /// The extracted archive has no `countries/` directory.
    #[error("Countries directory not found: {0}")]
    CountriesNotFound(String),

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Building or serializing the ID table failed.
    #[error(transparent)]
    Assign(#[from] AssignError),
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct LogoConfig {
    /// Where to download the repository zip from.
    pub url: String,
    /// Where to write the JSON table.
    pub output: PathBuf,
    /// Directory the archive is extracted into.
    pub extract_dir: PathBuf,
    /// Optional timeout for the download.
    pub timeout: Option<Duration>,
}

impl LogoConfig {
    /// Default settings with the output file and the extracted archive both
    /// placed in `dir`.
    #[must_use]
    pub fn alongside(dir: &Path) -> Self {
        Self {
            url: ZIP_URL.to_owned(),
            output: dir.join(DEFAULT_OUTPUT),
            extract_dir: dir.to_path_buf(),
            timeout: None,
        }
    }

    /// Path of the `countries/` directory after extraction.
    #[must_use]
    pub fn countries_dir(&self) -> PathBuf {
        self.extract_dir.join(ARCHIVE_ROOT).join(COUNTRIES_DIR)
    }
}

/// Counts reported after the table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoSummary {
    /// Number of country groups in the table.
    pub countries: usize,
    /// Number of logos across all countries.
    pub logos: usize,
}

/// Numbers every logo under `countries_dir`.
///
/// Every country directory appears in the result, even one with no images.
/// Tokens are `<country>/<path relative to the country directory>`.
///
/// # Errors
///
/// Returns [`LogoError::CountriesNotFound`] if `countries_dir` is not a
/// directory, or [`LogoError::Io`] if part of the tree cannot be read.
pub fn build_logo_index(countries_dir: &Path) -> Result<(GroupedIds, AssignSummary), LogoError> {
    if !countries_dir.is_dir() {
        return Err(LogoError::CountriesNotFound(
            countries_dir.display().to_string(),
        ));
    }

    let mut assigner = Assigner::new(GroupedIds::new());

    for country in country_dirs(countries_dir)? {
        assigner.ensure_group(&country.name)?;

        let mut count = 0u64;
        for rel in LogoFiles::new(&country.path) {
            let token = format!("{}/{}", country.name, rel?);
            if assigner.push(&token, &country.name)?.is_some() {
                count += 1;
            }
        }

        log::debug!("{}: {count} logos", country.name);
    }

    Ok(assigner.finish()?)
}

/// Writes `index` to `path` as pretty JSON, replacing the file.
///
/// # Errors
///
/// Returns [`LogoError::Io`] if the file cannot be created or flushed, or
/// [`LogoError::Assign`] if serialization fails.
pub fn write_logo_index(index: &GroupedIds, path: &Path) -> Result<(), LogoError> {
    let file = File::create(path).map_err(|e| LogoError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    index.write_pretty(&mut writer, b"    ")?;
    writer.flush().map_err(|e| LogoError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Downloads and extracts the logo repository, then writes the ID table.
///
/// # Errors
///
/// Returns the first download, extraction, traversal, or write error;
/// nothing is retried.
pub async fn run(
    config: &LogoConfig,
    download_progress: &Arc<dyn ProgressCallback>,
) -> Result<LogoSummary, LogoError> {
    let mut options = FetchOptions::default();
    if let Some(timeout) = config.timeout {
        options = options.with_timeout(timeout);
    }

    let bytes = fetch_bytes(&config.url, &options, download_progress).await?;
    archive::extract_zip(&bytes, &config.extract_dir)?;
    drop(bytes);

    let (index, assigned) = build_logo_index(&config.countries_dir())?;
    write_logo_index(&index, &config.output)?;

    let summary = LogoSummary {
        countries: index.groups().len(),
        logos: index.entry_count(),
    };

    log::info!(
        "{} written ({} countries, {} logos, {} IDs)",
        config.output.display(),
        summary.countries,
        summary.logos,
        assigned.ids
    );

    Ok(summary)
}
