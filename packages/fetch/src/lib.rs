#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP download helpers for tv-ids source data.
//!
//! Both tools fetch a single remote resource (a PDF or a zip archive) into
//! memory before processing it. [`fetch_bytes`] does that with an optional
//! request timeout, rejects non-success statuses, and reports byte progress
//! through a [`ProgressCallback`].

pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;

use crate::progress::ProgressCallback;

/// User agent sent with every download.
pub const USER_AGENT: &str = concat!("tv-ids/", env!("CARGO_PKG_VERSION"));

/// Errors from download operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("Timed out after {secs}s fetching {url}")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        secs: u64,
    },
}

/// Options for a single download.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Upper bound on the whole request, body included. `None` waits
    /// indefinitely.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Downloads `url` fully into memory.
///
/// # Errors
///
/// Returns [`FetchError::Timeout`] if the configured timeout elapses,
/// [`FetchError::HttpStatus`] for a non-success response, and
/// [`FetchError::Http`] for any other request failure.
pub async fn fetch_bytes(
    url: &str,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<u8>, FetchError> {
    log::info!("Downloading {url}");

    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(FetchError::Http)?;

    let map_err = |e: reqwest::Error| classify(url, options, e);

    let response = client.get(url).send().await.map_err(map_err)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total_size = response.content_length();
    if let Some(size) = total_size {
        #[allow(clippy::cast_precision_loss)]
        let mb = size as f64 / 1_048_576.0;
        log::info!("  file size: {mb:.1} MB");
        progress.set_total(size);
    }

    let mut body = total_size
        .and_then(|size| usize::try_from(size).ok())
        .map_or_else(Vec::new, Vec::with_capacity);

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_err)?;
        body.extend_from_slice(&chunk);
        progress.inc(chunk.len() as u64);
    }

    #[allow(clippy::cast_precision_loss)]
    let mb = body.len() as f64 / 1_048_576.0;
    log::info!("  download complete: {mb:.1} MB");
    progress.finish(format!("downloaded {mb:.1} MB"));

    Ok(body)
}

fn classify(url: &str, options: &FetchOptions, e: reqwest::Error) -> FetchError {
    match options.timeout {
        Some(timeout) if e.is_timeout() => FetchError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        },
        _ => FetchError::Http(e),
    }
}
