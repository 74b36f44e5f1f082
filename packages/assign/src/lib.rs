#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sequential ID assignment for grouped lookup tables.
//!
//! Both tv-ids tools turn a stream of `(token, group)` pairs into a two-level
//! JSON document `{ group: { token: id, ... }, ... }`. The shared pieces
//! live here:
//!
//! - [`Registry`] hands out IDs `1..=N` in first-occurrence order and
//!   ignores tokens it has already seen.
//! - [`GroupSink`] is the output side: something that can open a group,
//!   take entries, and close it again. [`JsonGroupWriter`] streams straight
//!   to a [`std::io::Write`]; [`GroupedIds`] keeps everything in memory.
//! - [`Assigner`] drives a sink from the token stream, opening a new group
//!   whenever the group key changes.

pub mod document;
pub mod registry;
pub mod writer;

pub use document::GroupedIds;
pub use registry::Registry;
pub use writer::JsonGroupWriter;

use std::collections::BTreeSet;

/// Errors from ID assignment and output serialization.
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A token or group key could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Group open/close calls were not balanced.
    #[error("Unbalanced group: {0}")]
    UnbalancedGroup(String),
}

/// Destination for grouped `token -> id` entries.
///
/// Calls must be balanced: every [`open_group`](Self::open_group) is
/// followed by zero or more [`entry`](Self::entry) calls and exactly one
/// [`close_group`](Self::close_group) before the next group is opened or
/// the sink is finished.
pub trait GroupSink {
    /// Starts a new group named `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::UnbalancedGroup`] if a group is already open,
    /// or an I/O error from the underlying output.
    fn open_group(&mut self, key: &str) -> Result<(), AssignError>;

    /// Adds `token` with `id` to the currently open group.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::UnbalancedGroup`] if no group is open, or an
    /// I/O error from the underlying output.
    fn entry(&mut self, token: &str, id: u64) -> Result<(), AssignError>;

    /// Closes the currently open group.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::UnbalancedGroup`] if no group is open, or an
    /// I/O error from the underlying output.
    fn close_group(&mut self) -> Result<(), AssignError>;

    /// Closes the document. No further calls are valid afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::UnbalancedGroup`] if a group is still open,
    /// or an I/O error from the underlying output.
    fn finish(&mut self) -> Result<(), AssignError>;
}

/// Counts reported once a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignSummary {
    /// Number of distinct tokens that received an ID.
    pub ids: u64,
    /// Number of group blocks opened.
    pub groups: u64,
    /// Number of tokens skipped because they had already been seen.
    pub duplicates: u64,
}

/// Drives a [`GroupSink`] from a stream of `(token, group)` pairs.
///
/// Deduplication is global across the run: a token already seen under any
/// group is skipped. A new group block is opened whenever the incoming
/// group differs from the most recently opened one.
pub struct Assigner<S: GroupSink> {
    sink: S,
    registry: Registry,
    current_group: Option<String>,
    opened: BTreeSet<String>,
    summary: AssignSummary,
}

impl<S: GroupSink> Assigner<S> {
    /// Creates an assigner with a fresh registry writing into `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            registry: Registry::new(),
            current_group: None,
            opened: BTreeSet::new(),
            summary: AssignSummary::default(),
        }
    }

    /// Assigns the next ID to `token` under `group`.
    ///
    /// Returns the new ID, or `None` if the token was already assigned one
    /// earlier in the run.
    ///
    /// # Errors
    ///
    /// Propagates any error from the sink.
    pub fn push(&mut self, token: &str, group: &str) -> Result<Option<u64>, AssignError> {
        let Some(id) = self.registry.assign(token) else {
            self.summary.duplicates += 1;
            return Ok(None);
        };

        self.switch_group(group)?;
        self.sink.entry(token, id)?;
        self.summary.ids += 1;

        Ok(Some(id))
    }

    /// Makes `group` the open group even if no token arrives for it.
    ///
    /// Used when every group must appear in the output, including empty
    /// ones. Does nothing if `group` is already the open group.
    ///
    /// # Errors
    ///
    /// Propagates any error from the sink.
    pub fn ensure_group(&mut self, group: &str) -> Result<(), AssignError> {
        self.switch_group(group)
    }

    fn switch_group(&mut self, group: &str) -> Result<(), AssignError> {
        if self.current_group.as_deref() == Some(group) {
            return Ok(());
        }

        if self.current_group.is_some() {
            self.sink.close_group()?;
        }

        if !self.opened.insert(group.to_owned()) {
            log::warn!("Group \"{group}\" reopened after another group; output repeats the key");
        }

        self.sink.open_group(group)?;
        self.current_group = Some(group.to_owned());
        self.summary.groups += 1;

        Ok(())
    }

    /// Closes the last open group and the document, returning the sink.
    ///
    /// # Errors
    ///
    /// Propagates any error from the sink.
    pub fn finish(mut self) -> Result<(S, AssignSummary), AssignError> {
        if self.current_group.take().is_some() {
            self.sink.close_group()?;
        }
        self.sink.finish()?;

        log::debug!(
            "Assigned {} IDs across {} groups ({} duplicates skipped)",
            self.summary.ids,
            self.summary.groups,
            self.summary.duplicates
        );

        Ok((self.sink, self.summary))
    }
}
