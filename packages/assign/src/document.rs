//! In-memory grouped ID table.
//!
//! For inputs small enough to hold at once. Keeps groups and entries in
//! insertion order and serializes them as JSON objects in that order.

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{AssignError, GroupSink};

/// One group of the table: its key and `(token, id)` entries in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub entries: Vec<(String, u64)>,
}

/// A [`GroupSink`] that collects the whole document in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedIds {
    groups: Vec<Group>,
    open: bool,
}

impl GroupedIds {
    /// Creates an empty table with no groups.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: Vec::new(),
            open: false,
        }
    }

    /// Groups in the order they were opened.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Total number of entries across all groups.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Writes the document as pretty-printed JSON using `indent` per level.
    ///
    /// Non-ASCII characters are written verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_pretty<W: Write>(&self, out: W, indent: &[u8]) -> Result<(), AssignError> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
        let mut ser = serde_json::Serializer::with_formatter(out, formatter);
        self.serialize(&mut ser)?;
        Ok(())
    }
}

impl GroupSink for GroupedIds {
    fn open_group(&mut self, key: &str) -> Result<(), AssignError> {
        if self.open {
            return Err(AssignError::UnbalancedGroup(format!(
                "cannot open \"{key}\" while another group is open"
            )));
        }
        self.groups.push(Group {
            key: key.to_owned(),
            entries: Vec::new(),
        });
        self.open = true;
        Ok(())
    }

    fn entry(&mut self, token: &str, id: u64) -> Result<(), AssignError> {
        match self.groups.last_mut() {
            Some(group) if self.open => {
                group.entries.push((token.to_owned(), id));
                Ok(())
            }
            _ => Err(AssignError::UnbalancedGroup(format!(
                "entry \"{token}\" written outside a group"
            ))),
        }
    }

    fn close_group(&mut self) -> Result<(), AssignError> {
        if !self.open {
            return Err(AssignError::UnbalancedGroup(
                "close without an open group".to_owned(),
            ));
        }
        self.open = false;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AssignError> {
        if self.open {
            return Err(AssignError::UnbalancedGroup(
                "document finished with a group still open".to_owned(),
            ));
        }
        Ok(())
    }
}

struct Entries<'a>(&'a [(String, u64)]);

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (token, id) in self.0 {
            map.serialize_entry(token, id)?;
        }
        map.end()
    }
}

impl Serialize for GroupedIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.key, &Entries(&group.entries))?;
        }
        map.end()
    }
}
