//! Run-scoped record of which tokens already have an ID.

use std::collections::BTreeSet;

/// Hands out sequential IDs starting at 1, once per distinct token.
///
/// The registry is append-only for the lifetime of a run. A token's ID is
/// fixed the first time it is seen; later encounters are ignored.
#[derive(Debug, Clone)]
pub struct Registry {
    seen: BTreeSet<String>,
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry whose first ID will be `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seen: BTreeSet::new(),
            next_id: 1,
        }
    }

    /// Returns a fresh ID for `token`, or `None` if it was seen before.
    pub fn assign(&mut self, token: &str) -> Option<u64> {
        if self.seen.contains(token) {
            return None;
        }
        self.seen.insert(token.to_owned());

        let id = self.next_id;
        self.next_id += 1;
        Some(id)
    }

    /// Number of IDs handed out so far.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.next_id - 1
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
