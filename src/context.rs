//! Process-wide key/value context merged into every report.

use core::fmt;

use indexmap::IndexMap;
use spin::RwLock;

/// Key/value annotations shared by every report made through one reporter.
///
/// Mutation and snapshot reads are serialized by a single reader/writer lock
/// that is only held for the duration of a copy or a single mutation.
#[derive(Default)]
pub struct ContextStore {
    entries: RwLock<IndexMap<String, String>>,
}

impl ContextStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`. The value is stored rendered.
    pub fn set(&self, key: impl Into<String>, value: impl fmt::Display) {
        let key = key.into();
        let value = value.to_string();
        tracing::trace!(%key, %value, "setting report context");
        self.entries.write().insert(key, value);
    }

    /// Removes `key`. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) {
        if self.entries.write().shift_remove(key).is_some() {
            tracing::trace!(key, "removed report context");
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Looks up a single entry.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copies the current entries out of the store.
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.entries.read().clone()
    }

    /// Renders a snapshot as `key: value` lines joined by `\n`.
    ///
    /// Returns `None` when the store is empty.
    pub fn render(&self) -> Option<String> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return None;
        }
        let lines: Vec<String> = snapshot
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        Some(lines.join("\n"))
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.read().iter()).finish()
    }
}
