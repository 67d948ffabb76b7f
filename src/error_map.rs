//! Path-addressed aggregation of validation failures
//!
//! An [`ErrorMap`] maps a field path (`name`, `address.street`,
//! `items[2].price`) to the ordered list of messages reported for it.
//! Paths keep first-insertion order so reports follow schema order.

use crate::error::join_path;
use indexmap::IndexMap;

/// Key under which unexpected input keys and tags are reported
pub const EXTRA_KEY: &str = "_extra";

/// Key under which sequence and choice mismatches are reported
pub const SEQUENCE_KEY: &str = "_sequence";

/// Ordered mapping from field path to violation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: IndexMap<String, Vec<String>>,
}

impl ErrorMap {
    /// Create an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a path
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    /// Record several messages for one path; an empty list records nothing
    pub fn extend<I, S>(&mut self, path: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.add(path, message);
        }
    }

    /// Merge another map as-is
    pub fn merge(&mut self, other: ErrorMap) {
        for (path, messages) in other.entries {
            self.extend(&path, messages);
        }
    }

    /// Merge a nested map, re-keying every path under `prefix`
    pub fn merge_prefixed(&mut self, prefix: &str, other: ErrorMap) {
        for (path, messages) in other.entries {
            self.extend(&join_path(prefix, &path), messages);
        }
    }

    /// Messages recorded for a path
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(|m| m.as_slice())
    }

    /// Check whether a path has messages
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no failure was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate paths and their messages in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }

    /// Paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Total number of messages over all paths
    pub fn message_count(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    /// Consume into the underlying ordered map
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.entries
    }
}

impl<P, S> FromIterator<(P, S)> for ErrorMap
where
    P: Into<String>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, S)>>(iter: T) -> Self {
        let mut map = ErrorMap::new();
        for (path, message) in iter {
            map.add(path, message);
        }
        map
    }
}
