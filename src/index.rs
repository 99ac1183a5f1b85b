//! In-memory index
//!
//! A plain key-to-value map mirroring the WAL's last-write-wins effect.
//! The index is never persisted: it is always derivable by folding the log
//! through [`apply`], and that same routine is the only way to mutate it -
//! live writes and replay share one code path, and neither can touch the
//! log from here.
//!
//! Not internally synchronized; the [`Store`](crate::store::Store) wraps it
//! in its reader/writer lock.
//!
//! [`apply`]: Index::apply

use std::collections::HashMap;

use crate::wal::Operation;

/// In-memory key-value index
#[derive(Debug, Default)]
pub struct Index {
    map: HashMap<String, String>,
}

impl Index {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the current value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Apply a logged operation to the index.
    ///
    /// PUT overwrites unconditionally; DELETE removes the key if present.
    /// A DELETE for an absent key is a no-op rather than an error - during
    /// replay the log is authoritative history, not a set of assertions.
    pub fn apply(&mut self, operation: Operation) {
        match operation {
            Operation::Put { key, value } => {
                self.map.insert(key, value);
            }
            Operation::Delete { key } => {
                self.map.remove(&key);
            }
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
