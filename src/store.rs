//! Store Module
//!
//! The durable key-value store that coordinates the WAL and the index.
//!
//! ## Responsibilities
//! - Replay the WAL into the index on open
//! - Log every mutation durably before applying it
//! - Handle concurrent read/write access
//! - Own the log's file handle for the store's lifetime

use std::path::Path;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{DuraError, Result};
use crate::index::Index;
use crate::wal::{Operation, WalRecovery, WalWriter};

/// The main key-value store
///
/// ## Concurrency Model
///
/// One reader/writer lock guards everything the store owns:
///
/// - **Reads** (`get`): shared lock, many concurrent readers
/// - **Writes** (`put`/`delete`/`close`): exclusive lock
///
/// The WAL writer lives inside the same lock, so appends are serialized by
/// the exclusive lock itself and no separate log lock exists. An append is
/// synchronous - it returns only after the record is flushed - so "log
/// before index" is an ordering on stable storage, not just program order.
///
/// `None` inside the lock means the store is closed and its file handle has
/// been released.
#[derive(Debug)]
pub struct Store {
    config: Config,
    inner: RwLock<Option<StoreInner>>,
}

#[derive(Debug)]
struct StoreInner {
    wal: WalWriter,
    index: Index,
}

impl Store {
    /// Open or create a store with the given config.
    ///
    /// On startup:
    /// 1. Recover the WAL (a missing file recovers as empty)
    /// 2. Fold the recovered entries into a fresh index
    /// 3. Open the log for append, continuing the LSN sequence
    ///
    /// Fails with `Io` if the log cannot be opened or created, and with
    /// `Corruption` if replay hits damage other than a truncated tail. On
    /// any failure every partially-acquired resource is dropped; there is
    /// no half-open store.
    pub fn open(config: Config) -> Result<Self> {
        let (entries, recovery) = WalRecovery::recover(&config.log_path)?;

        if recovery.was_truncated {
            tracing::warn!(
                path = %config.log_path.display(),
                "discarded a partial record at the wal tail"
            );
        }
        if recovery.entries_recovered > 0 {
            tracing::info!(
                entries = recovery.entries_recovered,
                last_lsn = recovery.last_lsn,
                "replayed write-ahead log"
            );
        }

        let mut index = Index::new();
        for entry in entries {
            index.apply(entry.operation);
        }

        let wal = WalWriter::open(&config.log_path, recovery.last_lsn + 1)?;

        Ok(Self {
            config,
            inner: RwLock::new(Some(StoreInner { wal, index })),
        })
    }

    /// Open with a log path (convenience method)
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().log_path(path).build())
    }

    /// Put a key-value pair.
    ///
    /// The record is durably appended first; the index is updated only if
    /// the append succeeded, so a failed write leaves the store exactly as
    /// it was.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.inner.write();
        let inner = guard.as_mut().ok_or(DuraError::StoreClosed)?;

        let operation = Operation::Put {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        inner.wal.append(operation.clone())?;
        inner.index.apply(operation);

        Ok(())
    }

    /// Get the current value for a key.
    ///
    /// Never touches the log. Returns `KeyNotFound` for absent keys.
    pub fn get(&self, key: &str) -> Result<String> {
        let guard = self.inner.read();
        let inner = guard.as_ref().ok_or(DuraError::StoreClosed)?;

        inner
            .index
            .get(key)
            .map(str::to_owned)
            .ok_or(DuraError::KeyNotFound)
    }

    /// Delete a key.
    ///
    /// Returns `KeyNotFound` without writing anything if the key is absent:
    /// a no-op delete must not pollute the log. Otherwise the tombstone is
    /// appended durably before the key is removed from the index, with the
    /// same atomicity contract as `put`.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut guard = self.inner.write();
        let inner = guard.as_mut().ok_or(DuraError::StoreClosed)?;

        if !inner.index.contains_key(key) {
            return Err(DuraError::KeyNotFound);
        }

        let operation = Operation::Delete {
            key: key.to_owned(),
        };
        inner.wal.append(operation.clone())?;
        inner.index.apply(operation);

        Ok(())
    }

    /// Close the store, releasing the log's file handle.
    ///
    /// Any operation after close fails with `StoreClosed`, including a
    /// second close.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.write();
        let mut inner = guard.take().ok_or(DuraError::StoreClosed)?;

        inner.wal.sync()?;
        tracing::debug!(path = %self.config.log_path.display(), "store closed");

        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys (0 once the store is closed)
    pub fn len(&self) -> usize {
        self.inner.read().as_ref().map_or(0, |i| i.index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the write-ahead log file
    pub fn log_path(&self) -> &Path {
        &self.config.log_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
