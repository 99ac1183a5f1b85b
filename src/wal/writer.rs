//! WAL Writer
//!
//! Handles appending entries to the WAL file. Every append is flushed to
//! stable storage before it returns: a mutation acknowledged by the store
//! must survive a crash, so there is no buffered or batched mode.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::{Operation, WalEntry};

/// Writes entries to the WAL file
///
/// Holds the log's file handle for the lifetime of the store; the handle is
/// released when the writer is dropped.
#[derive(Debug)]
pub struct WalWriter {
    path: PathBuf,
    file: File,
    next_lsn: u64,
}

impl WalWriter {
    /// Open or create a WAL file in append mode.
    ///
    /// `next_lsn` is the sequence number the first append will receive. The
    /// store passes `last_lsn + 1` as reported by recovery, so appends after
    /// a reopen continue the existing sequence; a fresh log starts at 1.
    pub fn open(path: impl AsRef<Path>, next_lsn: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file,
            next_lsn,
        })
    }

    /// Append an operation to the WAL and flush it to stable storage.
    ///
    /// Returns the LSN assigned to the record. The LSN counter advances only
    /// after a successful flush; on any error nothing is acknowledged and the
    /// caller must not apply the mutation.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let entry = WalEntry::new(lsn, operation);
        let bytes = entry.serialize()?;

        self.file.write_all(&bytes)?;
        self.file.sync_all()?;

        self.next_lsn = lsn + 1;
        tracing::trace!(lsn, bytes = bytes.len(), "appended wal record");

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// The LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Path of the WAL file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
