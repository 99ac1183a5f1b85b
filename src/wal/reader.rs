//! WAL Reader
//!
//! Handles reading entries back from the WAL file in append order.
//!
//! Two kinds of bad data are distinguished. A record cut short by the end of
//! the file is the signature of a crash mid-append: the reader stops there,
//! keeps everything before it, and records that the tail was truncated. A
//! record that is fully present but fails its checksum (or carries an
//! impossible length or undecodable data) cannot be explained by a torn
//! write and is reported as corruption.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{DuraError, Result};
use super::entry::{decode_payload, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use super::WalEntry;

/// Reads entries from the WAL file
#[derive(Debug)]
pub struct WalReader {
    reader: BufReader<File>,
    position: u64,
    truncated: bool,
}

impl WalReader {
    /// Open a WAL file for reading from the beginning
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            truncated: false,
        })
    }

    /// Read the next entry from the WAL.
    ///
    /// Returns `Ok(None)` at the end of the well-formed prefix: either clean
    /// EOF, or a partial record at the tail (check [`was_truncated`]).
    ///
    /// [`was_truncated`]: WalReader::was_truncated
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        if self.truncated {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_SIZE {
            self.truncated = true;
            return Ok(None);
        }

        let lsn = u64::from_le_bytes([
            header[0], header[1], header[2], header[3], header[4], header[5], header[6],
            header[7],
        ]);
        let crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        let len = u32::from_le_bytes([header[12], header[13], header[14], header[15]]);

        if len > MAX_PAYLOAD_SIZE {
            return Err(DuraError::Corruption(format!(
                "record length {} at offset {} exceeds the {} byte limit",
                len, self.position, MAX_PAYLOAD_SIZE
            )));
        }

        let mut payload = vec![0u8; len as usize];
        if read_full(&mut self.reader, &mut payload)? < payload.len() {
            self.truncated = true;
            return Ok(None);
        }

        let entry = decode_payload(lsn, crc, &payload)?;
        self.position += (HEADER_SIZE + len as usize) as u64;

        Ok(Some(entry))
    }

    /// Whether reading stopped at a partial record instead of clean EOF
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Byte offset just past the last well-formed entry
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Consume the reader into a one-shot iterator over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// One-shot iterator over WAL entries, in append order.
///
/// Fuses after the first error or end of input.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl WalIterator {
    /// Whether iteration stopped at a partial record instead of clean EOF
    pub fn was_truncated(&self) -> bool {
        self.reader.was_truncated()
    }
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}
