//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their binary
//! encoding. The frame is self-delimiting, so keys and values may contain
//! spaces, newlines, or any other bytes without ambiguity.

use serde::{Deserialize, Serialize};

use crate::error::{DuraError, Result};

/// Size of the fixed entry header: LSN (8) + CRC (4) + payload length (4)
pub const HEADER_SIZE: usize = 16;

/// Maximum payload size (16 MB). Larger records are rejected at append time
/// and treated as corruption at read time.
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: String, value: String },

    /// Delete a key
    Delete { key: String },
}

impl Operation {
    /// The key this operation targets
    pub fn key(&self) -> &str {
        match self {
            Operation::Put { key, .. } => key,
            Operation::Delete { key } => key,
        }
    }
}

impl WalEntry {
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self { lsn, operation }
    }

    /// Serialize the complete entry to bytes
    ///
    /// ```text
    /// ┌─────────┬─────────┬─────────┬──────────────────┐
    /// │ LSN (8) │ CRC (4) │ Len (4) │ Data (bincode)   │
    /// └─────────┴─────────┴─────────┴──────────────────┘
    /// ```
    ///
    /// The CRC covers the LSN bytes plus the data, so a damaged header is
    /// detected as well as damaged data.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&self.operation)
            .map_err(|e| DuraError::Serialization(e.to_string()))?;

        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(DuraError::Serialization(format!(
                "record payload of {} bytes exceeds the {} byte limit",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let lsn_bytes = self.lsn.to_le_bytes();
        let crc = checksum(&lsn_bytes, &payload);

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(&lsn_bytes);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&payload);

        Ok(buf)
    }

    /// Deserialize an entry from a buffer, verifying the checksum
    pub fn deserialize(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(DuraError::Corruption(format!(
                "entry header truncated: {} of {} bytes",
                buf.len(),
                HEADER_SIZE
            )));
        }

        let lsn = u64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ]);
        let crc = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let len = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);

        if len > MAX_PAYLOAD_SIZE {
            return Err(DuraError::Corruption(format!(
                "record length {} exceeds the {} byte limit",
                len, MAX_PAYLOAD_SIZE
            )));
        }

        let end = HEADER_SIZE + len as usize;
        if buf.len() < end {
            return Err(DuraError::Corruption(format!(
                "entry data truncated: {} of {} bytes",
                buf.len() - HEADER_SIZE,
                len
            )));
        }

        decode_payload(lsn, crc, &buf[HEADER_SIZE..end])
    }

    /// Total size in bytes this entry occupies on disk
    pub fn serialized_size(&self) -> Result<usize> {
        let payload_len = bincode::serialized_size(&self.operation)
            .map_err(|e| DuraError::Serialization(e.to_string()))?;
        Ok(HEADER_SIZE + payload_len as usize)
    }

    /// Checksum over the entry as it would appear on disk
    pub fn compute_crc(&self) -> Result<u32> {
        let payload = bincode::serialize(&self.operation)
            .map_err(|e| DuraError::Serialization(e.to_string()))?;
        Ok(checksum(&self.lsn.to_le_bytes(), &payload))
    }
}

/// Verify the checksum of a raw payload and decode it into an entry.
///
/// Shared by the buffer-based `deserialize` above and the streaming
/// `WalReader` path, so both enforce the same corruption policy.
pub(crate) fn decode_payload(lsn: u64, expected_crc: u32, payload: &[u8]) -> Result<WalEntry> {
    let computed = checksum(&lsn.to_le_bytes(), payload);
    if computed != expected_crc {
        return Err(DuraError::Corruption(format!(
            "checksum mismatch for lsn {}: computed {:08x}, stored {:08x}",
            lsn, computed, expected_crc
        )));
    }

    let operation: Operation = bincode::deserialize(payload).map_err(|e| {
        DuraError::Corruption(format!("undecodable record data for lsn {}: {}", lsn, e))
    })?;

    Ok(WalEntry::new(lsn, operation))
}

fn checksum(lsn_bytes: &[u8; 8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(lsn_bytes);
    hasher.update(payload);
    hasher.finalize()
}
