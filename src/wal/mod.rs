//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append log entries before any index mutation
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery and replay
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Data is the bincode encoding of [`Operation`], so keys and values are
//! length-prefixed and may contain any bytes. The reader never has to guess
//! at field boundaries.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{Operation, WalEntry, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use writer::WalWriter;
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
