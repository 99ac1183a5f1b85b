//! # durakv
//!
//! A durable, single-node key-value store with:
//! - Write-Ahead Logging (WAL) for durability
//! - Crash recovery with partial write handling
//! - Multi-reader/single-writer concurrency model
//! - A self-delimiting binary log format (keys and values may contain
//!   spaces, newlines, or any other bytes)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                                │
//! │       get: shared lock · put/delete: exclusive lock          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │  1. append + fsync      │  2. apply
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │─ replay ▶│    Index    │
//!   │ (append-only│  on open │  (HashMap)  │
//!   │    file)    │          │             │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! Every mutation is persisted to the log before it touches the index; on
//! startup the full log is replayed, in order, to reconstruct the index.
//! The log is the single source of truth.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DuraError, Result};
pub use config::Config;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of durakv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
