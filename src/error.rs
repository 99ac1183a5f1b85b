//! Error types for durakv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DuraError
pub type Result<T> = std::result::Result<T, DuraError>;

/// Unified error type for durakv operations
#[derive(Debug, Error)]
pub enum DuraError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    Corruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Store is closed")]
    StoreClosed,
}
