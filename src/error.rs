//! Error types for the ledger host.
//!
//! Entry rejections are not errors; see [`crate::validator::Rejection`].

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while reading input or writing reports.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open, read or write a file or stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
