//! Error types for Tally
//!
//! Deliberately small: malformed CSV lines and bad rows are skipped inside
//! the pipeline rather than surfaced as errors, so only batch-level and
//! collaborator failures appear here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upload contained no rows, or every row was rejected. Reported to
    /// the user, unlike individual row skips.
    #[error("No valid transactions found")]
    NoTransactions,

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
