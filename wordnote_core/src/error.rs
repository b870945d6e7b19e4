//! Error types for the storage, import and configuration edges.
//!
//! The quiz core itself never fails: malformed records are dropped and
//! out-of-range navigation is clamped. Only I/O surfaces return these.

use thiserror::Error;

/// Result type alias using WordNoteError.
pub type Result<T> = std::result::Result<T, WordNoteError>;

#[derive(Debug, Error)]
pub enum WordNoteError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid import: {0}")]
    InvalidImport(String),

    #[error("missing {0} column in file header")]
    MissingColumns(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
