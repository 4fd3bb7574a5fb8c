//! Storage traits and error types
//!
//! This module defines the trait interface for result sinks and
//! associated error types.

use crate::model::CategoryGroup;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot path: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What one persist call wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Categories written, empty ones included
    pub categories: usize,

    /// Search groups written
    pub searches: usize,

    /// Postings handed to the sink, duplicates across searches included
    pub postings: usize,

    /// Job rows that did not exist before this call (always 0 for snapshots)
    pub new_jobs: usize,

    /// Search associations that did not exist before this call
    pub new_associations: usize,
}

/// Destination for the result tree of one run
///
/// `seen_at` is the single timestamp of the run. Every association written
/// by the call carries it.
pub trait ResultSink: Send {
    /// Writes the whole tree; either all of it lands or none of it does
    fn persist(
        &mut self,
        categories: &[CategoryGroup],
        seen_at: DateTime<Utc>,
    ) -> StorageResult<PersistSummary>;

    /// Short name used in logs
    fn describe(&self) -> String;
}

/// RFC 3339 with second precision in UTC, the stored timestamp format
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
