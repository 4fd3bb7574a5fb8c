//! Storage module for persisting crawl results
//!
//! This module handles everything that outlives a run, including:
//! - The flat JSON snapshot sink
//! - The SQLite store with first/last-seen history per search
//! - Read queries backing the statistics and export modes

mod json;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonSnapshotSink;
pub use sqlite::SqliteStorage;
pub use traits::{format_timestamp, PersistSummary, ResultSink, StorageError, StorageResult};

use crate::config::{OutputConfig, SinkKind};
use serde::Serialize;
use std::path::Path;

/// Opens the sink selected by the output configuration
///
/// # Arguments
///
/// * `config` - The output section of the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn ResultSink>)` - Sink ready to persist
/// * `Err(StorageError)` - The SQLite store could not be opened
pub fn open_sink(config: &OutputConfig) -> StorageResult<Box<dyn ResultSink>> {
    match config.sink {
        SinkKind::Json => Ok(Box::new(JsonSnapshotSink::new(&config.snapshot_path))),
        SinkKind::Sqlite => Ok(Box::new(open_storage(Path::new(&config.database_path))?)),
    }
}

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Row counts of the five tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub jobs: usize,
    pub categories: usize,
    pub searches: usize,
    pub job_categories: usize,
    pub search_jobs: usize,
}

/// A stored search-to-job association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRecord {
    pub search_term: String,
    pub job_id: String,
    pub first_seen: String,
    pub last_seen: String,
}

/// Job id and free-text body, the shape read by downstream text analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionRecord {
    pub job_id: String,
    pub description: String,
}

/// A label with a count, used for per-search and per-category totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}
