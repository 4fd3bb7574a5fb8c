//! Flat JSON snapshot sink

use crate::model::CategoryGroup;
use crate::storage::traits::{PersistSummary, ResultSink, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Overwrites one JSON document with the full tree on every persist
///
/// No deduplication and no history: the file always holds exactly the last
/// run's tree.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSink {
    path: PathBuf,
}

impl JsonSnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a snapshot written by this sink
    pub fn load(path: &Path) -> StorageResult<Vec<CategoryGroup>> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes to a sibling temp file, then renames it over the target
    fn write_atomically(&self, bytes: &[u8]) -> StorageResult<()> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(self.path.display().to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ResultSink for JsonSnapshotSink {
    fn persist(
        &mut self,
        categories: &[CategoryGroup],
        _seen_at: DateTime<Utc>,
    ) -> StorageResult<PersistSummary> {
        let bytes = serde_json::to_vec_pretty(categories)?;
        self.write_atomically(&bytes)?;

        Ok(PersistSummary {
            categories: categories.len(),
            searches: categories.iter().map(|c| c.searches.len()).sum(),
            postings: categories.iter().map(CategoryGroup::job_count).sum(),
            ..PersistSummary::default()
        })
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path().display())
    }
}
