//! Description export for downstream text analysis
//!
//! The export is a JSON array of `{"job_id", "description"}` objects, the
//! input the batch annotation tool reads.

use crate::storage::{SqliteStorage, StorageResult};
use std::fs;
use std::path::Path;

/// Writes every stored description to `path`, returning how many were written
pub fn export_descriptions(storage: &SqliteStorage, path: &Path) -> StorageResult<usize> {
    let records = storage.load_descriptions()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(&records)?)?;

    tracing::info!(
        "Exported {} descriptions to {}",
        records.len(),
        path.display()
    );
    Ok(records.len())
}
