//! File sink for merged records.

use crate::constants::EXPORT_FILENAME;
use crate::merge::MergedRecord;
use crate::{RecordError, RecordResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Renders `merged` as pretty-printed JSON.
pub fn to_pretty_json(merged: &MergedRecord) -> RecordResult<String> {
    serde_json::to_string_pretty(merged).map_err(RecordError::Serialization)
}

/// Writes `merged` to `dir/merged_patient.json`, creating `dir` if needed.
///
/// An existing export in `dir` is overwritten. Returns the path written.
pub fn write_export(dir: &Path, merged: &MergedRecord) -> RecordResult<PathBuf> {
    fs::create_dir_all(dir).map_err(RecordError::ExportDirCreation)?;

    let json = to_pretty_json(merged)?;
    let filename = dir.join(EXPORT_FILENAME);
    fs::write(&filename, json).map_err(RecordError::FileWrite)?;

    tracing::info!(
        "exported merged record {} to {}",
        merged.user_id,
        filename.display()
    );
    Ok(filename)
}
