//! Audit log writer used by the presentation layer.
//!
//! Each generated report may be persisted as a timestamped JSON record. The
//! record itself is assembled by the core pipeline; this module only owns the
//! filesystem side: directory creation, naming, and an atomic-ish write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `record` under `dir` as `<YYYYMMDD_HHMMSS>.json`.
///
/// Returns the path of the written file. The write goes through a temp file
/// plus rename so a crash never leaves a half-written record behind.
pub fn save_audit_record<T: Serialize>(
    dir: &Path,
    recorded_at: &DateTime<Utc>,
    record: &T,
) -> Result<PathBuf, String> {
    use std::io::ErrorKind;

    fs::create_dir_all(dir).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => "Permission denied creating audit log directory".to_string(),
        _ => "Failed to prepare audit log directory".to_string(),
    })?;

    let path = dir.join(format!("{}.json", recorded_at.format("%Y%m%d_%H%M%S")));
    let pretty = serde_json::to_string_pretty(record)
        .map_err(|e| format!("Failed to serialize audit record: {e}"))?;

    let tmp = path.with_extension("json.tmp");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => "Permission denied creating temp file".to_string(),
            _ => "Failed to create temp file".to_string(),
        })?;
        f.write_all(pretty.as_bytes())
            .map_err(|_| "Failed to write temp file".to_string())?;
        f.flush()
            .map_err(|_| "Failed to flush temp file".to_string())?;
    }
    fs::rename(&tmp, &path).map_err(|_| "Failed to move temp file into place".to_string())?;
    Ok(path)
}
