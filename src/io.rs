//! Persisting reconstruction diagnostics.
//!
//! Depth maps stay in memory; only the serialisable reports are written.
//! Batch drivers either collect every report into one JSON array or write
//! one `view_<index>.json` per reference view.
use crate::diagnostics::ReconstructionReport;
use crate::recon::ViewReconstruction;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Pretty-prints `value` to `path`, creating missing parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create directory {}: {e}", dir.display()))?;
    }
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to encode report {}: {e}", path.display()))?;
    fs::write(path, text).map_err(|e| format!("Failed to write report {}: {e}", path.display()))
}

/// Writes the reports of a batch as one JSON array, in batch order.
pub fn write_reports(path: &Path, results: &[ViewReconstruction]) -> Result<(), String> {
    let reports: Vec<&ReconstructionReport> = results.iter().map(|r| &r.report).collect();
    write_json_file(path, &reports)
}

/// Writes one file per reference view into `dir` and returns the paths.
pub fn write_report_per_view(
    dir: &Path,
    results: &[ViewReconstruction],
) -> Result<Vec<PathBuf>, String> {
    results
        .iter()
        .map(|r| {
            let path = dir.join(format!("view_{}.json", r.report.reference_view));
            write_json_file(&path, &r.report).map(|()| path)
        })
        .collect()
}
