//! JSON configuration loading.
//!
//! Two shapes are accepted: a bare [`ReconParams`] object, or a
//! [`ReconConfig`] that additionally lists the reference views to process and
//! where to write the reports. Missing keys fall back to defaults.

use crate::recon::ReconParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Batch run description.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub params: ReconParams,
    /// Reference views to reconstruct. Empty means every view of the scene.
    pub views: Vec<usize>,
    /// Optional destination for the JSON reports.
    #[serde(rename = "report_json")]
    pub report_json: Option<PathBuf>,
}

impl ReconConfig {
    /// Views to process for a scene with `num_views` views, with out-of-range
    /// indices dropped.
    pub fn resolve_views(&self, num_views: usize) -> Vec<usize> {
        if self.views.is_empty() {
            return (0..num_views).collect();
        }
        self.views.iter().copied().filter(|&v| v < num_views).collect()
    }
}

pub fn parse_params(json: &str) -> Result<ReconParams, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse params: {e}"))
}

pub fn load_params(path: &Path) -> Result<ReconParams, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read params {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse params {}: {e}", path.display()))
}

pub fn load_config(path: &Path) -> Result<ReconConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
