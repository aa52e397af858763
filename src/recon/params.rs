//! Parameter types configuring a reconstruction.
//!
//! Every group derives `Deserialize` with `#[serde(default)]`, so a JSON
//! file only needs to name the values it changes (see
//! [`crate::config::load_params`]).

use crate::refill::RefillOptions;
use crate::selection::ViewSelectionOptions;
use serde::Deserialize;

/// Reconstruction-wide parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReconParams {
    /// Index of the view whose depth map is computed.
    pub reference_view: usize,
    /// Record the supporting-view set of every committed pixel.
    pub keep_view_indices: bool,
    /// Record `dz_i`/`dz_j` of every committed pixel.
    pub keep_gradient_maps: bool,
    pub selection: ViewSelectionOptions,
    pub seeds: SeedOptions,
    pub refill: RefillOptions,
}

impl Default for ReconParams {
    fn default() -> Self {
        Self {
            reference_view: 0,
            keep_view_indices: false,
            keep_gradient_maps: false,
            selection: ViewSelectionOptions::default(),
            seeds: SeedOptions::default(),
            refill: RefillOptions::default(),
        }
    }
}

impl ReconParams {
    /// Same parameters aimed at another reference view.
    pub fn for_view(&self, reference_view: usize) -> Self {
        Self {
            reference_view,
            ..self.clone()
        }
    }
}

/// Filters applied when projecting sparse features into the reference view.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Features projecting closer than this to the image border are dropped.
    pub border_px: usize,
    /// Features closer to the camera centre than this are dropped.
    pub min_depth: f32,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            border_px: 0,
            min_depth: 1e-3,
        }
    }
}
