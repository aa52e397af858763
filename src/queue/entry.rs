use crate::optimizer::PatchFit;
use crate::types::ViewIndexSet;

/// Candidate depth hypothesis for one pixel of the reference view.
///
/// Entries are never edited after construction. Several entries for the same
/// pixel may be queued at once; only the ones that beat the stored confidence
/// when popped get committed.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueEntry {
    pub x: usize,
    pub y: usize,
    pub confidence: f32,
    /// Distance along the viewing ray.
    pub depth: f32,
    /// Depth derivative along the image x axis.
    pub dz_i: f32,
    /// Depth derivative along the image y axis.
    pub dz_j: f32,
    pub views: ViewIndexSet,
}

impl QueueEntry {
    pub fn new(
        x: usize,
        y: usize,
        confidence: f32,
        depth: f32,
        dz_i: f32,
        dz_j: f32,
        views: ViewIndexSet,
    ) -> Self {
        Self {
            x,
            y,
            confidence,
            depth,
            dz_i,
            dz_j,
            views,
        }
    }

    /// Hypothesis for `(x, y)` taken over from a successful optimizer call.
    pub fn from_fit(x: usize, y: usize, fit: PatchFit) -> Self {
        Self::new(x, y, fit.confidence, fit.depth, fit.dz_i, fit.dz_j, fit.views)
    }
}
