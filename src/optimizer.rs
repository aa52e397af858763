//! Seam to the photometric patch optimizer.
//!
//! Plane fitting and similarity scoring live outside this crate. The
//! propagation engine only needs to hand a pixel, a depth guess and a set of
//! candidate views to something that either returns a refined hypothesis or
//! declines. Declining is a normal outcome and is never retried with the same
//! input.

use crate::types::ViewIndexSet;

/// Input for one optimizer call.
#[derive(Clone, Copy, Debug)]
pub struct PatchRequest<'a> {
    pub x: usize,
    pub y: usize,
    /// Initial depth guess along the viewing ray.
    pub depth: f32,
    /// Gradient hints carried over from the hypothesis the guess came from.
    /// Zero for seeds.
    pub dz_i: f32,
    pub dz_j: f32,
    /// Views currently backing the hypothesis.
    pub views: &'a ViewIndexSet,
    /// Global neighbour set of the reference view, available to optimizers
    /// that pick their own views per pixel.
    pub neighbors: &'a ViewIndexSet,
}

/// Refined hypothesis returned by a successful optimizer call.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchFit {
    pub depth: f32,
    pub confidence: f32,
    pub dz_i: f32,
    pub dz_j: f32,
    /// Views the optimizer actually used; they back the follow-up hypothesis.
    pub views: ViewIndexSet,
}

impl PatchFit {
    /// A fit is usable when its depth is a positive finite distance and its
    /// confidence and gradients are finite.
    pub fn is_usable(&self) -> bool {
        self.depth.is_finite()
            && self.depth > 0.0
            && self.confidence.is_finite()
            && self.dz_i.is_finite()
            && self.dz_j.is_finite()
    }
}

/// Fits a local depth hypothesis around a pixel of the reference view.
///
/// Implementations may keep scratch buffers in `self`; every reconstruction
/// owns its optimizer, so no synchronisation is needed.
pub trait PatchOptimizer {
    /// Returns `None` when no acceptable hypothesis exists near the guess.
    fn optimize(&mut self, request: &PatchRequest<'_>) -> Option<PatchFit>;
}

impl<F> PatchOptimizer for F
where
    F: FnMut(&PatchRequest<'_>) -> Option<PatchFit>,
{
    #[inline]
    fn optimize(&mut self, request: &PatchRequest<'_>) -> Option<PatchFit> {
        self(request)
    }
}
