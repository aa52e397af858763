//! Per-pixel output state of one reference view.
//!
//! The reference view owns the depth and confidence maps produced by a
//! reconstruction. [`ReferenceView::try_commit`] is the only way to write
//! them, and it enforces the monotonic-improvement rule: a pixel's stored
//! confidence can only ever go up during a run.
//!
//! Optional side tables (per-pixel supporting views, per-pixel depth
//! gradients) are toggled once at construction. They change what is
//! recorded, never how commits are decided.

use crate::image::ImageF32;
use crate::queue::QueueEntry;
use crate::types::ViewIndexSet;

/// Depth stored for pixels without an estimate.
pub const UNSET_DEPTH: f32 = 0.0;
/// Confidence stored for pixels without an estimate. Any real confidence
/// compares strictly greater.
pub const UNSET_CONFIDENCE: f32 = f32::NEG_INFINITY;

#[derive(Clone, Debug)]
pub struct ReferenceView {
    index: usize,
    depth: ImageF32,
    confidence: ImageF32,
    gradients: Option<[ImageF32; 2]>,
    view_indices: Option<Vec<ViewIndexSet>>,
    filled: usize,
}

impl ReferenceView {
    /// Fresh, fully unset state for view `index` of size `width × height`.
    pub fn new(
        index: usize,
        width: usize,
        height: usize,
        keep_view_indices: bool,
        keep_gradient_maps: bool,
    ) -> Self {
        let n = width * height;
        Self {
            index,
            depth: ImageF32::filled(width, height, UNSET_DEPTH),
            confidence: ImageF32::filled(width, height, UNSET_CONFIDENCE),
            gradients: keep_gradient_maps
                .then(|| [ImageF32::new(width, height), ImageF32::new(width, height)]),
            view_indices: keep_view_indices.then(|| vec![ViewIndexSet::new(); n]),
            filled: 0,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.depth.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.depth.h
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.depth.len()
    }

    #[inline]
    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth.get(x, y)
    }

    #[inline]
    pub fn confidence_at(&self, x: usize, y: usize) -> f32 {
        self.confidence.get(x, y)
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.confidence.get(x, y) > UNSET_CONFIDENCE
    }

    /// Supporting views of the last commit at `(x, y)`, when the side table
    /// is enabled.
    pub fn views_at(&self, x: usize, y: usize) -> Option<&ViewIndexSet> {
        let idx = self.depth.idx(x, y);
        self.view_indices.as_ref().map(|table| &table[idx])
    }

    /// `(dz_i, dz_j)` of the last commit at `(x, y)`, when gradient maps are kept.
    pub fn gradient_at(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        self.gradients
            .as_ref()
            .map(|[gi, gj]| (gi.get(x, y), gj.get(x, y)))
    }

    pub fn depth_map(&self) -> &ImageF32 {
        &self.depth
    }

    pub fn confidence_map(&self) -> &ImageF32 {
        &self.confidence
    }

    pub fn gradient_maps(&self) -> Option<&[ImageF32; 2]> {
        self.gradients.as_ref()
    }

    /// Number of pixels holding an estimate.
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Fraction of pixels holding an estimate, in `[0, 1]`.
    pub fn coverage(&self) -> f32 {
        if self.pixel_count() == 0 {
            return 0.0;
        }
        self.filled as f32 / self.pixel_count() as f32
    }

    /// Writes `entry` into the maps if its confidence strictly exceeds the
    /// value stored at its pixel. Returns whether anything changed.
    pub fn try_commit(&mut self, entry: &QueueEntry) -> bool {
        let idx = self.depth.idx(entry.x, entry.y);
        let stored = self.confidence.data[idx];
        // NaN never improves anything.
        let improves = entry.confidence > stored;
        if !improves {
            return false;
        }
        if stored == UNSET_CONFIDENCE {
            self.filled += 1;
        }
        self.confidence.data[idx] = entry.confidence;
        self.depth.data[idx] = entry.depth;
        if let Some([gi, gj]) = self.gradients.as_mut() {
            gi.data[idx] = entry.dz_i;
            gj.data[idx] = entry.dz_j;
        }
        if let Some(table) = self.view_indices.as_mut() {
            table[idx].clone_from(&entry.views);
        }
        true
    }
}
