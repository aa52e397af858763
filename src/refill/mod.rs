//! Low-resolution refill used when growth stalls below the target coverage.
//!
//! A [`RefillPolicy`] looks at the current reference-view state and proposes
//! coarse depth hints for pixels that are still uncovered. The orchestrator
//! turns hints into seeds by running the patch optimizer on them and pushing
//! the successes at reduced confidence, then resumes growth. A round that
//! yields no seeds ends the reconstruction.

mod options;
mod pyramid;

pub use options::RefillOptions;
pub use pyramid::DepthPyramid;

use crate::image::ImageF32;
use crate::view::{ReferenceView, UNSET_DEPTH};
use log::debug;

/// Coarse depth hypothesis for an uncovered pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefillHint {
    pub x: usize,
    pub y: usize,
    pub depth: f32,
    pub dz_i: f32,
    pub dz_j: f32,
}

/// Proposes coarse hypotheses for uncovered pixels.
pub trait RefillPolicy {
    /// `round` starts at 0 and increases with every refill of one
    /// reconstruction. Returning an empty list ends the reconstruction.
    fn propose(&mut self, view: &ReferenceView, round: usize) -> Vec<RefillHint>;
}

/// Depth map of the same view at a lower resolution, for example from a
/// previous reconstruction at half scale.
#[derive(Clone, Debug)]
pub struct LowResDepth {
    pub depth: ImageF32,
    /// Full-resolution pixels per low-resolution pixel along each axis (>= 1).
    pub factor: usize,
}

impl LowResDepth {
    fn sample(&self, x: usize, y: usize) -> Option<f32> {
        let factor = self.factor.max(1);
        let (lx, ly) = (x / factor, y / factor);
        if lx >= self.depth.w || ly >= self.depth.h {
            return None;
        }
        let d = self.depth.get(lx, ly);
        (d.is_finite() && d > UNSET_DEPTH).then_some(d)
    }
}

/// Default refill: low-resolution depth when supplied, otherwise the
/// finest level of a [`DepthPyramid`] over committed depths that covers the
/// pixel.
///
/// A pixel is proposed again only when its hint depth changed since the last
/// proposal, so repeated rounds do not replay optimizer calls that already
/// failed.
#[derive(Clone, Debug)]
pub struct CoarseDepthRefill {
    options: RefillOptions,
    low_res: Option<LowResDepth>,
    last_hint: Vec<f32>,
}

impl CoarseDepthRefill {
    pub fn new(options: RefillOptions) -> Self {
        Self {
            options,
            low_res: None,
            last_hint: Vec::new(),
        }
    }

    pub fn with_low_res(mut self, low_res: LowResDepth) -> Self {
        self.low_res = Some(low_res);
        self
    }

    fn hint_for(&self, pyramid: &DepthPyramid, x: usize, y: usize) -> Option<RefillHint> {
        if let Some(depth) = self.low_res.as_ref().and_then(|lr| lr.sample(x, y)) {
            return Some(RefillHint {
                x,
                y,
                depth,
                dz_i: 0.0,
                dz_j: 0.0,
            });
        }
        let (level, depth) = pyramid.coarse_depth(x, y)?;
        let (dz_i, dz_j) = pyramid.gradient(level, x, y);
        Some(RefillHint {
            x,
            y,
            depth,
            dz_i,
            dz_j,
        })
    }

    fn is_repeat(&self, idx: usize, depth: f32) -> bool {
        let last = self.last_hint[idx];
        last.is_finite() && (last - depth).abs() <= 1e-6 * depth.abs().max(1.0)
    }
}

impl Default for CoarseDepthRefill {
    fn default() -> Self {
        Self::new(RefillOptions::default())
    }
}

impl RefillPolicy for CoarseDepthRefill {
    fn propose(&mut self, view: &ReferenceView, round: usize) -> Vec<RefillHint> {
        let (w, h) = (view.width(), view.height());
        if self.last_hint.len() != w * h {
            self.last_hint = vec![f32::NAN; w * h];
        }
        let pyramid = DepthPyramid::build(view, self.options.pyramid_levels);
        let step = self.options.sample_step.max(1);

        let mut hints = Vec::new();
        for by in (0..h).step_by(step) {
            for bx in (0..w).step_by(step) {
                let block = (by..(by + step).min(h))
                    .flat_map(|y| (bx..(bx + step).min(w)).map(move |x| (x, y)));
                for (x, y) in block {
                    if view.is_set(x, y) {
                        continue;
                    }
                    let Some(hint) = self.hint_for(&pyramid, x, y) else {
                        continue;
                    };
                    let idx = y * w + x;
                    if self.is_repeat(idx, hint.depth) {
                        continue;
                    }
                    self.last_hint[idx] = hint.depth;
                    hints.push(hint);
                    break;
                }
            }
        }
        debug!(
            "CoarseDepthRefill round={} coverage={:.3} hints={}",
            round,
            view.coverage(),
            hints.len()
        );
        hints
    }
}
