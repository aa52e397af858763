//! Validity-aware 2× pyramid over committed depths.
//!
//! Level 0 is the reference view's depth map with unset pixels stored as
//! [`UNSET_DEPTH`]. Each coarser level halves the size (rounding up) and
//! stores the mean of the valid children in its 2×2 block, so holes shrink
//! as the pyramid gets coarser.
use crate::image::ImageF32;
use crate::view::{ReferenceView, UNSET_DEPTH};

#[derive(Clone, Debug, Default)]
pub struct DepthPyramid {
    pub levels: Vec<ImageF32>,
}

impl DepthPyramid {
    pub fn build(view: &ReferenceView, levels: usize) -> Self {
        let levels = levels.max(1);
        let mut l0 = ImageF32::filled(view.width(), view.height(), UNSET_DEPTH);
        for y in 0..view.height() {
            for x in 0..view.width() {
                if view.is_set(x, y) {
                    l0.set(x, y, view.depth_at(x, y));
                }
            }
        }
        Self::build_from(l0, levels)
    }

    pub fn build_from(level0: ImageF32, levels: usize) -> Self {
        let mut out = Vec::with_capacity(levels.max(1));
        let mut prev = level0;
        for _ in 1..levels {
            if prev.w <= 1 && prev.h <= 1 {
                break;
            }
            let next = downsample_valid(&prev);
            out.push(prev);
            prev = next;
        }
        out.push(prev);
        Self { levels: out }
    }

    /// Finest level above full resolution holding a depth for the block that
    /// contains `(x, y)`, as `(level, depth)`.
    pub fn coarse_depth(&self, x: usize, y: usize) -> Option<(usize, f32)> {
        self.levels.iter().enumerate().skip(1).find_map(|(lvl, img)| {
            let (cx, cy) = (x >> lvl, y >> lvl);
            let d = img.get(cx.min(img.w - 1), cy.min(img.h - 1));
            is_valid(d).then_some((lvl, d))
        })
    }

    /// Full-resolution depth gradient at `(x, y)` estimated by central
    /// differences on `level`. Missing neighbours give a zero component.
    pub fn gradient(&self, level: usize, x: usize, y: usize) -> (f32, f32) {
        let Some(img) = self.levels.get(level).filter(|img| !img.is_empty()) else {
            return (0.0, 0.0);
        };
        let cx = (x >> level).min(img.w - 1) as isize;
        let cy = (y >> level).min(img.h - 1) as isize;
        let scale = (1usize << level) as f32;
        let diff = |ax: isize, ay: isize, bx: isize, by: isize| -> f32 {
            if !img.contains(ax, ay) || !img.contains(bx, by) {
                return 0.0;
            }
            let a = img.get(ax as usize, ay as usize);
            let b = img.get(bx as usize, by as usize);
            if is_valid(a) && is_valid(b) {
                (b - a) / (2.0 * scale)
            } else {
                0.0
            }
        };
        (diff(cx - 1, cy, cx + 1, cy), diff(cx, cy - 1, cx, cy + 1))
    }
}

#[inline]
fn is_valid(depth: f32) -> bool {
    depth.is_finite() && depth > UNSET_DEPTH
}

fn downsample_valid(prev: &ImageF32) -> ImageF32 {
    let (nw, nh) = (prev.w.div_ceil(2), prev.h.div_ceil(2));
    let mut down = ImageF32::filled(nw, nh, UNSET_DEPTH);
    for y in 0..nh {
        for x in 0..nw {
            let mut sum = 0.0f32;
            let mut count = 0u32;
            for sy in (y * 2)..(y * 2 + 2).min(prev.h) {
                let row = prev.row(sy);
                for &d in &row[(x * 2)..(x * 2 + 2).min(prev.w)] {
                    if is_valid(d) {
                        sum += d;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                down.set(x, y, sum / count as f32);
            }
        }
    }
    down
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level0(w: usize, h: usize, valid: &[(usize, usize, f32)]) -> ImageF32 {
        let mut img = ImageF32::filled(w, h, UNSET_DEPTH);
        for &(x, y, d) in valid {
            img.set(x, y, d);
        }
        img
    }

    #[test]
    fn averages_only_valid_children() {
        let pyr = DepthPyramid::build_from(level0(4, 4, &[(0, 0, 2.0), (1, 1, 4.0)]), 3);
        assert_eq!(pyr.levels.len(), 3);
        assert_eq!((pyr.levels[1].w, pyr.levels[1].h), (2, 2));
        assert_eq!(pyr.levels[1].get(0, 0), 3.0);
        assert_eq!(pyr.levels[1].get(1, 1), UNSET_DEPTH);
        assert_eq!(pyr.levels[2].get(0, 0), 3.0);
    }

    #[test]
    fn odd_sizes_round_up() {
        let pyr = DepthPyramid::build_from(level0(5, 3, &[(4, 2, 7.0)]), 2);
        assert_eq!((pyr.levels[1].w, pyr.levels[1].h), (3, 2));
        assert_eq!(pyr.levels[1].get(2, 1), 7.0);
    }

    #[test]
    fn coarse_depth_prefers_finest_level() {
        let pyr = DepthPyramid::build_from(level0(8, 8, &[(0, 0, 2.0), (7, 7, 6.0)]), 4);
        assert_eq!(pyr.coarse_depth(1, 1), Some((1, 2.0)));
        assert_eq!(pyr.coarse_depth(3, 3), Some((2, 2.0)));
        assert_eq!(pyr.coarse_depth(4, 1), Some((3, 4.0)));
        let empty = DepthPyramid::build_from(level0(8, 8, &[]), 4);
        assert_eq!(empty.coarse_depth(3, 3), None);
    }

    #[test]
    fn gradient_uses_central_differences_in_full_res_units() {
        let mut img = ImageF32::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                img.set(x, y, 10.0 + x as f32 - 0.5 * y as f32);
            }
        }
        let pyr = DepthPyramid::build_from(img, 2);
        let (gi, gj) = pyr.gradient(0, 1, 1);
        assert!((gi - 1.0).abs() < 1e-6 && (gj + 0.5).abs() < 1e-6);
        // Level 1 has only two samples per axis, so (0, 0) lacks a left neighbour.
        assert_eq!(pyr.gradient(1, 0, 0), (0.0, 0.0));
    }
}
