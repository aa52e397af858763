use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique, unordered set of view indices backing a depth hypothesis.
///
/// A `BTreeSet` keeps iteration deterministic, which makes logs and reports
/// reproducible across runs.
pub type ViewIndexSet = BTreeSet<usize>;

/// Rigid world→camera transform: `x_cam = r * x_world + t`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub r: Matrix3<f32>,
    pub t: Vector3<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            r: Matrix3::identity(),
            t: Vector3::zeros(),
        }
    }
}

impl Pose {
    pub fn new(r: Matrix3<f32>, t: Vector3<f32>) -> Self {
        Self { r, t }
    }

    #[inline]
    pub fn world_to_camera(&self, p: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.r * p.coords + self.t)
    }

    #[inline]
    pub fn camera_to_world(&self, p: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.r.transpose() * (p.coords - self.t))
    }

    /// Camera centre in world coordinates.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        Point3::from(-(self.r.transpose() * self.t))
    }
}

/// One of the four grid neighbours visited during propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridStep {
    Right,
    Left,
    Down,
    Up,
}

impl GridStep {
    pub const ALL: [GridStep; 4] = [GridStep::Right, GridStep::Left, GridStep::Down, GridStep::Up];

    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            GridStep::Right => (1, 0),
            GridStep::Left => (-1, 0),
            GridStep::Down => (0, 1),
            GridStep::Up => (0, -1),
        }
    }

    /// Depth predicted for the neighbour in this direction from the committed
    /// depth and its image-space gradients.
    #[inline]
    pub fn predict_depth(self, depth: f32, dz_i: f32, dz_j: f32) -> f32 {
        match self {
            GridStep::Right => depth + dz_i,
            GridStep::Left => depth - dz_i,
            GridStep::Down => depth + dz_j,
            GridStep::Up => depth - dz_j,
        }
    }

    /// Neighbour coordinates, or `None` when the step leaves a `w × h` image.
    #[inline]
    pub fn apply(self, x: usize, y: usize, w: usize, h: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.offset();
        let xn = x as isize + dx;
        let yn = y as isize + dy;
        if xn < 0 || yn < 0 || xn >= w as isize || yn >= h as isize {
            return None;
        }
        Some((xn as usize, yn as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_center_round_trips_through_camera_frame() {
        let r = nalgebra::Rotation3::from_euler_angles(0.1, -0.2, 0.3).into_inner();
        let pose = Pose::new(r, Vector3::new(0.5, -1.0, 2.0));
        let c = pose.center();
        let in_cam = pose.world_to_camera(&c);
        assert!(in_cam.coords.norm() < 1e-5, "centre maps to {in_cam:?}");
        let p = Point3::new(1.0, 2.0, 3.0);
        let back = pose.camera_to_world(&pose.world_to_camera(&p));
        assert!((back - p).norm() < 1e-5);
    }

    #[test]
    fn grid_steps_stay_inside_image() {
        assert_eq!(GridStep::Left.apply(0, 0, 4, 4), None);
        assert_eq!(GridStep::Up.apply(2, 0, 4, 4), None);
        assert_eq!(GridStep::Right.apply(3, 1, 4, 4), None);
        assert_eq!(GridStep::Down.apply(1, 3, 4, 4), None);
        assert_eq!(GridStep::Right.apply(1, 1, 4, 4), Some((2, 1)));
        assert_eq!(GridStep::Up.apply(1, 1, 4, 4), Some((1, 0)));
    }

    #[test]
    fn predicted_depth_follows_gradient_sign() {
        let (d, gi, gj) = (5.0, 0.25, -0.5);
        assert_eq!(GridStep::Right.predict_depth(d, gi, gj), 5.25);
        assert_eq!(GridStep::Left.predict_depth(d, gi, gj), 4.75);
        assert_eq!(GridStep::Down.predict_depth(d, gi, gj), 4.5);
        assert_eq!(GridStep::Up.predict_depth(d, gi, gj), 5.5);
    }
}
