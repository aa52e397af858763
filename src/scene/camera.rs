//! Pinhole camera used to project features and to cast per-pixel rays.
//!
//! Depth throughout the crate is the Euclidean distance from the camera
//! centre along the viewing ray, not the camera-frame `z` coordinate.
use crate::types::Pose;
use nalgebra::{Matrix3, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A world point seen from a camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Continuous pixel coordinates; integer values are pixel centres.
    pub pixel: Vector2<f32>,
    /// Distance from the camera centre along the ray.
    pub depth: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    /// Upper-triangular intrinsics `[fx s cx; 0 fy cy; 0 0 1]`.
    pub kmtx: Matrix3<f32>,
    pub pose: Pose,
    pub width: usize,
    pub height: usize,
}

impl PinholeCamera {
    pub fn new(kmtx: Matrix3<f32>, pose: Pose, width: usize, height: usize) -> Self {
        Self {
            kmtx,
            pose,
            width,
            height,
        }
    }

    /// Simple camera with square pixels and the principal point at the image centre.
    pub fn with_focal(focal: f32, pose: Pose, width: usize, height: usize) -> Self {
        let cx = (width as f32 - 1.0) * 0.5;
        let cy = (height as f32 - 1.0) * 0.5;
        let kmtx = Matrix3::new(focal, 0.0, cx, 0.0, focal, cy, 0.0, 0.0, 1.0);
        Self::new(kmtx, pose, width, height)
    }

    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.pose.center()
    }

    /// Projects a world point; `None` when it lies on or behind the image plane.
    pub fn project(&self, world: &Point3<f32>) -> Option<Projection> {
        let pc = self.pose.world_to_camera(world);
        if !pc.z.is_finite() || pc.z <= f32::EPSILON {
            return None;
        }
        let uvw = self.kmtx * pc.coords;
        let pixel = Vector2::new(uvw.x / uvw.z, uvw.y / uvw.z);
        if !pixel.x.is_finite() || !pixel.y.is_finite() {
            return None;
        }
        Some(Projection {
            pixel,
            depth: pc.coords.norm(),
        })
    }

    /// Unit viewing direction through pixel `(x, y)`, in world coordinates.
    pub fn ray(&self, x: f32, y: f32) -> Vector3<f32> {
        let k = &self.kmtx;
        let yn = (y - k[(1, 2)]) / k[(1, 1)];
        let xn = (x - k[(0, 2)] - k[(0, 1)] * yn) / k[(0, 0)];
        let dir_cam = Vector3::new(xn, yn, 1.0).normalize();
        self.pose.r.transpose() * dir_cam
    }

    /// World point at distance `depth` along the ray through `(x, y)`.
    pub fn unproject(&self, x: f32, y: f32, depth: f32) -> Point3<f32> {
        self.center() + self.ray(x, y) * depth
    }

    /// True when the continuous pixel position lies at least `border` pixels
    /// inside the image.
    pub fn contains(&self, pixel: &Vector2<f32>, border: usize) -> bool {
        let b = border as f32;
        pixel.x >= b
            && pixel.y >= b
            && pixel.x <= self.width as f32 - 1.0 - b
            && pixel.y <= self.height as f32 - 1.0 - b
    }
}
