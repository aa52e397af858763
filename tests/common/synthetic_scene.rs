use mvs_depth::image::ImageF32;
use mvs_depth::{Feature, PatchFit, PatchRequest, PinholeCamera, Pose, Scene, View};
use nalgebra::{Matrix3, Point3, Vector3};

pub const WIDTH: usize = 48;
pub const HEIGHT: usize = 32;
pub const FOCAL: f32 = 40.0;

/// World plane `normal · X = offset`.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub offset: f32,
}

impl Plane {
    /// Slanted plane roughly 10 units in front of the origin.
    pub fn slanted() -> Self {
        let normal = Vector3::new(-0.05, 0.02, 1.0).normalize();
        Self {
            normal,
            offset: 10.0 * normal.z,
        }
    }

    /// Distance along the ray through `(x, y)` of `camera` to the plane.
    pub fn depth_along_ray(&self, camera: &PinholeCamera, x: f32, y: f32) -> Option<f32> {
        let ray = camera.ray(x, y);
        let denom = self.normal.dot(&ray);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.offset - self.normal.dot(&camera.center().coords)) / denom;
        (t > 0.0).then_some(t)
    }
}

/// Three cameras side by side looking down +z at a slanted plane, with a
/// grid of features on the plane seen by all of them.
pub fn planar_scene(plane: &Plane) -> Scene {
    scene_with_features(plane, WIDTH)
}

/// Like [`planar_scene`], keeping only features left of column `max_x`.
pub fn scene_with_features(plane: &Plane, max_x: usize) -> Scene {
    let views: Vec<View> = [0.0f32, 1.0, -1.0]
        .iter()
        .enumerate()
        .map(|(i, &cx)| {
            // x_cam = x_world - c, so the centre sits at (cx, 0, 0).
            let pose = Pose::new(Matrix3::identity(), Vector3::new(-cx, 0.0, 0.0));
            View::new(format!("cam{i}"), PinholeCamera::with_focal(FOCAL, pose, WIDTH, HEIGHT))
        })
        .collect();

    let reference = &views[0].camera;
    let mut features = Vec::new();
    for gy in 0..4 {
        for gx in 0..6 {
            let x = 4.0 + gx as f32 * 8.0;
            let y = 4.0 + gy as f32 * 8.0;
            if x >= max_x as f32 {
                continue;
            }
            let Some(depth) = plane.depth_along_ray(reference, x, y) else {
                continue;
            };
            let pos: Point3<f32> = reference.unproject(x, y, depth);
            features.push(Feature::new(pos, vec![0, 1, 2]));
        }
    }
    Scene::new(views, features)
}

/// Ground-truth surface seen by the reference camera.
#[derive(Clone, Copy, Debug)]
pub enum Surface {
    Plane(Plane),
    /// Depth discontinuity: `left` for columns below `split_x`, `right` from
    /// `split_x` on.
    Step {
        left: Plane,
        right: Plane,
        split_x: usize,
    },
}

impl Surface {
    fn plane_at(&self, x: usize) -> &Plane {
        match self {
            Surface::Plane(plane) => plane,
            Surface::Step {
                left,
                right,
                split_x,
            } => {
                if x < *split_x {
                    left
                } else {
                    right
                }
            }
        }
    }
}

/// Patch optimizer that knows the true surface.
///
/// Accepts guesses within 20% of the true depth, returns the exact depth and
/// its forward differences, and scores confidence by guess quality modulated
/// by a fixed per-pixel "texture" pattern.
pub struct SurfaceOracle {
    pub camera: PinholeCamera,
    pub surface: Surface,
    pub calls: usize,
}

impl SurfaceOracle {
    pub fn new(scene: &Scene, view: usize, surface: Surface) -> Self {
        Self {
            camera: scene.views[view].camera.clone(),
            surface,
            calls: 0,
        }
    }

    pub fn true_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.surface
            .plane_at(x)
            .depth_along_ray(&self.camera, x as f32, y as f32)
    }

    pub fn fit(&mut self, req: &PatchRequest<'_>) -> Option<PatchFit> {
        self.calls += 1;
        let depth = self.true_depth(req.x, req.y)?;
        let rel_err = (req.depth - depth).abs() / depth;
        if rel_err > 0.2 {
            return None;
        }
        let plane = self.surface.plane_at(req.x);
        let (x, y) = (req.x as f32, req.y as f32);
        let dz_i = plane.depth_along_ray(&self.camera, x + 1.0, y)? - depth;
        let dz_j = plane.depth_along_ray(&self.camera, x, y + 1.0)? - depth;
        let texture = ((req.x * 7 + req.y * 13) % 10) as f32 / 10.0;
        let views = if req.views.is_empty() {
            req.neighbors.clone()
        } else {
            req.views.clone()
        };
        Some(PatchFit {
            depth,
            confidence: (1.0 - rel_err) * (0.5 + 0.5 * texture),
            dz_i,
            dz_j,
            views,
        })
    }

    /// True depth sampled at the centre of every `factor × factor` block.
    pub fn low_res_depth(&self, factor: usize) -> ImageF32 {
        let (w, h) = (self.camera.width.div_ceil(factor), self.camera.height.div_ceil(factor));
        let mut img = ImageF32::new(w, h);
        for ly in 0..h {
            for lx in 0..w {
                let x = (lx * factor + factor / 2).min(self.camera.width - 1);
                let y = (ly * factor + factor / 2).min(self.camera.height - 1);
                img.set(lx, ly, self.true_depth(x, y).unwrap_or(0.0));
            }
        }
        img
    }
}

impl mvs_depth::PatchOptimizer for SurfaceOracle {
    fn optimize(&mut self, request: &PatchRequest<'_>) -> Option<PatchFit> {
        self.fit(request)
    }
}
