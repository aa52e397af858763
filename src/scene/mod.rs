//! Read-only scene description shared by every reconstruction.
//!
//! A [`Scene`] bundles the calibrated views and the sparse feature
//! correspondences produced by structure-from-motion. Reconstructions of
//! different reference views borrow the same scene concurrently; nothing in
//! here is mutated once the scene is built.

mod camera;

pub use camera::{PinholeCamera, Projection};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A calibrated image of the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub camera: PinholeCamera,
}

impl View {
    pub fn new(name: impl Into<String>, camera: PinholeCamera) -> Self {
        Self {
            name: name.into(),
            camera,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.camera.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.camera.height
    }
}

/// Triangulated correspondence and the views that observed it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub pos: Point3<f32>,
    pub views: Vec<usize>,
}

impl Feature {
    pub fn new(pos: Point3<f32>, views: Vec<usize>) -> Self {
        Self { pos, views }
    }

    #[inline]
    pub fn is_visible_in(&self, view: usize) -> bool {
        self.views.contains(&view)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    pub views: Vec<View>,
    pub features: Vec<Feature>,
}

impl Scene {
    pub fn new(views: Vec<View>, features: Vec<Feature>) -> Self {
        Self { views, features }
    }

    #[inline]
    pub fn num_views(&self) -> usize {
        self.views.len()
    }

    #[inline]
    pub fn view(&self, index: usize) -> Option<&View> {
        self.views.get(index)
    }

    /// Features observed by `view`, in scene order.
    pub fn features_in_view(&self, view: usize) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter().filter(move |f| f.is_visible_in(view))
    }
}
