//! Global neighbour-view selection for a reference view.
//!
//! The selection runs once per reconstruction. Its result bounds the views
//! the patch optimizer may draw on and is also the supporting set of every
//! seed. The ranking policy is pluggable through [`ViewSelector`]; the
//! default [`FeatureOverlapSelector`] ranks views by how many sparse features
//! they share with the reference view at a useful parallax.

mod options;

pub use options::ViewSelectionOptions;

use crate::scene::Scene;
use crate::types::ViewIndexSet;
use log::{debug, warn};
use serde::Serialize;

/// Chooses the bounded neighbour set of a reference view.
pub trait ViewSelector {
    fn select(&self, scene: &Scene, reference: usize) -> ViewIndexSet;
}

impl<F> ViewSelector for F
where
    F: Fn(&Scene, usize) -> ViewIndexSet,
{
    fn select(&self, scene: &Scene, reference: usize) -> ViewIndexSet {
        self(scene, reference)
    }
}

/// Ranking entry produced by [`FeatureOverlapSelector::rank`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewScore {
    pub view: usize,
    /// Shared features whose parallax fell inside the configured range.
    pub shared_features: usize,
    /// Mean parallax of the counted features, in degrees.
    pub mean_parallax_deg: f32,
}

#[derive(Clone, Debug, Default)]
pub struct FeatureOverlapSelector {
    options: ViewSelectionOptions,
}

impl FeatureOverlapSelector {
    pub fn new(options: ViewSelectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ViewSelectionOptions {
        &self.options
    }

    /// Scores every other view of the scene, best first. Views below
    /// `min_shared_features` are dropped; ties keep the lower view index first.
    pub fn rank(&self, scene: &Scene, reference: usize) -> Vec<ViewScore> {
        let Some(ref_view) = scene.view(reference) else {
            return Vec::new();
        };
        let ref_center = ref_view.camera.center();
        let centers: Vec<_> = scene.views.iter().map(|v| v.camera.center()).collect();
        let min_angle = self.options.min_parallax_deg.to_radians();
        let max_angle = self.options.max_parallax_deg.to_radians();

        let mut counts = vec![0usize; scene.num_views()];
        let mut angle_sums = vec![0.0f32; scene.num_views()];
        let mut unknown_views = 0usize;
        for feature in scene.features_in_view(reference) {
            let to_ref = ref_center - feature.pos;
            for &other in &feature.views {
                if other >= centers.len() {
                    unknown_views += 1;
                    continue;
                }
                if other == reference {
                    continue;
                }
                let to_other = centers[other] - feature.pos;
                let angle = to_ref.angle(&to_other);
                if !angle.is_finite() || angle < min_angle || angle > max_angle {
                    continue;
                }
                counts[other] += 1;
                angle_sums[other] += angle;
            }
        }

        if unknown_views > 0 {
            warn!(
                "FeatureOverlapSelector reference={} skipped {} observations of views outside the scene",
                reference, unknown_views
            );
        }

        let mut scores: Vec<ViewScore> = counts
            .iter()
            .enumerate()
            .filter(|&(view, &count)| {
                view != reference && count > 0 && count >= self.options.min_shared_features
            })
            .map(|(view, &count)| ViewScore {
                view,
                shared_features: count,
                mean_parallax_deg: (angle_sums[view] / count as f32).to_degrees(),
            })
            .collect();
        scores.sort_by(|a, b| {
            b.shared_features
                .cmp(&a.shared_features)
                .then(a.view.cmp(&b.view))
        });
        scores
    }
}

impl ViewSelector for FeatureOverlapSelector {
    fn select(&self, scene: &Scene, reference: usize) -> ViewIndexSet {
        let ranking = self.rank(scene, reference);
        let selected: ViewIndexSet = ranking
            .iter()
            .take(self.options.max_views)
            .map(|s| s.view)
            .collect();
        debug!(
            "FeatureOverlapSelector reference={} candidates={} selected={:?}",
            reference,
            ranking.len(),
            selected
        );
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Feature, PinholeCamera, View};
    use crate::types::Pose;
    use nalgebra::{Point3, Vector3};

    fn camera_at(x: f32) -> PinholeCamera {
        // Cameras look down +z; placing the centre at (x, 0, 0) means t = -x.
        let pose = Pose::new(nalgebra::Matrix3::identity(), Vector3::new(-x, 0.0, 0.0));
        PinholeCamera::with_focal(50.0, pose, 32, 32)
    }

    fn scene() -> Scene {
        let views = vec![
            View::new("ref", camera_at(0.0)),
            View::new("near", camera_at(0.01)),
            View::new("good", camera_at(1.0)),
            View::new("okay", camera_at(-1.0)),
            View::new("far", camera_at(50.0)),
        ];
        let mut features = Vec::new();
        for i in 0..6 {
            let pos = Point3::new(i as f32 * 0.1, 0.0, 10.0);
            features.push(Feature::new(pos, vec![0, 1, 2, 4]));
        }
        for i in 0..3 {
            let pos = Point3::new(0.0, i as f32 * 0.1, 10.0);
            features.push(Feature::new(pos, vec![0, 3]));
        }
        // Not seen by the reference view; must not contribute.
        features.push(Feature::new(Point3::new(0.0, 0.0, 10.0), vec![2, 3]));
        Scene::new(views, features)
    }

    #[test]
    fn ranks_views_by_usable_shared_features() {
        let selector = FeatureOverlapSelector::default();
        let ranking = selector.rank(&scene(), 0);
        let order: Vec<usize> = ranking.iter().map(|s| s.view).collect();
        // "near" has too little parallax, "far" too much.
        assert_eq!(order, vec![2, 3]);
        assert_eq!(ranking[0].shared_features, 6);
        assert_eq!(ranking[1].shared_features, 3);
        assert!(ranking[0].mean_parallax_deg > 2.0 && ranking[0].mean_parallax_deg < 45.0);
    }

    #[test]
    fn selection_is_bounded_by_max_views() {
        let selector = FeatureOverlapSelector::new(ViewSelectionOptions {
            max_views: 1,
            ..Default::default()
        });
        assert_eq!(selector.select(&scene(), 0), ViewIndexSet::from([2]));
    }

    #[test]
    fn min_shared_features_filters_weak_overlap() {
        let selector = FeatureOverlapSelector::new(ViewSelectionOptions {
            min_shared_features: 4,
            ..Default::default()
        });
        assert_eq!(selector.select(&scene(), 0), ViewIndexSet::from([2]));
    }

    #[test]
    fn unknown_reference_selects_nothing() {
        let selector = FeatureOverlapSelector::default();
        assert!(selector.select(&scene(), 17).is_empty());
    }
}
