//! Driving reconstructions of many reference views.
//!
//! Views are independent: each worker builds its own optimizer, queue and
//! output, and only reads the shared [`Scene`]. With the `parallel` feature
//! the views are spread over the rayon pool.

use super::params::ReconParams;
use super::pipeline::DepthReconstructor;
use crate::diagnostics::ReconstructionReport;
use crate::optimizer::PatchOptimizer;
use crate::scene::Scene;
use crate::view::ReferenceView;
use log::debug;

/// Output of one reference-view reconstruction.
#[derive(Clone, Debug)]
pub struct ViewReconstruction {
    pub view: ReferenceView,
    pub report: ReconstructionReport,
}

/// Reconstructs `params.reference_view` with the default policies.
pub fn reconstruct_view<O: PatchOptimizer>(
    scene: &Scene,
    params: ReconParams,
    optimizer: O,
) -> ViewReconstruction {
    let mut recon = DepthReconstructor::new(scene, params, optimizer);
    let report = recon.start();
    ViewReconstruction {
        view: recon.into_reference_view(),
        report,
    }
}

/// Reconstructs every view in `views`, building one optimizer per view with
/// `make_optimizer`. Results keep the order of `views`.
pub fn reconstruct_views<O, F>(
    scene: &Scene,
    params: &ReconParams,
    views: &[usize],
    make_optimizer: F,
) -> Vec<ViewReconstruction>
where
    O: PatchOptimizer,
    F: Fn(usize) -> O + Sync,
{
    debug!("reconstruct_views views={} parallel={}", views.len(), cfg!(feature = "parallel"));
    #[cfg(feature = "parallel")]
    {
        reconstruct_views_parallel(scene, params, views, make_optimizer)
    }
    #[cfg(not(feature = "parallel"))]
    {
        reconstruct_views_sequential(scene, params, views, make_optimizer)
    }
}

#[cfg(not(feature = "parallel"))]
fn reconstruct_views_sequential<O, F>(
    scene: &Scene,
    params: &ReconParams,
    views: &[usize],
    make_optimizer: F,
) -> Vec<ViewReconstruction>
where
    O: PatchOptimizer,
    F: Fn(usize) -> O,
{
    views
        .iter()
        .map(|&v| reconstruct_view(scene, params.for_view(v), make_optimizer(v)))
        .collect()
}

#[cfg(feature = "parallel")]
fn reconstruct_views_parallel<O, F>(
    scene: &Scene,
    params: &ReconParams,
    views: &[usize],
    make_optimizer: F,
) -> Vec<ViewReconstruction>
where
    O: PatchOptimizer,
    F: Fn(usize) -> O + Sync,
{
    use rayon::prelude::*;

    views
        .par_iter()
        .map(|&v| reconstruct_view(scene, params.for_view(v), make_optimizer(v)))
        .collect()
}
