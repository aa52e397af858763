#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod io;
pub mod optimizer;
pub mod recon;
pub mod scene;
pub mod types;
pub mod view;

// Policy and data-structure modules. Public so callers can plug in their own
// selection and refill strategies.
pub mod queue;
pub mod refill;
pub mod selection;

// --- High-level re-exports -------------------------------------------------

// Main entry points: reconstructor, parameters and batch drivers.
pub use crate::recon::{
    reconstruct_view, reconstruct_views, DepthReconstructor, Progress, ReconParams, Status,
    ViewReconstruction,
};

// Collaborator seams.
pub use crate::optimizer::{PatchFit, PatchOptimizer, PatchRequest};
pub use crate::refill::RefillPolicy;
pub use crate::selection::ViewSelector;

// Data model.
pub use crate::queue::QueueEntry;
pub use crate::scene::{Feature, PinholeCamera, Scene, View};
pub use crate::types::{Pose, ViewIndexSet};
pub use crate::view::ReferenceView;

pub use crate::diagnostics::ReconstructionReport;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use mvs_depth::prelude::*;
///
/// # fn main() {
/// let camera = PinholeCamera::with_focal(500.0, Pose::default(), 640, 480);
/// let scene = Scene::new(vec![View::new("ref", camera)], Vec::new());
///
/// let optimizer = |_req: &PatchRequest<'_>| -> Option<PatchFit> { None };
/// let mut recon = DepthReconstructor::new(&scene, ReconParams::default(), optimizer);
/// let report = recon.start();
/// println!("status={:?} coverage={:.3}", report.status, report.coverage);
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        DepthReconstructor, PatchFit, PatchRequest, PinholeCamera, Pose, ReconParams, Scene,
        View, ViewIndexSet,
    };
}
