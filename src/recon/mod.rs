//! Dense depth reconstruction of reference views.
//!
//! Modules
//! - [`params`] – configuration types for a reconstruction.
//! - `pipeline` – the [`DepthReconstructor`] driving seeding, growth and refill.
//! - `progress` – atomically shared status, fill count and cancellation flag.
//! - `batch` – one reconstruction per reference view, optionally on rayon.
//!
//! Key ideas
//! - Growth is strictly sequential per view: entries are processed in
//!   descending confidence, and a pixel only changes when a strictly better
//!   hypothesis arrives.
//! - Superseded queue entries are not removed; they are detected as stale
//!   when popped.
//! - Parallelism lives across views, never inside one view's growth.

mod batch;
pub mod params;
mod pipeline;
mod progress;

pub use batch::{reconstruct_view, reconstruct_views, ViewReconstruction};
pub use params::{ReconParams, SeedOptions};
pub use pipeline::DepthReconstructor;
pub use progress::{Progress, Status};
