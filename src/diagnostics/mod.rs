//! Diagnostics returned alongside the depth map.
//!
//! A [`ReconstructionReport`] is cheap to build and serialisable, so batch
//! drivers can dump one JSON file per reference view (see
//! [`crate::io::write_report_per_view`]) to investigate poorly covered views.

mod report;
pub mod timing;

pub use report::{GrowthStats, ReconstructionReport, RefillRound, SeedStats};
pub use timing::{PhaseTiming, TimingBreakdown};
