use super::TimingBreakdown;
use crate::recon::Status;
use serde::Serialize;

/// Outcome of seed analysis and queue seeding.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStats {
    /// Features visible in the reference view.
    pub features: usize,
    /// Behind the camera, too close, or outside the image.
    pub rejected_projection: usize,
    /// Declined by the patch optimizer.
    pub rejected_optimizer: usize,
    /// Pushed after a successful optimizer call.
    pub accepted: usize,
    /// Entries supplied by the caller and pushed verbatim.
    pub external: usize,
}

/// Counters of the pop/commit/propagate loop, summed over all growth runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStats {
    pub pops: usize,
    pub commits: usize,
    pub stale_discards: usize,
    pub optimizer_calls: usize,
    pub optimizer_failures: usize,
    /// Predicted depths that were not positive and finite; the optimizer is
    /// not called for them.
    pub invalid_guesses: usize,
    pub pushes: usize,
}

/// One stall → refill transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillRound {
    pub round: usize,
    pub coverage_before: f32,
    pub hints: usize,
    pub seeds: usize,
}

/// Summary returned by [`DepthReconstructor::start`](crate::DepthReconstructor::start).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionReport {
    pub reference_view: usize,
    pub width: usize,
    pub height: usize,
    pub neighbors: Vec<usize>,
    pub seeds: SeedStats,
    pub growth: GrowthStats,
    pub refills: Vec<RefillRound>,
    /// Set when `RefillOptions::max_rounds` stopped the run while refill
    /// could still have added seeds.
    pub refill_capped: bool,
    /// Fraction of pixels holding a depth at termination.
    pub coverage: f32,
    pub status: Status,
    pub timings: TimingBreakdown,
}

impl ReconstructionReport {
    pub fn new(reference_view: usize, width: usize, height: usize) -> Self {
        Self {
            reference_view,
            width,
            height,
            neighbors: Vec::new(),
            seeds: SeedStats::default(),
            growth: GrowthStats::default(),
            refills: Vec::new(),
            refill_capped: false,
            coverage: 0.0,
            status: Status::Idle,
            timings: TimingBreakdown::default(),
        }
    }

    /// One-line human-readable summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "view={} {}x{} coverage={:.3} seeds={}+{} commits={} stale={} optimizer={}/{} refills={}{} status={:?} total_ms={:.2}",
            self.reference_view,
            self.width,
            self.height,
            self.coverage,
            self.seeds.accepted,
            self.seeds.external,
            self.growth.commits,
            self.growth.stale_discards,
            self.growth
                .optimizer_calls
                .saturating_sub(self.growth.optimizer_failures),
            self.growth.optimizer_calls,
            self.refills.len(),
            if self.refill_capped { " (capped)" } else { "" },
            self.status,
            self.timings.total_ms,
        )
    }
}
