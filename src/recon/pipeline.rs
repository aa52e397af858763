//! Reconstruction pipeline growing a dense depth map from sparse seeds.
//!
//! The [`DepthReconstructor`] owns everything one reference view needs: the
//! confidence queue, the global neighbour set, the output
//! [`ReferenceView`] and its collaborators. Phases run in a fixed order:
//!
//! 1. Feature analysis: project every feature seen by the reference view and
//!    keep the ones landing inside the image in front of the camera.
//! 2. Global view selection: pick the bounded neighbour set once.
//! 3. Queue seeding: optimize each projected feature against the neighbour
//!    set and push the successes, plus any caller-supplied seeds.
//! 4. Growth: pop the best entry, commit it if it beats the stored
//!    confidence, then predict depths for the four neighbours from the
//!    committed depth and gradients and push whatever the optimizer accepts.
//! 5. Refill: when the queue drains below the coverage threshold, ask the
//!    refill policy for coarse hints on uncovered pixels, optimize them,
//!    push the successes at reduced confidence and grow again. A refill that
//!    yields nothing ends the run. Every productive round fills at least one
//!    unset pixel, so this terminates without a round cap.
//!
//! Typical usage:
//! ```no_run
//! use mvs_depth::{DepthReconstructor, PatchFit, PatchRequest, ReconParams, Scene};
//!
//! # fn example(scene: &Scene) {
//! let optimizer = |_req: &PatchRequest<'_>| -> Option<PatchFit> { None };
//! let mut recon = DepthReconstructor::new(scene, ReconParams::default(), optimizer);
//! let report = recon.start();
//! println!("coverage: {:.3}", report.coverage);
//! # }
//! ```

use super::params::ReconParams;
use super::progress::{Progress, Status};
use crate::diagnostics::{GrowthStats, ReconstructionReport, RefillRound, SeedStats};
use crate::optimizer::{PatchFit, PatchOptimizer, PatchRequest};
use crate::queue::{ConfidenceQueue, QueueEntry};
use crate::refill::{CoarseDepthRefill, RefillPolicy};
use crate::scene::Scene;
use crate::selection::{FeatureOverlapSelector, ViewSelector};
use crate::types::{GridStep, ViewIndexSet};
use crate::view::ReferenceView;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Instant;

/// Feature projected into the reference view, waiting for optimization.
#[derive(Clone, Copy, Debug)]
struct SeedCandidate {
    x: usize,
    y: usize,
    depth: f32,
}

/// Dense depth reconstruction of one reference view.
pub struct DepthReconstructor<'a, O, S = FeatureOverlapSelector, R = CoarseDepthRefill> {
    scene: &'a Scene,
    params: ReconParams,
    optimizer: O,
    selector: S,
    refill: R,
    queue: ConfidenceQueue,
    neighbors: ViewIndexSet,
    view: ReferenceView,
    external_seeds: Vec<QueueEntry>,
    progress: Arc<Progress>,
}

impl<'a, O: PatchOptimizer> DepthReconstructor<'a, O> {
    /// Reconstructor using the default view selection and refill policies,
    /// configured from `params`.
    pub fn new(scene: &'a Scene, params: ReconParams, optimizer: O) -> Self {
        let selector = FeatureOverlapSelector::new(params.selection.clone());
        let refill = CoarseDepthRefill::new(params.refill.clone());
        Self::with_policies(scene, params, optimizer, selector, refill)
    }
}

impl<'a, O, S, R> DepthReconstructor<'a, O, S, R>
where
    O: PatchOptimizer,
    S: ViewSelector,
    R: RefillPolicy,
{
    pub fn with_policies(
        scene: &'a Scene,
        params: ReconParams,
        optimizer: O,
        selector: S,
        refill: R,
    ) -> Self {
        let (width, height) = match scene.view(params.reference_view) {
            Some(view) => (view.width(), view.height()),
            None => {
                warn!(
                    "reference view {} not in scene with {} views",
                    params.reference_view,
                    scene.num_views()
                );
                (0, 0)
            }
        };
        let view = ReferenceView::new(
            params.reference_view,
            width,
            height,
            params.keep_view_indices,
            params.keep_gradient_maps,
        );
        Self {
            scene,
            params,
            optimizer,
            selector,
            refill,
            queue: ConfidenceQueue::with_capacity(width * height / 4),
            neighbors: ViewIndexSet::new(),
            view,
            external_seeds: Vec::new(),
            progress: Arc::new(Progress::new()),
        }
    }

    /// Replaces the neighbour-view selection policy.
    pub fn with_selector<S2: ViewSelector>(self, selector: S2) -> DepthReconstructor<'a, O, S2, R> {
        DepthReconstructor {
            scene: self.scene,
            params: self.params,
            optimizer: self.optimizer,
            selector,
            refill: self.refill,
            queue: self.queue,
            neighbors: self.neighbors,
            view: self.view,
            external_seeds: self.external_seeds,
            progress: self.progress,
        }
    }

    /// Replaces the refill policy.
    pub fn with_refill<R2: RefillPolicy>(self, refill: R2) -> DepthReconstructor<'a, O, S, R2> {
        DepthReconstructor {
            scene: self.scene,
            params: self.params,
            optimizer: self.optimizer,
            selector: self.selector,
            refill,
            queue: self.queue,
            neighbors: self.neighbors,
            view: self.view,
            external_seeds: self.external_seeds,
            progress: self.progress,
        }
    }

    /// Uses a caller-owned progress handle, e.g. one shared with a UI thread.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn params(&self) -> &ReconParams {
        &self.params
    }

    pub fn reference_view(&self) -> &ReferenceView {
        &self.view
    }

    pub fn into_reference_view(self) -> ReferenceView {
        self.view
    }

    /// Neighbour set chosen by the last [`start`](Self::start).
    pub fn neighbors(&self) -> &ViewIndexSet {
        &self.neighbors
    }

    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }

    /// Queues a hypothesis that is pushed verbatim, without optimization,
    /// when seeding runs. Seeds outside the image or without a positive
    /// finite depth are dropped.
    pub fn add_seed(&mut self, entry: QueueEntry) {
        if entry.x >= self.view.width() || entry.y >= self.view.height() {
            warn!(
                "ignoring seed at ({}, {}) outside {}x{}",
                entry.x,
                entry.y,
                self.view.width(),
                self.view.height()
            );
            return;
        }
        if !(entry.depth.is_finite() && entry.depth > 0.0) {
            warn!(
                "ignoring seed at ({}, {}) with depth {}",
                entry.x, entry.y, entry.depth
            );
            return;
        }
        self.external_seeds.push(entry);
    }

    /// Runs all phases to completion or cancellation. Per-pixel failures are
    /// absorbed; the depth map holds the best assignment reached.
    pub fn start(&mut self) -> ReconstructionReport {
        let total_start = Instant::now();
        let reference = self.params.reference_view;
        let mut report = ReconstructionReport::new(reference, self.view.width(), self.view.height());
        self.progress.set_total(self.view.pixel_count());
        debug!(
            "DepthReconstructor::start view={} w={} h={} features={}",
            reference,
            self.view.width(),
            self.view.height(),
            self.scene.features.len()
        );

        self.progress.set_status(Status::Seeding);
        let stage = Instant::now();
        let candidates = self.analyze_features(&mut report.seeds);
        report.timings.record_since("analyze_features", stage);

        self.progress.set_status(Status::SelectingViews);
        let stage = Instant::now();
        self.neighbors = self.selector.select(self.scene, reference);
        // A view is never its own neighbour.
        self.neighbors.remove(&reference);
        report.neighbors = self.neighbors.iter().copied().collect();
        report.timings.record_since("view_selection", stage);

        self.progress.set_status(Status::Seeding);
        let stage = Instant::now();
        self.process_seeds(&candidates, &mut report.seeds);
        report.timings.record_since("seeding", stage);

        let mut round = 0usize;
        let status = loop {
            self.progress.set_status(Status::Growing);
            let stage = Instant::now();
            let drained = self.process_queue(&mut report.growth);
            report.timings.record_since("growth", stage);
            if !drained {
                break Status::Cancelled;
            }

            let coverage = self.view.coverage();
            if coverage >= self.params.refill.coverage_threshold {
                break Status::Done;
            }
            if self.params.refill.max_rounds.is_some_and(|cap| round >= cap) {
                debug!(
                    "DepthReconstructor view={} refill cap of {} rounds reached coverage={:.3}",
                    reference, round, coverage
                );
                report.refill_capped = true;
                break Status::Done;
            }

            self.progress.set_status(Status::Stalled);
            debug!(
                "DepthReconstructor view={} stalled coverage={:.3} round={}",
                reference, coverage, round
            );
            self.progress.set_status(Status::Refilling);
            let stage = Instant::now();
            let refill = self.refill_queue(round);
            report.timings.record_since("refill", stage);
            let seeds = refill.seeds;
            report.refills.push(refill);
            round += 1;
            if seeds == 0 {
                break Status::Done;
            }
        };

        self.queue.clear();
        self.progress.set_queue_size(0);
        self.progress.set_filled(self.view.filled());
        self.progress.set_status(status);
        report.status = status;
        report.coverage = self.view.coverage();
        report.timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!("DepthReconstructor::start done {}", report.summary());
        report
    }

    fn analyze_features(&self, stats: &mut SeedStats) -> Vec<SeedCandidate> {
        let Some(view) = self.scene.view(self.params.reference_view) else {
            return Vec::new();
        };
        let camera = &view.camera;
        let opts = &self.params.seeds;
        let mut candidates = Vec::new();
        for feature in self.scene.features_in_view(self.params.reference_view) {
            stats.features += 1;
            let projection = camera
                .project(&feature.pos)
                .filter(|p| p.depth >= opts.min_depth && camera.contains(&p.pixel, opts.border_px));
            match projection {
                Some(p) => candidates.push(SeedCandidate {
                    x: p.pixel.x.round() as usize,
                    y: p.pixel.y.round() as usize,
                    depth: p.depth,
                }),
                None => stats.rejected_projection += 1,
            }
        }
        debug!(
            "analyze_features view={} visible={} projected={}",
            self.params.reference_view,
            stats.features,
            candidates.len()
        );
        candidates
    }

    fn process_seeds(&mut self, candidates: &[SeedCandidate], stats: &mut SeedStats) {
        for c in candidates {
            let request = PatchRequest {
                x: c.x,
                y: c.y,
                depth: c.depth,
                dz_i: 0.0,
                dz_j: 0.0,
                views: &self.neighbors,
                neighbors: &self.neighbors,
            };
            match self.optimizer.optimize(&request).filter(PatchFit::is_usable) {
                Some(fit) => {
                    self.queue.push(QueueEntry::from_fit(c.x, c.y, fit));
                    stats.accepted += 1;
                }
                None => stats.rejected_optimizer += 1,
            }
        }
        stats.external += self.external_seeds.len();
        self.queue.extend(self.external_seeds.drain(..));
        self.progress.set_queue_size(self.queue.len());
        debug!(
            "process_seeds view={} accepted={} rejected={} external={} queue={}",
            self.params.reference_view,
            stats.accepted,
            stats.rejected_optimizer,
            stats.external,
            self.queue.len()
        );
    }

    /// Pops until the queue is empty (`true`) or cancellation is requested
    /// (`false`).
    fn process_queue(&mut self, stats: &mut GrowthStats) -> bool {
        let (width, height) = (self.view.width(), self.view.height());
        loop {
            if self.progress.is_cancelled() {
                debug!(
                    "process_queue view={} cancelled with {} queued",
                    self.params.reference_view,
                    self.queue.len()
                );
                return false;
            }
            let Some(entry) = self.queue.pop() else {
                return true;
            };
            stats.pops += 1;
            if !self.view.try_commit(&entry) {
                stats.stale_discards += 1;
                continue;
            }
            stats.commits += 1;
            self.progress.set_filled(self.view.filled());

            for step in GridStep::ALL {
                let Some((nx, ny)) = step.apply(entry.x, entry.y, width, height) else {
                    continue;
                };
                if self.view.confidence_at(nx, ny) >= entry.confidence {
                    continue;
                }
                let guess = step.predict_depth(entry.depth, entry.dz_i, entry.dz_j);
                if !guess.is_finite() || guess <= 0.0 {
                    stats.invalid_guesses += 1;
                    continue;
                }
                let request = PatchRequest {
                    x: nx,
                    y: ny,
                    depth: guess,
                    dz_i: entry.dz_i,
                    dz_j: entry.dz_j,
                    views: &entry.views,
                    neighbors: &self.neighbors,
                };
                stats.optimizer_calls += 1;
                match self.optimizer.optimize(&request).filter(PatchFit::is_usable) {
                    Some(fit) => {
                        self.queue.push(QueueEntry::from_fit(nx, ny, fit));
                        stats.pushes += 1;
                    }
                    None => stats.optimizer_failures += 1,
                }
            }
            self.progress.set_queue_size(self.queue.len());
        }
    }

    fn refill_queue(&mut self, round: usize) -> RefillRound {
        let coverage_before = self.view.coverage();
        let hints = self.refill.propose(&self.view, round);
        let scale = self.params.refill.confidence_scale;
        let (width, height) = (self.view.width(), self.view.height());
        let mut seeds = 0usize;
        for hint in &hints {
            if hint.x >= width || hint.y >= height {
                warn!(
                    "ignoring refill hint at ({}, {}) outside {}x{}",
                    hint.x, hint.y, width, height
                );
                continue;
            }
            if self.view.is_set(hint.x, hint.y) || !(hint.depth.is_finite() && hint.depth > 0.0) {
                continue;
            }
            let request = PatchRequest {
                x: hint.x,
                y: hint.y,
                depth: hint.depth,
                dz_i: hint.dz_i,
                dz_j: hint.dz_j,
                views: &self.neighbors,
                neighbors: &self.neighbors,
            };
            if let Some(fit) = self.optimizer.optimize(&request).filter(PatchFit::is_usable) {
                let confidence = reduce_confidence(fit.confidence, scale);
                // A seed that can never commit would make the round look productive.
                if !confidence.is_finite() {
                    continue;
                }
                self.queue.push(QueueEntry {
                    confidence,
                    ..QueueEntry::from_fit(hint.x, hint.y, fit)
                });
                seeds += 1;
            }
        }
        self.progress.set_queue_size(self.queue.len());
        debug!(
            "refill_queue view={} round={} hints={} seeds={}",
            self.params.reference_view,
            round,
            hints.len(),
            seeds
        );
        RefillRound {
            round,
            coverage_before,
            hints: hints.len(),
            seeds,
        }
    }
}

/// Scales a confidence towards "worse" by `scale` in `(0, 1]`, whatever its
/// sign.
fn reduce_confidence(confidence: f32, scale: f32) -> f32 {
    let scale = scale.clamp(f32::EPSILON, 1.0);
    if confidence >= 0.0 {
        confidence * scale
    } else {
        confidence / scale
    }
}
