//! Wall-clock bookkeeping for the phases of a reconstruction.
use serde::Serialize;
use std::time::Instant;

/// One run of a phase. Growth and refill repeat, so `run` numbers the
/// occurrences of a phase from 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub run: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    /// In execution order.
    pub phases: Vec<PhaseTiming>,
}

impl TimingBreakdown {
    pub fn record(&mut self, phase: &'static str, elapsed_ms: f64) {
        let run = self.phases.iter().filter(|p| p.phase == phase).count();
        self.phases.push(PhaseTiming {
            phase,
            run,
            elapsed_ms,
        });
    }

    pub fn record_since(&mut self, phase: &'static str, start: Instant) {
        self.record(phase, start.elapsed().as_secs_f64() * 1000.0);
    }

    /// Time spent in all runs of `phase`.
    pub fn total_for(&self, phase: &str) -> f64 {
        self.phases
            .iter()
            .filter(|p| p.phase == phase)
            .map(|p| p.elapsed_ms)
            .sum()
    }

    pub fn runs_of(&self, phase: &str) -> usize {
        self.phases.iter().filter(|p| p.phase == phase).count()
    }
}
