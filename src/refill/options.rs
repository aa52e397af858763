use serde::Deserialize;

/// Controls when growth counts as stalled and how the low-resolution refill
/// re-seeds it.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RefillOptions {
    /// Coverage in `[0, 1]` at or above which no refill is attempted.
    pub coverage_threshold: f32,
    /// Factor applied to the optimizer confidence of refill seeds so they
    /// never outrank hypotheses reached by regular growth.
    pub confidence_scale: f32,
    /// Optional cap on refill rounds per reconstruction. Unset, refill runs
    /// until a round yields no seeds, which always happens because every
    /// productive round fills at least one more pixel.
    pub max_rounds: Option<usize>,
    /// Levels of the committed-depth pyramid, including full resolution (>= 1).
    pub pyramid_levels: usize,
    /// At most one hint is proposed per `sample_step × sample_step` block.
    pub sample_step: usize,
}

impl Default for RefillOptions {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.95,
            confidence_scale: 0.5,
            max_rounds: None,
            pyramid_levels: 5,
            sample_step: 2,
        }
    }
}
