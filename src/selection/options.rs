use serde::Deserialize;

/// Bounds for the global neighbour-view selection.
///
/// - `max_views`: size cap of the neighbour set handed to the optimizer.
/// - `min_shared_features`: views sharing fewer usable features are ignored.
/// - `min_parallax_deg` / `max_parallax_deg`: a shared feature only counts
///   when the angle between its two viewing rays lies in this range. Tiny
///   angles carry no depth information, huge ones rarely match photometrically.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewSelectionOptions {
    pub max_views: usize,
    pub min_shared_features: usize,
    pub min_parallax_deg: f32,
    pub max_parallax_deg: f32,
}

impl Default for ViewSelectionOptions {
    fn default() -> Self {
        Self {
            max_views: 4,
            min_shared_features: 1,
            min_parallax_deg: 2.0,
            max_parallax_deg: 45.0,
        }
    }
}
