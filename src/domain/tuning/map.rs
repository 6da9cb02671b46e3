/// Gameplay tuning for the arena bounds.
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTuning {
    /// Side length of the square arena in pixels.
    pub size: f32,

    /// Unwalkable border kept free on every edge.
    pub padding: f32,
}

impl Default for MapTuning {
    fn default() -> Self {
        Self {
            size: 3000.0,
            padding: 32.0,
        }
    }
}
