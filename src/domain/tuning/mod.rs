// Gameplay tuning shared with clients through the `init` config payload.

pub mod map;
pub mod obstacles;
pub mod player;
pub mod weapons;

pub use map::MapTuning;
pub use obstacles::{ContainerCounts, ObstacleTuning};
pub use player::PlayerTuning;
pub use weapons::{INFINITE_RESERVE, WeaponKind, WeaponSpec};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTuning {
    pub map: MapTuning,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    /// Snapshot broadcasts per second.
    pub tick_rate: u32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            map: MapTuning::default(),
            player: PlayerTuning::default(),
            obstacles: ObstacleTuning::default(),
            tick_rate: 60,
        }
    }
}
