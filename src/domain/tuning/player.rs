/// Gameplay tuning for players.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTuning {
    /// World-space collision radius in pixels.
    pub radius: f32,

    pub max_hp: i32,

    /// Movement speed clients predict with, in pixels per second.
    pub speed: f32,

    /// Extra distance from the padded edge when picking a join spawn.
    pub spawn_margin: f32,

    /// Half-width of the square around the map center used for respawns.
    pub respawn_radius: f32,

    /// HP restored by one healing item.
    pub heal_amount: i32,

    /// Maximum healing items a player can carry.
    pub max_healing_stack: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 12.0,
            max_hp: 100,
            speed: 180.0,
            spawn_margin: 64.0,
            respawn_radius: 200.0,
            heal_amount: 50,
            max_healing_stack: 3,
        }
    }
}
