/// Gameplay tuning for containers, pillars, and their placement.
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerCounts {
    pub rifle: u32,
    pub sniper: u32,
    pub shotgun: u32,
    pub pistol: u32,
    pub healing: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleTuning {
    pub container_max_hp: i32,

    /// Collision radius for movement and projectiles.
    pub container_radius: f32,

    /// Radius clients use when testing projectile hits against containers.
    pub container_damage_radius: f32,

    pub container_counts: ContainerCounts,

    pub pillar_radius: f32,
    pub pillar_count: u32,

    /// Free gap required between the edges of any two obstacles.
    pub min_separation: f32,

    /// No obstacle spawns closer than this to a seed player position.
    pub avoid_player_radius: f32,

    pub max_placement_attempts: u32,

    /// Dropped items land in the annulus [min, max) around the container.
    pub drop_min_offset: f32,
    pub drop_max_offset: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            container_max_hp: 30,
            container_radius: 35.0,
            container_damage_radius: 50.0,
            container_counts: ContainerCounts {
                rifle: 5,
                sniper: 3,
                shotgun: 4,
                pistol: 6,
                healing: 8,
            },
            pillar_radius: 50.0,
            pillar_count: 12,
            min_separation: 150.0,
            avoid_player_radius: 500.0,
            max_placement_attempts: 100,
            drop_min_offset: 30.0,
            drop_max_offset: 50.0,
        }
    }
}
