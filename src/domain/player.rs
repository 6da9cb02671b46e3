// Per-connection player entity: position, health, inventory, and cooldowns.

use crate::domain::map::{Circle, Position, SpatialMap, push_out_of};
use crate::domain::tuning::{PlayerTuning, WeaponKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PlayerId = u64;
pub type ConnectionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Ammo state for one weapon held in an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub magazine: u32,
    pub reserve: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub primary: Option<WeaponSlot>,
    pub pistol: Option<WeaponSlot>,
    pub healing: u32,
}

impl Inventory {
    /// The slot currently holding `kind`, if any.
    pub fn slot(&self, kind: WeaponKind) -> Option<&WeaponSlot> {
        let slot = if kind.is_sidearm() {
            self.pistol.as_ref()
        } else {
            self.primary.as_ref()
        };
        slot.filter(|s| s.kind == kind)
    }

    pub fn slot_mut(&mut self, kind: WeaponKind) -> Option<&mut WeaponSlot> {
        let slot = if kind.is_sidearm() {
            self.pistol.as_mut()
        } else {
            self.primary.as_mut()
        };
        slot.filter(|s| s.kind == kind)
    }

    /// Stores a weapon, replacing whatever occupied its slot.
    pub fn store(&mut self, slot: WeaponSlot) {
        if slot.kind.is_sidearm() {
            self.pistol = Some(slot);
        } else {
            self.primary = Some(slot);
        }
    }

    pub fn holds(&self, kind: WeaponKind) -> bool {
        kind == WeaponKind::Fist || self.slot(kind).is_some()
    }
}

/// Client-reported movement; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementUpdate {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation: Option<f32>,
    pub direction: Option<Direction>,
    pub is_moving: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub connection_id: ConnectionId,
    pub position: Position,
    pub rotation: f32,
    pub direction: Direction,
    pub is_moving: bool,
    pub hp: i32,
    pub max_hp: i32,
    pub life: LifeState,
    pub current_weapon: WeaponKind,
    pub inventory: Inventory,
    radius: f32,
    last_fire_ms: HashMap<WeaponKind, u64>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        connection_id: ConnectionId,
        position: Position,
        tuning: &PlayerTuning,
    ) -> Self {
        Self {
            id,
            connection_id,
            position,
            rotation: 0.0,
            direction: Direction::Down,
            is_moving: false,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            life: LifeState::Alive,
            current_weapon: WeaponKind::Fist,
            inventory: Inventory::default(),
            radius: tuning.radius,
            last_fire_ms: HashMap::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Applies a client-reported position, then clamps to the map and pushes out of obstacles.
    pub fn update_position<I>(&mut self, update: MovementUpdate, map: &SpatialMap, obstacles: I)
    where
        I: IntoIterator<Item = Circle>,
    {
        if !self.is_alive() {
            return;
        }

        if let Some(x) = update.x.filter(|v| v.is_finite()) {
            self.position.x = x;
        }
        if let Some(y) = update.y.filter(|v| v.is_finite()) {
            self.position.y = y;
        }
        if let Some(rotation) = update.rotation.filter(|v| v.is_finite()) {
            self.rotation = rotation;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(is_moving) = update.is_moving {
            self.is_moving = is_moving;
        }

        let clamped = map.clamp(self.position, self.radius);
        self.position = push_out_of(clamped, self.radius, obstacles);
    }

    /// Returns true when this call moved the player from alive to dead.
    pub fn take_damage(&mut self, amount: i32, attacker_id: PlayerId) -> bool {
        if !self.is_alive() {
            return false;
        }

        self.hp = self.hp.saturating_sub(amount.max(0)).clamp(0, self.max_hp);
        if self.hp == 0 {
            self.life = LifeState::Dead;
            self.is_moving = false;
            tracing::debug!(player_id = self.id, attacker_id, "player killed");
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = self.hp.saturating_add(amount.max(0)).clamp(0, self.max_hp);
        true
    }

    pub fn respawn(&mut self, position: Position) {
        self.position = position;
        self.hp = self.max_hp;
        self.life = LifeState::Alive;
        self.is_moving = false;
        self.current_weapon = WeaponKind::Fist;
    }

    pub fn last_fire(&self, weapon: WeaponKind) -> Option<u64> {
        self.last_fire_ms.get(&weapon).copied()
    }

    /// True when `weapon` has been idle for at least `cooldown_ms`.
    pub fn cooldown_elapsed(&self, weapon: WeaponKind, now_ms: u64, cooldown_ms: u64) -> bool {
        match self.last_fire(weapon) {
            Some(last) => now_ms.saturating_sub(last) >= cooldown_ms,
            None => true,
        }
    }

    pub fn record_fire(&mut self, weapon: WeaponKind, now_ms: u64) {
        self.last_fire_ms.insert(weapon, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::MapTuning;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(1, 10, Position::new(x, y), &PlayerTuning::default())
    }

    fn map() -> SpatialMap {
        SpatialMap::new(MapTuning::default())
    }

    fn move_to(x: f32, y: f32) -> MovementUpdate {
        MovementUpdate {
            x: Some(x),
            y: Some(y),
            ..MovementUpdate::default()
        }
    }

    #[test]
    fn when_damage_exceeds_health_then_hp_clamps_to_zero_and_kill_is_reported_once() {
        let mut player = player_at(500.0, 500.0);

        assert!(player.take_damage(100, 2));
        assert_eq!(player.hp, 0);
        assert_eq!(player.life, LifeState::Dead);

        // A second hit on a dead player changes nothing.
        assert!(!player.take_damage(100, 2));
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn when_damage_is_negative_then_health_does_not_exceed_max() {
        let mut player = player_at(500.0, 500.0);
        assert!(!player.take_damage(-50, 2));
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn when_healing_past_max_then_hp_clamps_to_max() {
        let mut player = player_at(500.0, 500.0);
        player.take_damage(30, 2);
        assert!(player.heal(500));
        assert_eq!(player.hp, 100);
    }

    #[test]
    fn when_amounts_are_extreme_then_health_saturates_instead_of_overflowing() {
        let mut player = player_at(500.0, 500.0);
        player.take_damage(30, 2);
        assert!(player.heal(i32::MAX));
        assert_eq!(player.hp, 100);

        assert!(player.take_damage(i32::MAX, 2));
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn when_player_is_dead_then_heal_is_ignored() {
        let mut player = player_at(500.0, 500.0);
        player.take_damage(100, 2);
        assert!(!player.heal(50));
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn when_respawning_then_health_position_and_weapon_reset() {
        let mut player = player_at(500.0, 500.0);
        player.current_weapon = WeaponKind::Rifle;
        player.take_damage(100, 2);

        player.respawn(Position::new(1500.0, 1400.0));

        assert!(player.is_alive());
        assert_eq!(player.hp, 100);
        assert_eq!(player.position, Position::new(1500.0, 1400.0));
        assert_eq!(player.current_weapon, WeaponKind::Fist);
    }

    #[test]
    fn when_reported_position_is_outside_map_then_it_is_clamped() {
        let mut player = player_at(500.0, 500.0);
        player.update_position(move_to(-100.0, 4000.0), &map(), []);
        assert_eq!(player.position, Position::new(44.0, 2956.0));
    }

    #[test]
    fn when_reported_position_overlaps_obstacle_then_player_is_pushed_to_its_edge() {
        let mut player = player_at(500.0, 500.0);
        let pillar = Circle {
            center: Position::new(1000.0, 1000.0),
            radius: 50.0,
        };

        player.update_position(move_to(1030.0, 1000.0), &map(), [pillar]);

        assert!((player.position.x - 1062.0).abs() < 1e-3);
        assert!((player.position.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn when_position_matches_obstacle_center_then_push_is_along_positive_x() {
        let mut player = player_at(500.0, 500.0);
        let pillar = Circle {
            center: Position::new(1000.0, 1000.0),
            radius: 50.0,
        };

        player.update_position(move_to(1000.0, 1000.0), &map(), [pillar]);

        assert!((player.position.x - 1062.0).abs() < 1e-3);
        assert_eq!(player.position.y, 1000.0);
    }

    #[test]
    fn when_update_has_non_finite_values_then_they_are_ignored() {
        let mut player = player_at(500.0, 600.0);
        player.update_position(
            MovementUpdate {
                x: Some(f32::NAN),
                y: Some(f32::INFINITY),
                rotation: Some(1.5),
                ..MovementUpdate::default()
            },
            &map(),
            [],
        );
        assert_eq!(player.position, Position::new(500.0, 600.0));
        assert_eq!(player.rotation, 1.5);
    }

    #[test]
    fn when_dead_then_position_updates_are_ignored() {
        let mut player = player_at(500.0, 500.0);
        player.take_damage(100, 2);
        player.update_position(move_to(900.0, 900.0), &map(), []);
        assert_eq!(player.position, Position::new(500.0, 500.0));
    }

    #[test]
    fn when_weapon_never_fired_then_cooldown_is_elapsed() {
        let mut player = player_at(500.0, 500.0);
        assert!(player.cooldown_elapsed(WeaponKind::Rifle, 0, 150));
        player.record_fire(WeaponKind::Rifle, 0);
        assert!(!player.cooldown_elapsed(WeaponKind::Rifle, 100, 150));
        assert!(player.cooldown_elapsed(WeaponKind::Rifle, 150, 150));
        // Cooldowns are tracked per weapon.
        assert!(player.cooldown_elapsed(WeaponKind::Fist, 100, 500));
    }

    #[test]
    fn when_slot_holds_other_weapon_then_lookup_by_kind_fails() {
        let mut inventory = Inventory::default();
        inventory.store(WeaponSlot {
            kind: WeaponKind::Shotgun,
            magazine: 6,
            reserve: 24,
        });
        assert!(inventory.slot(WeaponKind::Rifle).is_none());
        assert!(inventory.slot(WeaponKind::Shotgun).is_some());
        assert!(inventory.holds(WeaponKind::Fist));
        assert!(!inventory.holds(WeaponKind::Pistol));
    }
}
