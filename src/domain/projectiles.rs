// Active projectile descriptors and their validity window.

use crate::domain::map::Position;
use crate::domain::player::PlayerId;
use crate::domain::tuning::WeaponKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structured projectile identity: the shooter plus a monotonic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileId {
    pub owner_id: PlayerId,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub origin: Position,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    pub damage: i32,
    pub weapon: WeaponKind,
    pub range: f32,
    pub speed: f32,
    pub spawned_at_ms: u64,
    /// Seconds since spawn, advanced by registry ticks.
    pub age: f32,
}

impl Projectile {
    /// Seconds the projectile stays valid (`range / speed`).
    pub fn lifetime(&self) -> f32 {
        if self.speed > 0.0 {
            self.range / self.speed
        } else {
            0.0
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime()
    }
}

#[derive(Debug, Default)]
pub struct ProjectileRegistry {
    projectiles: HashMap<ProjectileId, Projectile>,
}

impl ProjectileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, projectile: Projectile) {
        self.projectiles.insert(projectile.id, projectile);
    }

    pub fn add_batch<I>(&mut self, projectiles: I)
    where
        I: IntoIterator<Item = Projectile>,
    {
        for p in projectiles {
            self.add(p);
        }
    }

    /// Ages every projectile by `dt` seconds and drops the expired ones.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for p in self.projectiles.values_mut() {
            p.age += dt;
        }
        self.projectiles.retain(|_, p| !p.is_expired());
    }

    pub fn get(&self, id: &ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn remove(&mut self, id: &ProjectileId) -> Option<Projectile> {
        self.projectiles.remove(id)
    }

    pub fn remove_owned_by(&mut self, owner_id: PlayerId) -> usize {
        let before = self.projectiles.len();
        self.projectiles.retain(|_, p| p.owner_id != owner_id);
        before - self.projectiles.len()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(owner_id: PlayerId, sequence: u64, range: f32, speed: f32) -> Projectile {
        Projectile {
            id: ProjectileId { owner_id, sequence },
            owner_id,
            origin: Position::new(0.0, 0.0),
            vx: speed,
            vy: 0.0,
            rotation: 0.0,
            damage: 20,
            weapon: WeaponKind::Rifle,
            range,
            speed,
            spawned_at_ms: 0,
            age: 0.0,
        }
    }

    #[test]
    fn when_age_reaches_range_over_speed_then_projectile_expires() {
        let mut registry = ProjectileRegistry::new();
        // 0.5s lifetime and 1.0s lifetime.
        registry.add(projectile(1, 1, 500.0, 1000.0));
        registry.add(projectile(1, 2, 1000.0, 1000.0));

        registry.tick(0.4);
        assert_eq!(registry.len(), 2);

        registry.tick(0.2);
        assert!(registry.get(&ProjectileId { owner_id: 1, sequence: 1 }).is_none());
        assert!(registry.get(&ProjectileId { owner_id: 1, sequence: 2 }).is_some());

        registry.tick(0.5);
        assert!(registry.is_empty());
    }

    #[test]
    fn when_removing_by_owner_then_other_owners_survive() {
        let mut registry = ProjectileRegistry::new();
        registry.add_batch([
            projectile(1, 1, 500.0, 1000.0),
            projectile(1, 2, 500.0, 1000.0),
            projectile(2, 3, 500.0, 1000.0),
        ]);

        assert_eq!(registry.remove_owned_by(1), 2);
        assert_eq!(registry.all().count(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn when_tick_delta_is_not_finite_then_ages_do_not_change() {
        let mut registry = ProjectileRegistry::new();
        registry.add(projectile(1, 1, 500.0, 1000.0));
        registry.tick(f32::NAN);
        assert_eq!(registry.len(), 1);
    }
}
