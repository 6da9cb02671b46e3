// Server-side fire and hit validation.

use crate::domain::errors::Rejection;
use crate::domain::player::PlayerId;
use crate::domain::projectiles::{Projectile, ProjectileId};
use crate::domain::tuning::WeaponKind;
use crate::domain::world::WorldState;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

const LEDGER_MAX: usize = 1000;
const LEDGER_KEEP: usize = 500;
// Outlives every projectile still in flight, so late hits on expired ones resolve.
const ISSUED_MAX: usize = 4096;

type HitKey = (ProjectileId, PlayerId);

/// Bounded set of accepted `(projectile, target)` pairs.
///
/// Once it grows past its limit the oldest entries are dropped until `keep` remain.
#[derive(Debug)]
pub struct HitLedger {
    seen: HashSet<HitKey>,
    order: VecDeque<HitKey>,
    max: usize,
    keep: usize,
}

impl Default for HitLedger {
    fn default() -> Self {
        Self::with_limits(LEDGER_MAX, LEDGER_KEEP)
    }
}

impl HitLedger {
    pub fn with_limits(max: usize, keep: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            max,
            keep: keep.min(max),
        }
    }

    pub fn contains(&self, projectile_id: ProjectileId, target_id: PlayerId) -> bool {
        self.seen.contains(&(projectile_id, target_id))
    }

    /// Returns false when the pair was already recorded.
    pub fn record(&mut self, projectile_id: ProjectileId, target_id: PlayerId) -> bool {
        let key = (projectile_id, target_id);
        if !self.seen.insert(key) {
            return false;
        }
        self.order.push_back(key);

        if self.order.len() > self.max {
            while self.order.len() > self.keep {
                if let Some(old) = self.order.pop_front() {
                    self.seen.remove(&old);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Damage of every projectile this server handed out, newest `max` kept.
#[derive(Debug)]
pub struct IssuedProjectiles {
    damage: HashMap<ProjectileId, i32>,
    order: VecDeque<ProjectileId>,
    max: usize,
}

impl Default for IssuedProjectiles {
    fn default() -> Self {
        Self::with_limit(ISSUED_MAX)
    }
}

impl IssuedProjectiles {
    pub fn with_limit(max: usize) -> Self {
        Self {
            damage: HashMap::new(),
            order: VecDeque::new(),
            max: max.max(1),
        }
    }

    pub fn record(&mut self, projectile: &Projectile) {
        if self.damage.insert(projectile.id, projectile.damage).is_none() {
            self.order.push_back(projectile.id);
        }
        while self.order.len() > self.max {
            if let Some(old) = self.order.pop_front() {
                self.damage.remove(&old);
            }
        }
    }

    pub fn damage_of(&self, projectile_id: ProjectileId) -> Option<i32> {
        self.damage.get(&projectile_id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeHit {
    pub target_id: PlayerId,
    pub damage: i32,
    pub hp: i32,
    pub killed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    Projectiles(Vec<Projectile>),
    Melee(Vec<MeleeHit>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    pub target_id: PlayerId,
    pub attacker_id: PlayerId,
    pub damage: i32,
    pub hp: i32,
    pub killed: bool,
}

#[derive(Debug, Default)]
pub struct CombatValidator {
    ledger: HitLedger,
    issued: IssuedProjectiles,
    next_sequence: u64,
}

impl CombatValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &HitLedger {
        &self.ledger
    }

    pub fn issued(&self) -> &IssuedProjectiles {
        &self.issued
    }

    /// Checks the per-weapon cooldown, records the shot, then resolves melee hits or
    /// spawns projectiles.
    ///
    /// Ammo is not touched here; callers consume it only after this succeeds.
    pub fn handle_fire(
        &mut self,
        world: &mut WorldState,
        shooter_id: PlayerId,
        weapon: WeaponKind,
        aim_angle: f32,
        now_ms: u64,
    ) -> Result<FireOutcome, Rejection> {
        let spec = weapon.spec();
        let shooter = world
            .player_by_id_mut(shooter_id)
            .ok_or(Rejection::UnknownPlayer)?;
        if !shooter.is_alive() {
            return Err(Rejection::PlayerDead);
        }
        if !shooter.cooldown_elapsed(weapon, now_ms, spec.cooldown_ms) {
            return Err(Rejection::RateLimited);
        }
        shooter.record_fire(weapon, now_ms);
        let origin = shooter.position;

        if spec.is_melee {
            let targets: Vec<PlayerId> = world
                .alive_players()
                .filter(|p| p.id != shooter_id && p.position.distance_to(origin) <= spec.range)
                .map(|p| p.id)
                .collect();

            let mut hits = Vec::with_capacity(targets.len());
            for target_id in targets {
                if let Some(target) = world.player_by_id_mut(target_id) {
                    let killed = target.take_damage(spec.damage, shooter_id);
                    hits.push(MeleeHit {
                        target_id,
                        damage: spec.damage,
                        hp: target.hp,
                        killed,
                    });
                }
            }
            debug!(shooter_id, hits = hits.len(), "melee swing");
            return Ok(FireOutcome::Melee(hits));
        }

        let aim = if aim_angle.is_finite() { aim_angle } else { 0.0 };
        let pellets = spec.pellet_count.max(1);
        let half_spread = spec.spread_angle.to_radians() / 2.0;

        let mut projectiles = Vec::with_capacity(pellets as usize);
        for _ in 0..pellets {
            let angle = if pellets > 1 && half_spread > 0.0 {
                aim + world.rng().gen_range(-half_spread..=half_spread)
            } else {
                aim
            };
            self.next_sequence += 1;
            projectiles.push(Projectile {
                id: ProjectileId {
                    owner_id: shooter_id,
                    sequence: self.next_sequence,
                },
                owner_id: shooter_id,
                origin,
                vx: angle.cos() * spec.speed,
                vy: angle.sin() * spec.speed,
                rotation: angle,
                damage: spec.damage,
                weapon,
                range: spec.range,
                speed: spec.speed,
                spawned_at_ms: now_ms,
                age: 0.0,
            });
        }

        for projectile in &projectiles {
            self.issued.record(projectile);
        }
        world.projectiles_mut().add_batch(projectiles.iter().cloned());
        Ok(FireOutcome::Projectiles(projectiles))
    }

    /// Validates a client-reported hit and applies the damage once per `(projectile, target)`.
    ///
    /// Only ids this validator issued are accepted. Damage is capped by the projectile's own.
    pub fn validate_hit(
        &mut self,
        world: &mut WorldState,
        shooter_id: PlayerId,
        projectile_id: ProjectileId,
        target_id: PlayerId,
        reported_damage: i32,
    ) -> Result<DamageReport, Rejection> {
        if world.player_by_id(shooter_id).is_none() {
            return Err(Rejection::UnknownPlayer);
        }
        if projectile_id.owner_id != shooter_id {
            return Err(Rejection::OwnerMismatch);
        }

        let ceiling = match world.projectiles().get(&projectile_id) {
            Some(live) if live.owner_id != shooter_id => return Err(Rejection::OwnerMismatch),
            Some(live) => live.damage,
            None => self
                .issued
                .damage_of(projectile_id)
                .ok_or(Rejection::UnknownProjectile)?,
        };

        if self.ledger.contains(projectile_id, target_id) {
            return Err(Rejection::DuplicateHit);
        }

        let target = world
            .player_by_id_mut(target_id)
            .ok_or(Rejection::UnknownTarget)?;
        if !target.is_alive() {
            return Err(Rejection::TargetDead);
        }

        let damage = reported_damage.clamp(0, ceiling.max(0));
        let killed = target.take_damage(damage, shooter_id);
        let hp = target.hp;
        self.ledger.record(projectile_id, target_id);

        Ok(DamageReport {
            target_id,
            attacker_id: shooter_id,
            damage,
            hp,
            killed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map::Position;
    use crate::domain::tuning::GameTuning;

    fn world_with(positions: &[(f32, f32)]) -> (WorldState, Vec<PlayerId>) {
        let mut world = WorldState::empty(GameTuning::default(), 17);
        let mut ids = Vec::new();
        for (i, (x, y)) in positions.iter().enumerate() {
            let id = world.add_player(i as u64 + 1).id;
            world.player_by_id_mut(id).expect("player").position = Position::new(*x, *y);
            ids.push(id);
        }
        (world, ids)
    }

    fn fire(
        combat: &mut CombatValidator,
        world: &mut WorldState,
        shooter: PlayerId,
        weapon: WeaponKind,
        now_ms: u64,
    ) -> Result<FireOutcome, Rejection> {
        combat.handle_fire(world, shooter, weapon, 0.0, now_ms)
    }

    fn projectiles(outcome: FireOutcome) -> Vec<Projectile> {
        match outcome {
            FireOutcome::Projectiles(p) => p,
            FireOutcome::Melee(_) => panic!("expected projectiles"),
        }
    }

    fn first_bullet(
        combat: &mut CombatValidator,
        world: &mut WorldState,
        shooter: PlayerId,
        weapon: WeaponKind,
        now_ms: u64,
    ) -> ProjectileId {
        let outcome = fire(combat, world, shooter, weapon, now_ms).expect("fire");
        projectiles(outcome)[0].id
    }

    #[test]
    fn when_rifle_fires_inside_cooldown_then_shot_is_rate_limited() {
        let (mut world, ids) = world_with(&[(500.0, 500.0)]);
        let mut combat = CombatValidator::new();

        assert!(fire(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0).is_ok());
        assert_eq!(
            fire(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 100),
            Err(Rejection::RateLimited)
        );
        assert!(fire(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 160).is_ok());
        assert_eq!(world.projectiles().len(), 2);
    }

    #[test]
    fn when_other_weapon_is_cooling_down_then_switching_weapon_can_still_fire() {
        let (mut world, ids) = world_with(&[(500.0, 500.0)]);
        let mut combat = CombatValidator::new();

        assert!(fire(&mut combat, &mut world, ids[0], WeaponKind::Sniper, 0).is_ok());
        assert!(fire(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 10).is_ok());
    }

    #[test]
    fn when_shotgun_fires_then_twelve_pellets_spread_within_four_degrees() {
        let (mut world, ids) = world_with(&[(500.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let aim = 1.0_f32;

        let outcome = combat
            .handle_fire(&mut world, ids[0], WeaponKind::Shotgun, aim, 0)
            .expect("fire");
        let pellets = projectiles(outcome);

        assert_eq!(pellets.len(), 12);
        let limit = 4.0_f32.to_radians() + 1e-5;
        for p in &pellets {
            assert!((p.rotation - aim).abs() <= limit, "rotation {}", p.rotation);
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((speed - 1000.0).abs() < 0.5);
            assert_eq!(p.origin, Position::new(500.0, 500.0));
        }
        let mut seqs: Vec<u64> = pellets.iter().map(|p| p.id.sequence).collect();
        seqs.dedup();
        assert_eq!(seqs.len(), 12);
    }

    #[test]
    fn when_fist_swings_then_only_players_in_reach_are_hit() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (535.0, 500.0), (600.0, 500.0)]);
        let mut combat = CombatValidator::new();

        let outcome = fire(&mut combat, &mut world, ids[0], WeaponKind::Fist, 0).expect("swing");

        assert_eq!(
            outcome,
            FireOutcome::Melee(vec![MeleeHit {
                target_id: ids[1],
                damage: 10,
                hp: 90,
                killed: false,
            }])
        );
        assert!(world.projectiles().is_empty());
    }

    #[test]
    fn when_same_projectile_hits_same_target_twice_then_second_is_duplicate() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let bullet = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0);

        let first = combat
            .validate_hit(&mut world, ids[0], bullet, ids[1], 20)
            .expect("first hit");
        assert_eq!(first.hp, 80);

        assert_eq!(
            combat.validate_hit(&mut world, ids[0], bullet, ids[1], 20),
            Err(Rejection::DuplicateHit)
        );
        assert_eq!(world.player_by_id(ids[1]).map(|p| p.hp), Some(80));
    }

    #[test]
    fn when_sniper_hit_kills_then_later_hits_on_target_are_ignored() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let bullet = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Sniper, 0);

        let report = combat
            .validate_hit(&mut world, ids[0], bullet, ids[1], 100)
            .expect("hit");
        assert!(report.killed);
        assert_eq!(report.hp, 0);

        let other = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 10);
        assert_eq!(
            combat.validate_hit(&mut world, ids[0], other, ids[1], 20),
            Err(Rejection::TargetDead)
        );
    }

    #[test]
    fn when_reported_damage_exceeds_projectile_damage_then_it_is_clamped() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let bullet = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0);

        let report = combat
            .validate_hit(&mut world, ids[0], bullet, ids[1], 5000)
            .expect("hit");

        assert_eq!(report.damage, 20);
        assert_eq!(report.hp, 80);
    }

    #[test]
    fn when_projectile_has_expired_then_its_recorded_damage_still_caps_the_hit() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let stale = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0);
        world.tick(10.0);
        assert!(world.projectiles().get(&stale).is_none());

        let report = combat
            .validate_hit(&mut world, ids[0], stale, ids[1], 5000)
            .expect("hit");
        assert_eq!(report.damage, 20);
        assert_eq!(report.hp, 80);
    }

    #[test]
    fn when_hit_names_a_sequence_never_fired_then_it_is_rejected() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0)]);
        let mut combat = CombatValidator::new();
        let forged = ProjectileId {
            owner_id: ids[0],
            sequence: 123_456,
        };

        assert_eq!(
            combat.validate_hit(&mut world, ids[0], forged, ids[1], 100),
            Err(Rejection::UnknownProjectile)
        );
        assert_eq!(world.player_by_id(ids[1]).map(|p| p.hp), Some(100));
        assert!(combat.ledger().is_empty());
    }

    #[test]
    fn when_issued_record_is_full_then_oldest_ids_are_forgotten() {
        let (mut world, ids) = world_with(&[(500.0, 500.0)]);
        let mut combat = CombatValidator {
            issued: IssuedProjectiles::with_limit(12),
            ..CombatValidator::default()
        };

        let first = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0);
        let shotgun = fire(&mut combat, &mut world, ids[0], WeaponKind::Shotgun, 10).expect("fire");
        let pellets = projectiles(shotgun);

        assert_eq!(combat.issued().len(), 12);
        assert_eq!(combat.issued().damage_of(first), None);
        assert_eq!(combat.issued().damage_of(pellets[11].id), Some(15));
    }

    #[test]
    fn when_projectile_belongs_to_someone_else_then_hit_is_rejected() {
        let (mut world, ids) = world_with(&[(500.0, 500.0), (900.0, 500.0), (900.0, 900.0)]);
        let mut combat = CombatValidator::new();
        let bullet = first_bullet(&mut combat, &mut world, ids[0], WeaponKind::Rifle, 0);

        assert_eq!(
            combat.validate_hit(&mut world, ids[2], bullet, ids[1], 20),
            Err(Rejection::OwnerMismatch)
        );
        assert_eq!(
            combat.validate_hit(&mut world, ids[0], bullet, 77, 20),
            Err(Rejection::UnknownTarget)
        );
    }

    #[test]
    fn when_ledger_exceeds_limit_then_oldest_entries_are_pruned() {
        let mut ledger = HitLedger::default();
        for seq in 0..=1000 {
            assert!(ledger.record(ProjectileId { owner_id: 1, sequence: seq }, 2));
        }

        assert_eq!(ledger.len(), 500);
        assert!(!ledger.contains(ProjectileId { owner_id: 1, sequence: 0 }, 2));
        assert!(!ledger.contains(ProjectileId { owner_id: 1, sequence: 500 }, 2));
        assert!(ledger.contains(ProjectileId { owner_id: 1, sequence: 501 }, 2));
        assert!(ledger.contains(ProjectileId { owner_id: 1, sequence: 1000 }, 2));
    }

    #[test]
    fn when_pair_is_recorded_twice_then_ledger_reports_duplicate() {
        let mut ledger = HitLedger::with_limits(4, 2);
        let id = ProjectileId { owner_id: 1, sequence: 1 };
        assert!(ledger.record(id, 2));
        assert!(!ledger.record(id, 2));
        assert!(ledger.record(id, 3));
        assert_eq!(ledger.len(), 2);
    }
}
