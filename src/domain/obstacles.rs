// Destructible containers, static pillars, and the loot they drop.

use crate::domain::errors::Rejection;
use crate::domain::map::{Circle, Position, SpatialMap};
use crate::domain::player::{Player, WeaponSlot};
use crate::domain::tuning::{ObstacleTuning, WeaponKind};
use rand::Rng;
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use tracing::{debug, info};

pub type ContainerId = u64;
pub type PillarId = u64;
pub type ItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerContent {
    Weapon(WeaponKind),
    Healing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    pub position: Position,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub destroyed: bool,
    pub content: ContainerContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pillar {
    pub id: PillarId,
    pub position: Position,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Weapon {
        kind: WeaponKind,
        magazine: u32,
        reserve: u32,
    },
    Healing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub position: Position,
    pub spawned_at_ms: u64,
}

/// Result of damaging a container that still existed.
#[derive(Debug, Clone)]
pub struct ContainerDamage {
    pub container: Container,
    pub dropped: Option<DroppedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleHit {
    Container(ContainerId),
    Pillar(PillarId),
}

/// Static world layout sent to joining players.
#[derive(Debug, Clone, Default)]
pub struct WorldLayout {
    pub containers: Vec<Container>,
    pub pillars: Vec<Pillar>,
    pub items: Vec<DroppedItem>,
}

#[derive(Debug)]
pub struct ObstacleDirectory {
    tuning: ObstacleTuning,
    // BTreeMaps keyed by monotonic ids iterate in creation order.
    containers: BTreeMap<ContainerId, Container>,
    pillars: BTreeMap<PillarId, Pillar>,
    items: BTreeMap<ItemId, DroppedItem>,
    next_container_id: ContainerId,
    next_pillar_id: PillarId,
    next_item_id: ItemId,
}

impl ObstacleDirectory {
    pub fn new(tuning: ObstacleTuning) -> Self {
        Self {
            tuning,
            containers: BTreeMap::new(),
            pillars: BTreeMap::new(),
            items: BTreeMap::new(),
            next_container_id: 0,
            next_pillar_id: 0,
            next_item_id: 0,
        }
    }

    /// Places pillars, then weapon containers, then healing containers.
    pub fn place_initial_obstacles<R: Rng + ?Sized>(
        &mut self,
        map: &SpatialMap,
        avoid: &[Position],
        rng: &mut R,
    ) {
        for _ in 0..self.tuning.pillar_count {
            let position = self.find_placement(map, self.tuning.pillar_radius, avoid, rng);
            self.spawn_pillar(position);
        }

        let counts = self.tuning.container_counts;
        let plan = [
            (ContainerContent::Weapon(WeaponKind::Rifle), counts.rifle),
            (ContainerContent::Weapon(WeaponKind::Sniper), counts.sniper),
            (ContainerContent::Weapon(WeaponKind::Shotgun), counts.shotgun),
            (ContainerContent::Weapon(WeaponKind::Pistol), counts.pistol),
            (ContainerContent::Healing, counts.healing),
        ];
        for (content, count) in plan {
            for _ in 0..count {
                let position = self.find_placement(map, self.tuning.container_radius, avoid, rng);
                self.spawn_container(position, content);
            }
        }

        info!(
            containers = self.containers.len(),
            pillars = self.pillars.len(),
            "obstacles placed"
        );
    }

    // Rejection sampling; falls back to the last sample once attempts run out.
    fn find_placement<R: Rng + ?Sized>(
        &self,
        map: &SpatialMap,
        radius: f32,
        avoid: &[Position],
        rng: &mut R,
    ) -> Position {
        let attempts = self.tuning.max_placement_attempts.max(1);
        let mut candidate = map.random_position(rng);
        for attempt in 0..attempts {
            if attempt > 0 {
                candidate = map.random_position(rng);
            }
            if self.placement_is_clear(candidate, radius, avoid) {
                return candidate;
            }
        }

        debug!(
            x = candidate.x,
            y = candidate.y,
            attempts,
            "placement attempts exhausted; using last sample"
        );
        candidate
    }

    fn placement_is_clear(&self, candidate: Position, radius: f32, avoid: &[Position]) -> bool {
        if avoid
            .iter()
            .any(|p| candidate.distance_to(*p) < self.tuning.avoid_player_radius)
        {
            return false;
        }

        let separation = self.tuning.min_separation + radius;
        let near_pillar = self
            .pillars
            .values()
            .any(|p| candidate.distance_to(p.position) < separation + p.radius);
        let near_container = self
            .containers
            .values()
            .any(|c| candidate.distance_to(c.position) < separation + c.radius);
        !near_pillar && !near_container
    }

    pub fn spawn_pillar(&mut self, position: Position) -> PillarId {
        let id = self.next_pillar_id;
        self.next_pillar_id += 1;
        self.pillars.insert(
            id,
            Pillar {
                id,
                position,
                radius: self.tuning.pillar_radius,
            },
        );
        id
    }

    pub fn spawn_container(
        &mut self,
        position: Position,
        content: ContainerContent,
    ) -> ContainerId {
        let id = self.next_container_id;
        self.next_container_id += 1;
        self.containers.insert(
            id,
            Container {
                id,
                position,
                radius: self.tuning.container_radius,
                hp: self.tuning.container_max_hp,
                max_hp: self.tuning.container_max_hp,
                destroyed: false,
                content,
            },
        );
        id
    }

    /// Applies damage; a container reaching 0 hp is removed and drops exactly one item.
    pub fn damage_container<R: Rng + ?Sized>(
        &mut self,
        id: ContainerId,
        amount: i32,
        now_ms: u64,
        rng: &mut R,
    ) -> Option<ContainerDamage> {
        let container = self.containers.get_mut(&id)?;
        if container.destroyed {
            return None;
        }

        container.hp = (container.hp - amount.max(0)).clamp(0, container.max_hp);
        if container.hp > 0 {
            return Some(ContainerDamage {
                container: container.clone(),
                dropped: None,
            });
        }

        container.destroyed = true;
        let container = self.containers.remove(&id)?;
        let item = self.drop_item(&container, now_ms, rng);
        debug!(container_id = id, item_id = item.id, "container destroyed");
        Some(ContainerDamage {
            container,
            dropped: Some(item),
        })
    }

    fn drop_item<R: Rng + ?Sized>(
        &mut self,
        container: &Container,
        now_ms: u64,
        rng: &mut R,
    ) -> DroppedItem {
        let angle = rng.gen_range(0.0..TAU);
        let (min, max) = (self.tuning.drop_min_offset, self.tuning.drop_max_offset);
        let distance = if max > min {
            rng.gen_range(min..max)
        } else {
            min
        };

        let kind = match container.content {
            ContainerContent::Weapon(kind) => {
                let spec = kind.spec();
                ItemKind::Weapon {
                    kind,
                    magazine: spec.magazine_size,
                    reserve: spec.starting_reserve(),
                }
            }
            ContainerContent::Healing => ItemKind::Healing,
        };

        let id = self.next_item_id;
        self.next_item_id += 1;
        let item = DroppedItem {
            id,
            kind,
            position: container.position.offset(angle, distance),
            spawned_at_ms: now_ms,
        };
        self.items.insert(id, item.clone());
        item
    }

    /// Moves a dropped item into the player's inventory.
    pub fn pickup_item(
        &mut self,
        item_id: ItemId,
        player: &mut Player,
        max_healing_stack: u32,
    ) -> Result<DroppedItem, Rejection> {
        let item = self.items.get(&item_id).ok_or(Rejection::UnknownItem)?;

        match item.kind {
            ItemKind::Weapon {
                kind,
                magazine,
                reserve,
            } => {
                player.inventory.store(WeaponSlot {
                    kind,
                    magazine: magazine.min(kind.spec().magazine_size),
                    reserve,
                });
                player.current_weapon = kind;
            }
            ItemKind::Healing => {
                if player.inventory.healing >= max_healing_stack {
                    return Err(Rejection::HealingStackFull);
                }
                player.inventory.healing += 1;
            }
        }

        self.items.remove(&item_id).ok_or(Rejection::UnknownItem)
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&DroppedItem> {
        self.items.get(&id)
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    pub fn pillars(&self) -> impl Iterator<Item = &Pillar> {
        self.pillars.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &DroppedItem> {
        self.items.values()
    }

    /// Live containers then pillars, each in creation order.
    pub fn blocking_circles(&self) -> impl Iterator<Item = Circle> + '_ {
        let containers = self
            .containers
            .values()
            .filter(|c| !c.destroyed)
            .map(|c| Circle {
                center: c.position,
                radius: c.radius,
            });
        let pillars = self.pillars.values().map(|p| Circle {
            center: p.position,
            radius: p.radius,
        });
        containers.chain(pillars)
    }

    pub fn check_collision(&self, position: Position, radius: f32) -> Option<ObstacleHit> {
        if let Some(c) = self
            .containers
            .values()
            .find(|c| !c.destroyed && position.distance_to(c.position) < radius + c.radius)
        {
            return Some(ObstacleHit::Container(c.id));
        }

        self.pillars
            .values()
            .find(|p| position.distance_to(p.position) < radius + p.radius)
            .map(|p| ObstacleHit::Pillar(p.id))
    }

    pub fn snapshot_all(&self) -> WorldLayout {
        WorldLayout {
            containers: self.containers.values().cloned().collect(),
            pillars: self.pillars.values().cloned().collect(),
            items: self.items.values().cloned().collect(),
        }
    }
}
