// Single source of truth for players, obstacles, and projectiles.

use crate::domain::errors::Rejection;
use crate::domain::map::{Position, SpatialMap, push_out_of};
use crate::domain::obstacles::{
    ContainerDamage, ContainerId, DroppedItem, ItemId, ObstacleDirectory, WorldLayout,
};
use crate::domain::player::{ConnectionId, MovementUpdate, Player, PlayerId};
use crate::domain::projectiles::ProjectileRegistry;
use crate::domain::tuning::GameTuning;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Rounded per-player entry in the periodic snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub hp: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub timestamp: u64,
}

/// Everything a newly joined connection needs.
#[derive(Debug, Clone)]
pub struct FullState {
    pub player: Player,
    pub others: Vec<Player>,
    pub layout: WorldLayout,
    pub tuning: GameTuning,
}

pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

pub struct WorldState {
    tuning: GameTuning,
    map: SpatialMap,
    players: HashMap<ConnectionId, Player>,
    connections: HashMap<PlayerId, ConnectionId>,
    obstacles: ObstacleDirectory,
    projectiles: ProjectileRegistry,
    next_player_id: PlayerId,
    rng: StdRng,
}

impl WorldState {
    /// Builds a world and places its initial obstacles.
    pub fn new(tuning: GameTuning, rng: StdRng) -> Self {
        let mut world = Self {
            tuning,
            map: SpatialMap::new(tuning.map),
            players: HashMap::new(),
            connections: HashMap::new(),
            obstacles: ObstacleDirectory::new(tuning.obstacles),
            projectiles: ProjectileRegistry::new(),
            next_player_id: 1,
            rng,
        };
        let map = world.map;
        world
            .obstacles
            .place_initial_obstacles(&map, &[], &mut world.rng);
        world
    }

    pub fn seeded(tuning: GameTuning, seed: u64) -> Self {
        Self::new(tuning, StdRng::seed_from_u64(seed))
    }

    /// A world with no obstacles, for scenarios that place their own.
    pub fn empty(tuning: GameTuning, seed: u64) -> Self {
        Self {
            tuning,
            map: SpatialMap::new(tuning.map),
            players: HashMap::new(),
            connections: HashMap::new(),
            obstacles: ObstacleDirectory::new(tuning.obstacles),
            projectiles: ProjectileRegistry::new(),
            next_player_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn map(&self) -> &SpatialMap {
        &self.map
    }

    pub fn obstacles(&self) -> &ObstacleDirectory {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleDirectory {
        &mut self.obstacles
    }

    pub fn projectiles(&self) -> &ProjectileRegistry {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut ProjectileRegistry {
        &mut self.projectiles
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Spawns a player for a new connection, replacing any player already bound to it.
    pub fn add_player(&mut self, connection_id: ConnectionId) -> &Player {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let position = self
            .map
            .random_position_with_margin(&mut self.rng, self.tuning.player.spawn_margin);
        let player = Player::new(id, connection_id, position, &self.tuning.player);

        if let Some(previous) = self.players.insert(connection_id, player) {
            self.connections.remove(&previous.id);
        }
        self.connections.insert(id, connection_id);
        &self.players[&connection_id]
    }

    pub fn remove_player(&mut self, connection_id: ConnectionId) -> Option<Player> {
        let player = self.players.remove(&connection_id)?;
        self.connections.remove(&player.id);
        self.projectiles.remove_owned_by(player.id);
        Some(player)
    }

    pub fn player_by_connection(&self, connection_id: ConnectionId) -> Option<&Player> {
        self.players.get(&connection_id)
    }

    pub fn player_by_connection_mut(&mut self, connection_id: ConnectionId) -> Option<&mut Player> {
        self.players.get_mut(&connection_id)
    }

    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.connections
            .get(&id)
            .and_then(|conn| self.players.get(conn))
    }

    pub fn player_by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        let conn = *self.connections.get(&id)?;
        self.players.get_mut(&conn)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_alive())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Applies a movement report with map clamping and obstacle push-out.
    pub fn move_player(
        &mut self,
        connection_id: ConnectionId,
        update: MovementUpdate,
    ) -> Option<&Player> {
        let player = self.players.get_mut(&connection_id)?;
        player.update_position(update, &self.map, self.obstacles.blocking_circles());
        Some(player)
    }

    pub fn pickup_item(
        &mut self,
        connection_id: ConnectionId,
        item_id: ItemId,
    ) -> Result<DroppedItem, Rejection> {
        let player = self
            .players
            .get_mut(&connection_id)
            .ok_or(Rejection::UnknownPlayer)?;
        self.obstacles
            .pickup_item(item_id, player, self.tuning.player.max_healing_stack)
    }

    pub fn damage_container(
        &mut self,
        container_id: ContainerId,
        amount: i32,
        now_ms: u64,
    ) -> Option<ContainerDamage> {
        self.obstacles
            .damage_container(container_id, amount, now_ms, &mut self.rng)
    }

    /// Random point in the square of `respawn_radius` around the map center, pushed clear
    /// of obstacles.
    pub fn respawn_position(&mut self) -> Position {
        let center = self.map.center();
        let r = self.tuning.player.respawn_radius;
        let radius = self.tuning.player.radius;
        let candidate = Position::new(
            center.x + self.rng.gen_range(-r..=r),
            center.y + self.rng.gen_range(-r..=r),
        );
        let clamped = self.map.clamp(candidate, radius);
        push_out_of(clamped, radius, self.obstacles.blocking_circles())
    }

    pub fn tick(&mut self, dt: f32) {
        self.projectiles.tick(dt);
    }

    pub fn snapshot(&self, now_ms: u64) -> WorldSnapshot {
        let mut players: Vec<PlayerSnapshot> = self
            .alive_players()
            .map(|p| PlayerSnapshot {
                id: p.id,
                x: round2(p.position.x),
                y: round2(p.position.y),
                rotation: round2(p.rotation),
                hp: p.hp,
            })
            .collect();
        players.sort_by_key(|p| p.id);
        WorldSnapshot {
            players,
            timestamp: now_ms,
        }
    }

    pub fn full_state(&self, connection_id: ConnectionId) -> Option<FullState> {
        let player = self.players.get(&connection_id)?.clone();
        let mut others: Vec<Player> = self
            .players
            .values()
            .filter(|p| p.connection_id != connection_id)
            .cloned()
            .collect();
        others.sort_by_key(|p| p.id);
        Some(FullState {
            player,
            others,
            layout: self.obstacles.snapshot_all(),
            tuning: self.tuning,
        })
    }
}
