// Use-case level inputs/outputs for the world task.

use crate::domain::{
    ConnectionId, ContainerId, DamageReport, Direction, DroppedItem, FullState, Inventory,
    ItemId, MovementUpdate, Player, PlayerId, Position, Projectile, ProjectileId, WeaponKind,
    WorldSnapshot,
};

#[derive(Debug, Clone)]
pub enum GameEvent {
    Connect {
        connection_id: ConnectionId,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Command {
        connection_id: ConnectionId,
        command: ClientCommand,
    },
}

/// A validated-shape request from a connected client; game rules are checked by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Move(MovementUpdate),
    WeaponSwitch {
        weapon: WeaponKind,
    },
    Shoot {
        weapon: WeaponKind,
        angle: f32,
    },
    Hit {
        projectile_id: ProjectileId,
        target_id: PlayerId,
        damage: i32,
    },
    /// `None` heals the full per-item amount.
    Heal {
        amount: Option<i32>,
    },
    Respawn,
    PickupItem {
        item_id: ItemId,
    },
    BoxDamage {
        container_id: ContainerId,
        damage: i32,
    },
    Reload {
        weapon: WeaponKind,
    },
    BulletDestroyed {
        projectile_id: ProjectileId,
    },
}

#[derive(Debug, Clone)]
pub enum ServerEvent {
    Init(Box<FullState>),
    PlayerJoined(Box<Player>),
    PlayerMoved {
        player_id: PlayerId,
        position: Position,
        rotation: f32,
        direction: Direction,
        is_moving: bool,
    },
    WeaponChanged {
        player_id: PlayerId,
        weapon: WeaponKind,
    },
    State(WorldSnapshot),
    Bullets {
        player_id: PlayerId,
        projectiles: Vec<Projectile>,
    },
    Damage(DamageReport),
    PlayerDied {
        player_id: PlayerId,
        killer_id: PlayerId,
    },
    PlayerRespawned {
        player_id: PlayerId,
        position: Position,
        hp: i32,
    },
    PlayerHealed {
        player_id: PlayerId,
        hp: i32,
        max_hp: i32,
    },
    ItemPicked {
        item_id: ItemId,
        player_id: PlayerId,
    },
    InventoryUpdate {
        inventory: Inventory,
        current_weapon: WeaponKind,
    },
    BoxDamaged {
        container_id: ContainerId,
        hp: i32,
        destroyed: bool,
    },
    ItemDropped(DroppedItem),
    ReloadComplete {
        weapon: WeaponKind,
        magazine: u32,
        reserve: u32,
    },
    AmmoUpdate {
        weapon: WeaponKind,
        magazine: u32,
        reserve: u32,
    },
    BulletDestroyed {
        projectile_id: ProjectileId,
        player_id: PlayerId,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Only(ConnectionId),
    All,
    AllExcept(ConnectionId),
}

impl Audience {
    pub fn includes(self, connection_id: ConnectionId) -> bool {
        match self {
            Audience::Only(target) => target == connection_id,
            Audience::All => true,
            Audience::AllExcept(excluded) => excluded != connection_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Outbound {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn only(connection_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            audience: Audience::Only(connection_id),
            event,
        }
    }

    pub fn all(event: ServerEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn all_except(connection_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            audience: Audience::AllExcept(connection_id),
            event,
        }
    }
}
