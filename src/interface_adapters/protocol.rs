// Wire protocol DTOs and conversions for the public WebSocket.
//
// Every frame is `{"type": <event>, "data": {...}}` with camelCase payload fields.

use crate::domain::tuning::weapons::weapon_table;
use crate::domain::{
    Container, ContainerContent, ContainerId, DamageReport, Direction, DroppedItem, FullState,
    GameTuning, Inventory, ItemId, ItemKind, MovementUpdate, Pillar, Player, PlayerId, Projectile,
    ProjectileId, WeaponKind, WeaponSlot, WorldSnapshot,
};
use crate::domain::tuning::WeaponSpec;
use crate::use_cases::{ClientCommand, ServerEvent};
use serde::{Deserialize, Serialize};

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "player:move")]
    Move(MovePayload),
    #[serde(rename = "weapon_switch")]
    WeaponSwitch(WeaponPayload),
    #[serde(rename = "shoot")]
    Shoot(ShootPayload),
    #[serde(rename = "hit")]
    Hit(HitPayload),
    #[serde(rename = "heal")]
    Heal(HealPayload),
    // `data` may be `{}`, `null` or absent.
    #[serde(rename = "respawn")]
    Respawn(Option<EmptyPayload>),
    #[serde(rename = "pickup_item")]
    PickupItem(PickupPayload),
    #[serde(rename = "box_damage")]
    BoxDamage(BoxDamagePayload),
    #[serde(rename = "reload")]
    Reload(WeaponPayload),
    #[serde(rename = "bullet_destroyed")]
    BulletDestroyed(BulletPayload),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub direction: Option<Direction>,
    pub is_moving: Option<bool>,
    pub rotation: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponPayload {
    pub weapon: WeaponKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShootPayload {
    pub weapon: WeaponKind,
    #[serde(default)]
    pub angle: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPayload {
    pub bullet_id: ProjectileId,
    pub target_id: PlayerId,
    #[serde(default)]
    pub damage: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealPayload {
    pub amount: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPayload {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDamagePayload {
    pub box_id: ContainerId,
    #[serde(default)]
    pub damage: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletPayload {
    pub bullet_id: ProjectileId,
}

impl From<ClientMessage> for ClientCommand {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Move(p) => ClientCommand::Move(MovementUpdate {
                x: p.x,
                y: p.y,
                rotation: p.rotation,
                direction: p.direction,
                is_moving: p.is_moving,
            }),
            ClientMessage::WeaponSwitch(p) => ClientCommand::WeaponSwitch { weapon: p.weapon },
            ClientMessage::Shoot(p) => ClientCommand::Shoot {
                weapon: p.weapon,
                angle: p.angle,
            },
            ClientMessage::Hit(p) => ClientCommand::Hit {
                projectile_id: p.bullet_id,
                target_id: p.target_id,
                damage: p.damage,
            },
            ClientMessage::Heal(p) => ClientCommand::Heal { amount: p.amount },
            ClientMessage::Respawn(_) => ClientCommand::Respawn,
            ClientMessage::PickupItem(p) => ClientCommand::PickupItem { item_id: p.item_id },
            ClientMessage::BoxDamage(p) => ClientCommand::BoxDamage {
                container_id: p.box_id,
                damage: p.damage,
            },
            ClientMessage::Reload(p) => ClientCommand::Reload { weapon: p.weapon },
            ClientMessage::BulletDestroyed(p) => ClientCommand::BulletDestroyed {
                projectile_id: p.bullet_id,
            },
        }
    }
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init(Box<InitDto>),
    #[serde(rename = "player_joined")]
    PlayerJoined(PlayerDto),
    #[serde(rename = "player:moved")]
    PlayerMoved(PlayerMovedDto),
    #[serde(rename = "weapon_changed", rename_all = "camelCase")]
    WeaponChanged { player_id: PlayerId, weapon: WeaponKind },
    #[serde(rename = "state")]
    State(StateDto),
    #[serde(rename = "bullets", rename_all = "camelCase")]
    Bullets {
        player_id: PlayerId,
        bullets: Vec<BulletDto>,
    },
    #[serde(rename = "damage")]
    Damage(DamageDto),
    #[serde(rename = "player_died", rename_all = "camelCase")]
    PlayerDied { player_id: PlayerId, killer_id: PlayerId },
    #[serde(rename = "player_respawned", rename_all = "camelCase")]
    PlayerRespawned {
        player_id: PlayerId,
        x: f32,
        y: f32,
        hp: i32,
    },
    #[serde(rename = "player_healed", rename_all = "camelCase")]
    PlayerHealed {
        player_id: PlayerId,
        hp: i32,
        max_hp: i32,
    },
    #[serde(rename = "item_picked", rename_all = "camelCase")]
    ItemPicked { item_id: ItemId, player_id: PlayerId },
    #[serde(rename = "inventory_update", rename_all = "camelCase")]
    InventoryUpdate {
        inventory: InventoryDto,
        current_weapon: WeaponKind,
    },
    #[serde(rename = "box_damaged", rename_all = "camelCase")]
    BoxDamaged {
        box_id: ContainerId,
        hp: i32,
        is_destroyed: bool,
    },
    #[serde(rename = "item_dropped")]
    ItemDropped(ItemDto),
    #[serde(rename = "reload_complete")]
    ReloadComplete(AmmoDto),
    #[serde(rename = "ammo_update")]
    AmmoUpdate(AmmoDto),
    #[serde(rename = "bullet_destroyed", rename_all = "camelCase")]
    BulletDestroyed {
        bullet_id: ProjectileId,
        player_id: PlayerId,
    },
    #[serde(rename = "player_left", rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },
}

/// Everything a joining client needs to render the arena.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDto {
    pub player_id: PlayerId,
    pub player: PlayerDto,
    pub players: Vec<PlayerDto>,
    pub boxes: Vec<BoxDto>,
    pub pillars: Vec<PillarDto>,
    pub items: Vec<ItemDto>,
    pub config: ConfigDto,
}

impl From<FullState> for InitDto {
    fn from(full: FullState) -> Self {
        Self {
            player_id: full.player.id,
            player: PlayerDto::from(&full.player),
            players: full.others.iter().map(PlayerDto::from).collect(),
            boxes: full.layout.containers.iter().map(BoxDto::from).collect(),
            pillars: full.layout.pillars.iter().map(PillarDto::from).collect(),
            items: full.layout.items.iter().map(ItemDto::from).collect(),
            config: ConfigDto::from(full.tuning),
        }
    }
}

/// Gameplay tuning plus the canonical weapon table.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDto {
    #[serde(flatten)]
    pub tuning: GameTuning,
    pub weapons: &'static [WeaponSpec],
}

impl From<GameTuning> for ConfigDto {
    fn from(tuning: GameTuning) -> Self {
        Self {
            tuning,
            weapons: weapon_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub direction: Direction,
    pub is_moving: bool,
    pub hp: i32,
    pub max_hp: i32,
    pub is_dead: bool,
    pub current_weapon: WeaponKind,
    pub inventory: InventoryDto,
}

impl From<&Player> for PlayerDto {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            x: p.position.x,
            y: p.position.y,
            rotation: p.rotation,
            direction: p.direction,
            is_moving: p.is_moving,
            hp: p.hp,
            max_hp: p.max_hp,
            is_dead: !p.is_alive(),
            current_weapon: p.current_weapon,
            inventory: InventoryDto::from(&p.inventory),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponSlotDto {
    pub weapon: WeaponKind,
    pub magazine: u32,
    pub reserve: u32,
}

impl From<&WeaponSlot> for WeaponSlotDto {
    fn from(slot: &WeaponSlot) -> Self {
        Self {
            weapon: slot.kind,
            magazine: slot.magazine,
            reserve: slot.reserve,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryDto {
    pub primary: Option<WeaponSlotDto>,
    pub pistol: Option<WeaponSlotDto>,
    pub healing: u32,
}

impl From<&Inventory> for InventoryDto {
    fn from(inv: &Inventory) -> Self {
        Self {
            primary: inv.primary.as_ref().map(WeaponSlotDto::from),
            pistol: inv.pistol.as_ref().map(WeaponSlotDto::from),
            healing: inv.healing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDto {
    pub id: ContainerId,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub is_destroyed: bool,
    /// `"healing"` or the weapon id of the loot inside.
    pub content: String,
}

impl From<&Container> for BoxDto {
    fn from(c: &Container) -> Self {
        let content = match c.content {
            ContainerContent::Weapon(kind) => weapon_name(kind),
            ContainerContent::Healing => "healing".to_string(),
        };
        Self {
            id: c.id,
            x: c.position.x,
            y: c.position.y,
            radius: c.radius,
            hp: c.hp,
            max_hp: c.max_hp,
            is_destroyed: c.destroyed,
            content,
        }
    }
}

fn weapon_name(kind: WeaponKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct PillarDto {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl From<&Pillar> for PillarDto {
    fn from(p: &Pillar) -> Self {
        Self {
            id: p.id,
            x: p.position.x,
            y: p.position.y,
            radius: p.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    /// `"weapon"` or `"healing"`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magazine: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve: Option<u32>,
    pub spawned_at: u64,
}

impl From<&DroppedItem> for ItemDto {
    fn from(item: &DroppedItem) -> Self {
        let (kind, weapon, magazine, reserve) = match item.kind {
            ItemKind::Weapon {
                kind,
                magazine,
                reserve,
            } => ("weapon", Some(kind), Some(magazine), Some(reserve)),
            ItemKind::Healing => ("healing", None, None, None),
        };
        Self {
            id: item.id,
            x: item.position.x,
            y: item.position.y,
            kind,
            weapon,
            magazine,
            reserve,
            spawned_at: item.spawned_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovedDto {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub direction: Direction,
    pub is_moving: bool,
}

/// Per-tick snapshot of living players.
#[derive(Debug, Clone, Serialize)]
pub struct StateDto {
    pub players: Vec<PlayerStateDto>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub hp: i32,
}

impl From<WorldSnapshot> for StateDto {
    fn from(snapshot: WorldSnapshot) -> Self {
        Self {
            players: snapshot
                .players
                .into_iter()
                .map(|p| PlayerStateDto {
                    id: p.id,
                    x: p.x,
                    y: p.y,
                    rotation: p.rotation,
                    hp: p.hp,
                })
                .collect(),
            timestamp: snapshot.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletDto {
    pub id: ProjectileId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    pub damage: i32,
    pub weapon: WeaponKind,
    pub range: f32,
    pub speed: f32,
}

impl From<&Projectile> for BulletDto {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            x: p.origin.x,
            y: p.origin.y,
            vx: p.vx,
            vy: p.vy,
            rotation: p.rotation,
            damage: p.damage,
            weapon: p.weapon,
            range: p.range,
            speed: p.speed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageDto {
    pub target_id: PlayerId,
    pub attacker_id: PlayerId,
    pub damage: i32,
    pub hp: i32,
    pub killed: bool,
}

impl From<DamageReport> for DamageDto {
    fn from(r: DamageReport) -> Self {
        Self {
            target_id: r.target_id,
            attacker_id: r.attacker_id,
            damage: r.damage,
            hp: r.hp,
            killed: r.killed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AmmoDto {
    pub weapon: WeaponKind,
    pub magazine: u32,
    pub reserve: u32,
}

impl From<ServerEvent> for ServerMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Init(full) => ServerMessage::Init(Box::new(InitDto::from(*full))),
            ServerEvent::PlayerJoined(player) => {
                ServerMessage::PlayerJoined(PlayerDto::from(&*player))
            }
            ServerEvent::PlayerMoved {
                player_id,
                position,
                rotation,
                direction,
                is_moving,
            } => ServerMessage::PlayerMoved(PlayerMovedDto {
                id: player_id,
                x: position.x,
                y: position.y,
                rotation,
                direction,
                is_moving,
            }),
            ServerEvent::WeaponChanged { player_id, weapon } => {
                ServerMessage::WeaponChanged { player_id, weapon }
            }
            ServerEvent::State(snapshot) => ServerMessage::State(StateDto::from(snapshot)),
            ServerEvent::Bullets {
                player_id,
                projectiles,
            } => ServerMessage::Bullets {
                player_id,
                bullets: projectiles.iter().map(BulletDto::from).collect(),
            },
            ServerEvent::Damage(report) => ServerMessage::Damage(DamageDto::from(report)),
            ServerEvent::PlayerDied {
                player_id,
                killer_id,
            } => ServerMessage::PlayerDied {
                player_id,
                killer_id,
            },
            ServerEvent::PlayerRespawned {
                player_id,
                position,
                hp,
            } => ServerMessage::PlayerRespawned {
                player_id,
                x: position.x,
                y: position.y,
                hp,
            },
            ServerEvent::PlayerHealed {
                player_id,
                hp,
                max_hp,
            } => ServerMessage::PlayerHealed {
                player_id,
                hp,
                max_hp,
            },
            ServerEvent::ItemPicked { item_id, player_id } => {
                ServerMessage::ItemPicked { item_id, player_id }
            }
            ServerEvent::InventoryUpdate {
                inventory,
                current_weapon,
            } => ServerMessage::InventoryUpdate {
                inventory: InventoryDto::from(&inventory),
                current_weapon,
            },
            ServerEvent::BoxDamaged {
                container_id,
                hp,
                destroyed,
            } => ServerMessage::BoxDamaged {
                box_id: container_id,
                hp,
                is_destroyed: destroyed,
            },
            ServerEvent::ItemDropped(item) => ServerMessage::ItemDropped(ItemDto::from(&item)),
            ServerEvent::ReloadComplete {
                weapon,
                magazine,
                reserve,
            } => ServerMessage::ReloadComplete(AmmoDto {
                weapon,
                magazine,
                reserve,
            }),
            ServerEvent::AmmoUpdate {
                weapon,
                magazine,
                reserve,
            } => ServerMessage::AmmoUpdate(AmmoDto {
                weapon,
                magazine,
                reserve,
            }),
            ServerEvent::BulletDestroyed {
                projectile_id,
                player_id,
            } => ServerMessage::BulletDestroyed {
                bullet_id: projectile_id,
                player_id,
            },
            ServerEvent::PlayerLeft { player_id } => ServerMessage::PlayerLeft { player_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, WorldState};
    use serde_json::{Value, json};

    fn command(raw: &str) -> ClientCommand {
        serde_json::from_str::<ClientMessage>(raw)
            .expect("valid client message")
            .into()
    }

    #[test]
    fn when_move_message_arrives_then_absent_fields_stay_unset() {
        let cmd = command(r#"{"type":"player:move","data":{"x":12.5,"y":40,"isMoving":true}}"#);
        assert_eq!(
            cmd,
            ClientCommand::Move(MovementUpdate {
                x: Some(12.5),
                y: Some(40.0),
                is_moving: Some(true),
                ..MovementUpdate::default()
            })
        );
    }

    #[test]
    fn when_hit_message_arrives_then_structured_bullet_id_is_parsed() {
        let raw = r#"{"type":"hit","data":{
            "bulletId":{"ownerId":3,"sequence":9},"targetId":4,"damage":20}}"#;
        let cmd = command(raw);
        assert_eq!(
            cmd,
            ClientCommand::Hit {
                projectile_id: ProjectileId {
                    owner_id: 3,
                    sequence: 9
                },
                target_id: 4,
                damage: 20,
            }
        );
    }

    #[test]
    fn when_respawn_and_shoot_arrive_then_they_map_to_commands() {
        assert_eq!(command(r#"{"type":"respawn","data":{}}"#), ClientCommand::Respawn);
        assert_eq!(command(r#"{"type":"respawn"}"#), ClientCommand::Respawn);
        assert_eq!(command(r#"{"type":"respawn","data":null}"#), ClientCommand::Respawn);
        assert_eq!(
            command(r#"{"type":"shoot","data":{"weapon":"SHOTGUN","angle":1.5}}"#),
            ClientCommand::Shoot {
                weapon: WeaponKind::Shotgun,
                angle: 1.5
            }
        );
    }

    #[test]
    fn when_message_type_is_unknown_then_parsing_fails() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"teleport","data":{}}"#).is_err());
        assert!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"shoot","data":{"weapon":"LASER"}}"#)
                .is_err()
        );
    }

    #[test]
    fn when_damage_is_serialized_then_payload_uses_camel_case_fields() {
        let msg = ServerMessage::from(ServerEvent::Damage(DamageReport {
            target_id: 2,
            attacker_id: 1,
            damage: 20,
            hp: 80,
            killed: false,
        }));
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "damage",
                "data": {"targetId": 2, "attackerId": 1, "damage": 20, "hp": 80, "killed": false}
            })
        );
    }

    #[test]
    fn when_player_moves_then_event_name_keeps_colon() {
        let msg = ServerMessage::from(ServerEvent::PlayerMoved {
            player_id: 5,
            position: Position::new(1.0, 2.0),
            rotation: 0.5,
            direction: Direction::Left,
            is_moving: true,
        });
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["type"], "player:moved");
        assert_eq!(value["data"]["direction"], "left");
        assert_eq!(value["data"]["isMoving"], true);
    }

    #[test]
    fn when_init_is_serialized_then_it_carries_layout_and_weapon_table() {
        let mut world = WorldState::seeded(GameTuning::default(), 8);
        world.add_player(1);
        let full = world.full_state(1).expect("full state");

        let value: Value = serde_json::to_value(ServerMessage::from(ServerEvent::Init(Box::new(
            full,
        ))))
        .expect("serialize");

        assert_eq!(value["type"], "init");
        let data = &value["data"];
        assert_eq!(data["playerId"], 1);
        assert_eq!(data["boxes"].as_array().map(Vec::len), Some(26));
        assert_eq!(data["pillars"].as_array().map(Vec::len), Some(12));
        assert_eq!(data["config"]["weapons"].as_array().map(Vec::len), Some(5));
        assert_eq!(data["config"]["map"]["size"], 3000.0);
        assert_eq!(data["config"]["weapons"][1]["id"], "PISTOL");
        assert_eq!(data["player"]["currentWeapon"], "FIST");
    }
}
