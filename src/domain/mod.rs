pub mod combat;
pub mod errors;
pub mod map;
pub mod obstacles;
pub mod player;
pub mod ports;
pub mod projectiles;
pub mod tuning;
pub mod world;

pub use combat::{CombatValidator, DamageReport, FireOutcome, HitLedger, MeleeHit};
pub use errors::{Rejection, RejectionKind};
pub use map::{Circle, Position, SpatialMap};
pub use obstacles::{
    Container, ContainerContent, ContainerDamage, ContainerId, DroppedItem, ItemId, ItemKind,
    ObstacleDirectory, ObstacleHit, Pillar, PillarId, WorldLayout,
};
pub use player::{
    ConnectionId, Direction, Inventory, LifeState, MovementUpdate, Player, PlayerId, WeaponSlot,
};
pub use ports::{Clock, ManualClock, SystemClock};
pub use projectiles::{Projectile, ProjectileId, ProjectileRegistry};
pub use tuning::{GameTuning, WeaponKind};
pub use world::{FullState, PlayerSnapshot, WorldSnapshot, WorldState};
