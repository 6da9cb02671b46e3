// Use cases layer: application workflows for the game server.

pub mod game;
pub mod gateway;
pub mod reload;
pub mod types;

pub use game::{Publisher, world_task};
pub use gateway::Gateway;
pub use reload::ReloadScheduler;
pub use types::{Audience, ClientCommand, GameEvent, Outbound, ServerEvent};
