// Network adapter modules: the WebSocket connection loop and the outbox hub behind it.

pub mod client;
pub mod hub;

pub use client::ws_handler;
pub use hub::ConnectionHub;
