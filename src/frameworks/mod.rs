// Framework bootstrap: runtime config, tracing, and the HTTP/WebSocket server.

pub mod config;
pub mod server;
