use crate::interface_adapters::net::ConnectionHub;
use crate::use_cases::GameEvent;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Commands flowing from the network into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Per-connection outboxes fed by the world task.
    pub hub: ConnectionHub,
    // Bound on each connection's outbox; a full outbox drops messages.
    pub outbox_capacity: usize,
    // Connected player count, published by the world task.
    pub player_count_rx: watch::Receiver<usize>,
    pub started_at: Instant,
}
