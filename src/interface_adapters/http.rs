// Plain HTTP endpoints next to the WebSocket route.

use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players: usize,
    /// Seconds since the server started.
    pub uptime: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        players: *state.player_count_rx.borrow(),
        uptime: state.started_at.elapsed().as_secs(),
    })
}
