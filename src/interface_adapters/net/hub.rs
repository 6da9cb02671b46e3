// Fan-out of world task output to per-connection outboxes.

use crate::domain::ConnectionId;
use crate::interface_adapters::protocol::ServerMessage;
use crate::use_cases::{Audience, Outbound, Publisher};

use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error};

/// Registry of connection outboxes. The lock is never held across an await.
#[derive(Clone, Default)]
pub struct ConnectionHub {
    sinks: Arc<RwLock<HashMap<ConnectionId, mpsc::Sender<Utf8Bytes>>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, connection_id: ConnectionId, outbox: mpsc::Sender<Utf8Bytes>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection_id, outbox);
    }

    pub fn detach(&self, connection_id: ConnectionId) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection_id);
    }

    pub fn len(&self) -> usize {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn deliver(&self, audience: Audience, bytes: Utf8Bytes) {
        let sinks = self.sinks.read().unwrap_or_else(PoisonError::into_inner);
        match audience {
            Audience::Only(connection_id) => {
                if let Some(outbox) = sinks.get(&connection_id) {
                    try_deliver(connection_id, outbox, bytes);
                }
            }
            Audience::All | Audience::AllExcept(_) => {
                for (&connection_id, outbox) in sinks.iter() {
                    if audience.includes(connection_id) {
                        try_deliver(connection_id, outbox, bytes.clone());
                    }
                }
            }
        }
    }
}

fn try_deliver(connection_id: ConnectionId, outbox: &mpsc::Sender<Utf8Bytes>, bytes: Utf8Bytes) {
    match outbox.try_send(bytes) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            debug!(connection_id, "outbox full; dropping message");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(connection_id, "outbox closed; dropping message");
        }
    }
}

impl Publisher for ConnectionHub {
    fn publish(&self, outbound: Vec<Outbound>) {
        for Outbound { audience, event } in outbound {
            // Serialize once; every recipient shares the same bytes.
            let msg = ServerMessage::from(event);
            let txt = match serde_json::to_string(&msg) {
                Ok(txt) => txt,
                Err(e) => {
                    error!(error = ?e, "failed to serialize server message");
                    continue;
                }
            };
            self.deliver(audience, Utf8Bytes::from(txt));
        }
    }
}
