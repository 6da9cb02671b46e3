use crate::domain::ConnectionId;
use crate::interface_adapters::net::hub::ConnectionHub;
use crate::interface_adapters::protocol::ClientMessage;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_connection_id;
use crate::use_cases::{ClientCommand, GameEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    InputClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let input_tx = state.input_tx.clone();
    let hub = state.hub.clone();
    let outbox_capacity = state.outbox_capacity;
    ws.on_upgrade(move |socket| handle_socket(socket, input_tx, hub, outbox_capacity))
}

async fn handle_socket(
    socket: WebSocket,
    input_tx: mpsc::Sender<GameEvent>,
    hub: ConnectionHub,
    outbox_capacity: usize,
) {
    let conn_id = next_connection_id();
    let span = info_span!("conn", conn_id);
    run_connection(socket, conn_id, input_tx, hub, outbox_capacity)
        .instrument(span)
        .await;
}

async fn run_connection(
    mut socket: WebSocket,
    conn_id: ConnectionId,
    input_tx: mpsc::Sender<GameEvent>,
    hub: ConnectionHub,
    outbox_capacity: usize,
) {
    // Attach the outbox before announcing the connection so the `init` reply has somewhere to go.
    let (outbox_tx, outbox_rx) = mpsc::channel::<Utf8Bytes>(outbox_capacity.max(1));
    hub.attach(conn_id, outbox_tx);

    if input_tx
        .send(GameEvent::Connect {
            connection_id: conn_id,
        })
        .await
        .is_err()
    {
        warn!("world task unavailable; refusing connection");
        hub.detach(conn_id);
        let _ =
            send_close_with_reason(&mut socket, close_code::AGAIN, "server shutting down").await;
        return;
    }
    info!("client connected");

    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        conn_id,
        input_tx,
        outbox_rx,
        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,
        invalid_json: 0,
        last_input_full_log: now,
        last_invalid_input_log: now,
        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    disconnect_cleanup(&ctx, &hub).await;
}

struct ConnCtx {
    pub conn_id: ConnectionId,
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized messages addressed to this connection by the world task.
    pub outbox_rx: mpsc::Receiver<Utf8Bytes>,
    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub invalid_json: u32,
    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,
    pub close_frame: Option<CloseFrame>,
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn forward_command(
    conn_id: ConnectionId,
    input_tx: &mpsc::Sender<GameEvent>,
    command: ClientCommand,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match input_tx.try_send(GameEvent::Command {
        connection_id: conn_id,
        command,
    }) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!(conn_id, "input channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        conn_id,
        input_tx,
        outbox_rx,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_input_full_log,
        last_invalid_input_log,
        close_frame,
    } = ctx;
    let conn_id = *conn_id;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    conn_id,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }
            outgoing = outbox_rx.recv() => {
                match outgoing {
                    Some(bytes) => match forward_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        // The hub dropped our outbox; nothing more will be delivered.
                        debug!(conn_id, "outbox closed; disconnecting");
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    conn_id: ConnectionId,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => forward_command(conn_id, input_tx, msg.into(), last_input_full_log),
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                conn_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(conn_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(conn_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_bytes(
    bytes: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send message");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx, hub: &ConnectionHub) {
    if ctx
        .input_tx
        .send(GameEvent::Disconnect {
            connection_id: ctx.conn_id,
        })
        .await
        .is_err()
    {
        debug!(conn_id = ctx.conn_id, "world task gone before disconnect");
    }
    hub.detach(ctx.conn_id);

    debug!(
        conn_id = ctx.conn_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!(conn_id = ctx.conn_id, "client disconnected");
}
