// Framework bootstrap for the arena server runtime.

use crate::domain::{GameTuning, SystemClock, WorldState};
use crate::frameworks::config;
use crate::interface_adapters::http::health_handler;
use crate::interface_adapters::net::{ConnectionHub, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Gateway, world_task};

use axum::{Router, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc, time::Instant};
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;

pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let (state, world) = build_state(shutdown.clone());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.notify_one();
        })
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    if let Err(e) = world.await {
        tracing::error!(error = %e, "world task panicked");
    }
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(shutdown: Arc<Notify>) -> (Arc<AppState>, JoinHandle<()>) {
    let tuning = GameTuning {
        tick_rate: config::tick_rate(),
        ..GameTuning::default()
    };

    let rng = match config::world_seed() {
        Some(seed) => {
            tracing::info!(seed, "using fixed world seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let gateway = Gateway::new(WorldState::new(tuning, rng), SystemClock);

    // input_tx/rx: every connection's commands go to the single world task.
    let (input_tx, input_rx) = mpsc::channel(config::INPUT_CHANNEL_CAPACITY);
    let (player_count_tx, player_count_rx) = watch::channel(0usize);
    let hub = ConnectionHub::new();

    // The world task is the only owner of game state.
    let world = tokio::spawn(world_task(
        gateway,
        input_rx,
        hub.clone(),
        player_count_tx,
        config::tick_interval(tuning.tick_rate),
        shutdown,
    ));
    tracing::debug!(tick_rate = tuning.tick_rate, "world task started");

    let state = Arc::new(AppState {
        input_tx,
        hub,
        outbox_capacity: config::OUTBOX_CAPACITY,
        player_count_rx,
        started_at: Instant::now(),
    });
    (state, world)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received; draining");
}
