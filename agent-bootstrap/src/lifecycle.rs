use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use agent_application::commands::pickup_commands;
use agent_application::AppState;
use agent_domain::ports::GameHost;
use agent_infrastructure::SimGameHost;
use agent_interfaces_http::build_router;

use crate::context::AppContext;

/// Handle to an agent running on its own thread inside another process
/// (typically the game server plugin host).
pub struct AgentHandle {
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl AgentHandle {
    /// Shared application state. The embedding process uses this to feed
    /// host events into the agent: joins and leaves, chat messages and
    /// block breaks all go through the command functions with this state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

async fn run_poll_loop(state: AppState) {
    let mut ticker = tokio::time::interval(Duration::from_millis(state.config.poll_interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = pickup_commands::run_inventory_poll(&state).await {
            warn!("inventory poll failed: {}", err);
        }
    }
}

async fn run_sweep_loop(state: AppState) {
    let mut ticker = tokio::time::interval(Duration::from_secs(
        state.config.sweep_interval_seconds.max(1),
    ));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = pickup_commands::sweep_balance_deadlines(&state).await {
            warn!("balance sweep failed: {}", err);
        }
    }
}

fn spawn_background_tasks(state: &AppState) {
    tokio::spawn(run_poll_loop(state.clone()));
    tokio::spawn(run_sweep_loop(state.clone()));
}

/// Run against the in-memory world. Useful for soak testing the poll,
/// sweep and ops surface without a game server.
pub async fn run_standalone() -> Result<()> {
    run_with_host(Arc::new(SimGameHost::new())).await
}

pub async fn run_with_host(host: Arc<dyn GameHost>) -> Result<()> {
    let context = AppContext::new(host).await?;
    let state = context.state;

    spawn_background_tasks(&state);

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn start_embedded(
    config_path: impl AsRef<std::path::Path>,
    host: Arc<dyn GameHost>,
) -> Result<AgentHandle> {
    std::env::set_var(
        "MATSCRAFT_CONFIG",
        config_path.as_ref().to_string_lossy().to_string(),
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<AppState>>();
    let worker = std::thread::Builder::new()
        .name("matscraft-agent".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .thread_name("matscraft-agent-rt")
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = ready_tx.send(Err(err.into()));
                    return;
                }
            };

            runtime.block_on(async move {
                let context = match AppContext::new(host).await {
                    Ok(context) => context,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let state = context.state;
                let _ = ready_tx.send(Ok(state.clone()));
                if let Err(err) = serve_with_shutdown(state, shutdown_rx).await {
                    eprintln!("embedded agent exited: {err}");
                }
            });
        })?;

    match ready_rx.recv() {
        Ok(Ok(state)) => Ok(AgentHandle {
            state,
            shutdown_tx: Some(shutdown_tx),
            worker: Some(worker),
        }),
        Ok(Err(err)) => {
            let _ = worker.join();
            Err(err)
        }
        Err(_) => {
            let _ = worker.join();
            Err(anyhow::anyhow!("embedded agent thread exited during startup"))
        }
    }
}

async fn serve_with_shutdown(state: AppState, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
    spawn_background_tasks(&state);

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("embedded agent listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
