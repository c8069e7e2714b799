use axum::Router;

use agent_application::AppState;

use crate::handlers::ops_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .route(
            "/v1/ops/pending",
            axum::routing::get(ops_handlers::get_pending),
        )
        .route(
            "/v1/ops/pending/blocks/flush",
            axum::routing::post(ops_handlers::flush_pending_blocks),
        )
        .route(
            "/v1/ops/players",
            axum::routing::get(ops_handlers::list_players),
        )
        .route(
            "/v1/ops/players/:xuid/link",
            axum::routing::get(ops_handlers::get_player_link),
        )
        .with_state(state)
}
