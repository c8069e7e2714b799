use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use agent_application::commands::block_commands;
use agent_application::queries::ops_queries;
use agent_application::AppState;

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.backend.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}

pub async fn get_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ops_queries::PendingDepths>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let depths = ops_queries::pending_depths(&state).await?;
    Ok(Json(depths))
}

#[derive(Serialize)]
pub struct FlushResult {
    pub flushed: usize,
}

pub async fn flush_pending_blocks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FlushResult>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let flushed = block_commands::flush_pending_blocks_now(&state).await?;
    Ok(Json(FlushResult { flushed }))
}

pub async fn get_player_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(xuid): Path<String>,
) -> Result<Json<ops_queries::LinkStateView>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    match ops_queries::link_state_for_xuid(&state, &xuid).await? {
        Some(view) => Ok(Json(view)),
        None => Err(HttpError::NotFound),
    }
}

pub async fn list_players(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ops_queries::OnlinePlayerView>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let players = ops_queries::online_players(&state).await?;
    Ok(Json(players))
}
