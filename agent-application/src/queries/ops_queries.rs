use serde::Serialize;

use agent_domain::utils::current_millis;

use crate::{AppError, AppState};

/// Depth of every local queue, for the ops surface.
#[derive(Debug, Clone, Serialize)]
pub struct PendingDepths {
    pub pending_blocks: usize,
    pub pending_balances: usize,
    pub unsynced_mats: i64,
    pub unsynced_huh: i64,
    pub teleport_requests: usize,
}

pub async fn pending_depths(state: &AppState) -> Result<PendingDepths, AppError> {
    let blocks = state
        .store
        .load_pending_blocks()
        .await
        .map_err(AppError::Internal)?;
    let balances = state
        .store
        .list_pending_balances()
        .await
        .map_err(AppError::Internal)?;
    let requests = state
        .store
        .load_teleport_requests()
        .await
        .map_err(AppError::Internal)?;

    let now_ms = current_millis();
    Ok(PendingDepths {
        pending_blocks: blocks.len(),
        pending_balances: balances.iter().filter(|pending| !pending.is_empty()).count(),
        unsynced_mats: balances.iter().map(|pending| pending.mats).sum(),
        unsynced_huh: balances.iter().map(|pending| pending.huh).sum(),
        teleport_requests: requests
            .iter()
            .filter(|request| !request.is_expired(now_ms))
            .count(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkStateView {
    pub player_name: String,
    pub xuid: String,
    pub is_linked: bool,
    pub discord_username: Option<String>,
}

/// Look a player's link record up by XUID. Player names key the store, so
/// this scans; the ops surface is low-traffic enough for that.
pub async fn link_state_for_xuid(
    state: &AppState,
    xuid: &str,
) -> Result<Option<LinkStateView>, AppError> {
    let links = state
        .store
        .list_link_states()
        .await
        .map_err(AppError::Internal)?;
    Ok(links
        .into_iter()
        .find(|(_, link)| link.xuid == xuid)
        .map(|(player_name, link)| LinkStateView {
            player_name,
            xuid: link.xuid,
            is_linked: link.is_linked,
            discord_username: link.discord_username,
        }))
}

#[derive(Debug, Clone, Serialize)]
pub struct OnlinePlayerView {
    pub name: String,
    pub is_linked: bool,
}

pub async fn online_players(state: &AppState) -> Result<Vec<OnlinePlayerView>, AppError> {
    let links = state
        .store
        .list_link_states()
        .await
        .map_err(AppError::Internal)?;
    Ok(state
        .host
        .players()
        .into_iter()
        .map(|player| OnlinePlayerView {
            is_linked: links
                .get(&player.name)
                .map(|link| link.is_linked)
                .unwrap_or(false),
            name: player.name,
        })
        .collect())
}
