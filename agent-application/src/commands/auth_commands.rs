use tracing::{info, warn};

use agent_domain::{Currency, LinkOutcome, PlayerLinkState, PlayerRef, Xuid};

use crate::{AppError, AppState};

/// Player (re)join: make sure we know their XUID, then mirror the remote
/// account state locally. Any failure leaves the player unlinked with
/// zeroed scores (fail-closed) and a relink prompt.
pub async fn handle_player_join(state: &AppState, player: &PlayerRef) -> Result<(), AppError> {
    let xuid = match ensure_xuid(state, player).await {
        Some(xuid) => xuid,
        None => {
            state.host.action_bar(
                &player.id,
                "§cThere's something wrong when fetching your data. Please try again later.",
            );
            reset_player(state, player, None).await?;
            return Ok(());
        }
    };

    match state.backend.fetch_account(&xuid).await {
        Ok(Some(account)) => {
            info!(player = %player.name, xuid = %xuid, "synced account from backend");
            let link = PlayerLinkState::linked(
                &xuid,
                account.discord_id.clone(),
                account.discord_username.clone(),
            );
            state
                .store
                .save_link_state(&player.name, &link)
                .await
                .map_err(AppError::Internal)?;
            state
                .host
                .set_score(&player.id, Currency::Mats, account.mats);
            state.host.set_score(&player.id, Currency::Huh, account.huh);
        }
        Ok(None) => {
            info!(player = %player.name, "not found in backend, resetting data");
            reset_player(state, player, Some(&xuid)).await?;
            show_relink_prompt(state, player);
        }
        Err(err) => {
            warn!(player = %player.name, "account fetch failed: {}", err);
            state.host.action_bar(
                &player.id,
                "§cThere's something wrong when fetching your data. Please try again later.",
            );
            reset_player(state, player, Some(&xuid)).await?;
            show_relink_prompt(state, player);
        }
    }
    Ok(())
}

/// Use the stored XUID if present, otherwise resolve the gamertag via the
/// lookup service (which itself falls back to a secondary provider).
async fn ensure_xuid(state: &AppState, player: &PlayerRef) -> Option<Xuid> {
    let stored = state
        .store
        .load_link_state(&player.name)
        .await
        .ok()
        .flatten();
    if let Some(link) = stored {
        if !link.xuid.is_empty() {
            return Some(link.xuid());
        }
    }
    match state.xuid_resolver.resolve(&player.name).await {
        Ok(xuid) => {
            info!(player = %player.name, xuid = %xuid, "resolved XUID");
            Some(xuid)
        }
        Err(err) => {
            warn!(player = %player.name, "XUID resolution failed: {}", err);
            None
        }
    }
}

async fn reset_player(
    state: &AppState,
    player: &PlayerRef,
    xuid: Option<&Xuid>,
) -> Result<(), AppError> {
    state.host.set_score(&player.id, Currency::Mats, 0);
    state.host.set_score(&player.id, Currency::Huh, 0);
    let link = PlayerLinkState::unlinked(xuid.unwrap_or(&Xuid(String::new())));
    state
        .store
        .save_link_state(&player.name, &link)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

fn show_relink_prompt(state: &AppState, player: &PlayerRef) {
    state.host.send_message(
        &player.id,
        "§6Link your account to use the MatsCraft economy. §7Get a code from Discord and submit it with your phone.",
    );
}

/// Submit a verification code: `Unlinked -> Verifying -> {Linked | Unlinked}`.
pub async fn verify_link_code(
    state: &AppState,
    player: &PlayerRef,
    code: &str,
) -> Result<(), AppError> {
    if code.trim().is_empty() {
        return Err(AppError::BadRequest("verification code is empty".into()));
    }
    let Some(xuid) = ensure_xuid(state, player).await else {
        state.host.action_bar(&player.id, "§cVerification Error");
        return Ok(());
    };

    match state.backend.verify_link(&xuid, &player.name, code).await {
        Ok(LinkOutcome::Linked(account)) => {
            let link = PlayerLinkState::linked(
                &xuid,
                account.discord_id.clone(),
                account.discord_username.clone(),
            );
            state
                .store
                .save_link_state(&player.name, &link)
                .await
                .map_err(AppError::Internal)?;
            state
                .host
                .set_score(&player.id, Currency::Mats, account.mats);
            state.host.set_score(&player.id, Currency::Huh, account.huh);
            state
                .host
                .action_bar(&player.id, "§aAccount Linked Successfully!");
        }
        Ok(LinkOutcome::Rejected(message)) => {
            state.host.action_bar(&player.id, &format!("§c{message}"));
        }
        Err(err) => {
            warn!(player = %player.name, "verification failed: {}", err);
            state.host.action_bar(&player.id, "§cVerification Error");
        }
    }
    Ok(())
}

/// Explicit logout: `Linked -> Unlinked` and zeroed scores, but only once
/// the backend confirms.
pub async fn logout(state: &AppState, player: &PlayerRef) -> Result<(), AppError> {
    state.host.action_bar(&player.id, "Disconnecting Discord...");
    let link = state
        .store
        .load_link_state(&player.name)
        .await
        .map_err(AppError::Internal)?;
    let Some(link) = link.filter(|link| link.is_linked) else {
        state.host.action_bar(&player.id, "§cYou are not linked");
        return Ok(());
    };

    match state.backend.logout(&link.xuid()).await {
        Ok(()) => {
            reset_player(state, player, Some(&link.xuid())).await?;
        }
        Err(err) => {
            warn!(player = %player.name, "logout failed: {}", err);
            state
                .host
                .action_bar(&player.id, "§cFailed to Disconnect Discord");
        }
    }
    Ok(())
}
