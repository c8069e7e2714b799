use tracing::warn;

use agent_domain::utils::current_millis;
use agent_domain::{PlayerRef, TeleportRequest};

use crate::{AppError, AppState};

pub async fn handle(
    state: &AppState,
    sender: &PlayerRef,
    action: &str,
    arg: &str,
) -> Result<(), AppError> {
    match action {
        "request" => send_request(state, sender, arg).await,
        "accept" => accept_request(state, sender, arg).await,
        "deny" => deny_request(state, sender, arg).await,
        "cancel" => cancel_requests(state, sender, arg).await,
        "list" => list_requests(state, sender).await,
        _ => {
            state
                .host
                .send_message(&sender.id, &format!("§cUnknown tpa action \"{action}\"."));
            Ok(())
        }
    }
}

/// Load the queue with expired requests already dropped.
async fn load_active(state: &AppState, now_ms: i64) -> Result<Vec<TeleportRequest>, AppError> {
    let mut requests = state
        .store
        .load_teleport_requests()
        .await
        .map_err(AppError::Internal)?;
    requests.retain(|request| !request.is_expired(now_ms));
    Ok(requests)
}

async fn save(state: &AppState, requests: &[TeleportRequest]) -> Result<(), AppError> {
    state
        .store
        .save_teleport_requests(requests)
        .await
        .map_err(AppError::Internal)
}

async fn send_request(state: &AppState, sender: &PlayerRef, target: &str) -> Result<(), AppError> {
    if target.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !tpa:request <playerName>");
        return Ok(());
    }
    let Some(target_player) = state.host.find_player(target) else {
        state.host.send_message(
            &sender.id,
            &format!("§cPlayer \"{target}\" not found or not online."),
        );
        return Ok(());
    };
    if target_player.name == sender.name {
        state
            .host
            .send_message(&sender.id, "§cYou cannot teleport to yourself.");
        return Ok(());
    }

    let now_ms = current_millis();
    let mut requests = load_active(state, now_ms).await?;

    if requests
        .iter()
        .any(|request| request.requester == sender.name && request.target == target_player.name)
    {
        state.host.send_message(
            &sender.id,
            &format!(
                "§cYou already have a pending teleport request to {}.",
                target_player.name
            ),
        );
        return Ok(());
    }
    let outstanding = requests
        .iter()
        .filter(|request| request.requester == sender.name)
        .count();
    if outstanding >= TeleportRequest::MAX_PENDING {
        state.host.send_message(
            &sender.id,
            &format!(
                "§cYou have too many pending teleport requests. Maximum: {}",
                TeleportRequest::MAX_PENDING
            ),
        );
        return Ok(());
    }

    requests.push(TeleportRequest::new(
        sender.name.clone(),
        target_player.name.clone(),
        now_ms,
    ));
    save(state, &requests).await?;

    state.host.send_message(
        &sender.id,
        &format!(
            "§aTeleport request sent to {}. Request expires in 60 seconds.",
            target_player.name
        ),
    );
    state.host.send_message(
        &target_player.id,
        &format!(
            "§e{} wants to teleport to your location.\n§7Use §a!tpa:accept {} §7to accept or §c!tpa:deny {} §7to deny.\n§7Request expires in 60 seconds.",
            sender.name, sender.name, sender.name
        ),
    );
    Ok(())
}

async fn accept_request(
    state: &AppState,
    sender: &PlayerRef,
    requester: &str,
) -> Result<(), AppError> {
    if requester.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !tpa:accept <playerName>");
        return Ok(());
    }
    let now_ms = current_millis();
    let mut requests = load_active(state, now_ms).await?;

    let Some(index) = requests.iter().position(|request| {
        request.requester.eq_ignore_ascii_case(requester) && request.target == sender.name
    }) else {
        state.host.send_message(
            &sender.id,
            &format!("§cNo pending teleport request from \"{requester}\"."),
        );
        return Ok(());
    };
    let request = requests.remove(index);

    let Some(requester_player) = state.host.find_player(&request.requester) else {
        state.host.send_message(
            &sender.id,
            &format!("§cPlayer \"{}\" is no longer online.", request.requester),
        );
        save(state, &requests).await?;
        return Ok(());
    };
    save(state, &requests).await?;

    match state.host.teleport(&requester_player.id, &sender.id) {
        Ok(()) => {
            state.host.send_message(
                &sender.id,
                &format!("§aAccepted teleport request from {}.", requester_player.name),
            );
            state.host.send_message(
                &requester_player.id,
                &format!(
                    "§aTeleport request accepted! You have been teleported to {}.",
                    sender.name
                ),
            );
        }
        Err(err) => {
            warn!("tpa teleport failed: {}", err);
            state.host.send_message(
                &sender.id,
                &format!("§cFailed to teleport {}.", requester_player.name),
            );
            state.host.send_message(
                &requester_player.id,
                &format!("§cTeleport failed. You may be in a different dimension from {}.", sender.name),
            );
        }
    }
    Ok(())
}

async fn deny_request(
    state: &AppState,
    sender: &PlayerRef,
    requester: &str,
) -> Result<(), AppError> {
    if requester.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !tpa:deny <playerName>");
        return Ok(());
    }
    let now_ms = current_millis();
    let mut requests = load_active(state, now_ms).await?;

    let Some(index) = requests.iter().position(|request| {
        request.requester.eq_ignore_ascii_case(requester) && request.target == sender.name
    }) else {
        state.host.send_message(
            &sender.id,
            &format!("§cNo pending teleport request from \"{requester}\"."),
        );
        return Ok(());
    };
    let request = requests.remove(index);
    save(state, &requests).await?;

    state.host.send_message(
        &sender.id,
        &format!("§aDenied teleport request from {}.", request.requester),
    );
    if let Some(requester_player) = state.host.find_player(&request.requester) {
        state.host.send_message(
            &requester_player.id,
            &format!("§c{} denied your teleport request.", sender.name),
        );
    }
    Ok(())
}

async fn cancel_requests(
    state: &AppState,
    sender: &PlayerRef,
    target: &str,
) -> Result<(), AppError> {
    let now_ms = current_millis();
    let mut requests = load_active(state, now_ms).await?;

    if target.is_empty() {
        let cancelled: Vec<TeleportRequest> = requests
            .iter()
            .filter(|request| request.requester == sender.name)
            .cloned()
            .collect();
        if cancelled.is_empty() {
            state
                .host
                .send_message(&sender.id, "§cYou have no pending teleport requests.");
            return Ok(());
        }
        requests.retain(|request| request.requester != sender.name);
        save(state, &requests).await?;

        for request in &cancelled {
            if let Some(target_player) = state.host.find_player(&request.target) {
                state.host.send_message(
                    &target_player.id,
                    &format!("§e{} canceled their teleport request.", sender.name),
                );
            }
        }
        state.host.send_message(
            &sender.id,
            &format!("§aCanceled {} teleport request(s).", cancelled.len()),
        );
        return Ok(());
    }

    let Some(index) = requests.iter().position(|request| {
        request.requester == sender.name && request.target.eq_ignore_ascii_case(target)
    }) else {
        state.host.send_message(
            &sender.id,
            &format!("§cNo pending teleport request to \"{target}\"."),
        );
        return Ok(());
    };
    let request = requests.remove(index);
    save(state, &requests).await?;

    if let Some(target_player) = state.host.find_player(&request.target) {
        state.host.send_message(
            &target_player.id,
            &format!("§e{} canceled their teleport request.", sender.name),
        );
    }
    state.host.send_message(
        &sender.id,
        &format!("§aCanceled teleport request to {}.", request.target),
    );
    Ok(())
}

async fn list_requests(state: &AppState, sender: &PlayerRef) -> Result<(), AppError> {
    let now_ms = current_millis();
    let requests = load_active(state, now_ms).await?;

    let sent: Vec<&TeleportRequest> = requests
        .iter()
        .filter(|request| request.requester == sender.name)
        .collect();
    let received: Vec<&TeleportRequest> = requests
        .iter()
        .filter(|request| request.target == sender.name)
        .collect();

    if sent.is_empty() && received.is_empty() {
        state
            .host
            .send_message(&sender.id, "§eYou have no pending teleport requests.");
        return Ok(());
    }

    if !sent.is_empty() {
        state.host.send_message(&sender.id, "§6Sent requests:");
        for request in sent {
            let remaining = (request.expires_ms - now_ms).max(0) / 1_000;
            state.host.send_message(
                &sender.id,
                &format!("  - §a{} §7(expires in {remaining}s)", request.target),
            );
        }
    }
    if !received.is_empty() {
        state.host.send_message(&sender.id, "§6Received requests:");
        for request in received {
            let remaining = (request.expires_ms - now_ms).max(0) / 1_000;
            state.host.send_message(
                &sender.id,
                &format!("  - §a{} §7(expires in {remaining}s)", request.requester),
            );
        }
    }
    Ok(())
}
