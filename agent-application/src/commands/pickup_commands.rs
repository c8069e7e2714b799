use tracing::{info, warn};

use agent_domain::utils::current_millis;
use agent_domain::{
    Currency, InventoryEvent, InventorySnapshot, ItemDelta, ItemRules, PendingBalance, PlayerRef,
    Xuid,
};

use crate::{AppError, AppState};

const ADMIN_TAG: &str = "admin";

/// One poll tick: snapshot every connected player's inventory, diff it
/// against the previous tick, react to tracked pickups, and strip
/// auto-remove items. Returns every event emitted this tick.
pub async fn run_inventory_poll(state: &AppState) -> Result<Vec<InventoryEvent>, AppError> {
    state.metrics.record_poll();
    let rules = { state.rules.read().await.clone() };
    let now_ms = current_millis();

    let mut emitted = Vec::new();
    for player in state.host.players() {
        // A player disconnecting mid-poll is skipped; each player's diff
        // is independent so no partial state is corrupted.
        let stacks = match state.host.read_inventory(&player.id) {
            Ok(stacks) => stacks,
            Err(_) => continue,
        };
        let snapshot = InventorySnapshot::from_stacks(stacks);

        let events = {
            let mut differ = state.differ.lock().await;
            if differ.contains(&player.id) {
                differ.observe(&player.id, snapshot, now_ms)
            } else {
                // First sighting establishes the baseline; items already
                // held at join are not pickups.
                differ.prime(&player.id, snapshot);
                Vec::new()
            }
        };

        for event in &events {
            match event {
                InventoryEvent::Pickup(delta) => {
                    handle_tracked_pickup(state, &rules, &player, delta).await?;
                }
                InventoryEvent::Removal(_) => state.metrics.record_removal(),
                InventoryEvent::AutoRemove(_) => {}
            }
        }
        emitted.extend(events);

        emitted.extend(auto_remove_blacklisted(state, &rules, &player, now_ms).await);
    }
    Ok(emitted)
}

/// Strip every auto-remove item from the live inventory right after
/// diffing, so currency items convert to score and never persist as
/// physical items.
async fn auto_remove_blacklisted(
    state: &AppState,
    rules: &ItemRules,
    player: &PlayerRef,
    now_ms: i64,
) -> Vec<InventoryEvent> {
    let mut events = Vec::new();
    for item in &rules.auto_remove_items {
        let removed = match state.host.clear_item(&player.id, item) {
            Ok(removed) => removed,
            Err(_) => continue,
        };
        if removed == 0 {
            continue;
        }
        state.differ.lock().await.deduct(&player.id, item, removed);
        state.metrics.record_auto_removed(removed as u64);
        events.push(InventoryEvent::AutoRemove(ItemDelta {
            player: player.id.clone(),
            item: item.clone(),
            amount: removed,
            timestamp_ms: now_ms,
        }));
    }
    events
}

async fn handle_tracked_pickup(
    state: &AppState,
    rules: &ItemRules,
    player: &PlayerRef,
    delta: &ItemDelta,
) -> Result<(), AppError> {
    if !rules.is_tracked(&delta.item) {
        return Ok(());
    }
    if state.host.has_tag(&player.id, ADMIN_TAG) {
        return Ok(());
    }
    state.metrics.record_pickup();

    let link = state
        .store
        .load_link_state(&player.name)
        .await
        .map_err(AppError::Internal)?;
    let link = match link {
        Some(link) if link.is_linked => link,
        _ => {
            // Fail closed: unlinked players keep nothing from the economy.
            if rules.is_exempt(&delta.item) {
                return Ok(());
            }
            if let Ok(removed) = state.host.clear_item(&player.id, &delta.item) {
                state
                    .differ
                    .lock()
                    .await
                    .deduct(&player.id, &delta.item, removed);
            }
            state.host.action_bar(
                &player.id,
                "§cYour account is not linked! please link your account first!",
            );
            return Ok(());
        }
    };

    // Ores are tracked for telemetry but only currencies move balances.
    let Some(currency) = Currency::from_item_id(&delta.item) else {
        return Ok(());
    };
    let amount = delta.amount as i64;
    state.host.add_score(&player.id, currency, amount);
    state.host.action_bar(
        &player.id,
        &format!("+{} {}", delta.amount, currency.objective()),
    );

    let xuid = link.xuid();
    let now_ms = current_millis();
    // Gate held across load, flush and save so a concurrent sweep cannot
    // clear an aggregate this pickup is being added to.
    let _gate = state.balance_gate.lock().await;
    let mut pending = state
        .store
        .load_pending_balance(&xuid.0)
        .await
        .map_err(AppError::Internal)?
        .unwrap_or_else(|| {
            PendingBalance::new(&xuid, link.discord_id.clone().unwrap_or_default(), now_ms)
        });
    pending.add(currency, amount);

    if pending.deadline_elapsed(now_ms, state.config.balance_deadline_ms()) {
        flush_balance(state, Some(player), &mut pending).await;
    }
    state
        .store
        .save_pending_balance(&pending)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

/// Flush one player's pickup aggregate to the backend. On success the
/// aggregate is zeroed and the deadline restarts; on any failure the
/// aggregate is left exactly as it was, to be retried on the next
/// enqueue or sweep.
pub async fn flush_balance(
    state: &AppState,
    player: Option<&PlayerRef>,
    pending: &mut PendingBalance,
) {
    let xuid = Xuid(pending.xuid.clone());
    match state
        .backend
        .sync_balance(&xuid, pending.mats, pending.huh)
        .await
    {
        Ok(balance) => {
            info!(
                xuid = %xuid,
                mats = pending.mats,
                huh = pending.huh,
                "synced pickup balance"
            );
            pending.mark_synced(current_millis());
            state.metrics.record_balance_flush();
            if let Some(player) = player {
                state.host.set_score(&player.id, Currency::Mats, balance.mats);
                state.host.set_score(&player.id, Currency::Huh, balance.huh);
            }
        }
        Err(err) => {
            state.metrics.record_flush_error();
            warn!(xuid = %xuid, "balance sync failed: {}", err);
            if let Some(player) = player {
                state.host.action_bar(&player.id, "§cUpdate Balance Failed");
            }
        }
    }
}

/// Periodic sweep: flush aggregates whose sync deadline elapsed even when
/// no new pickup arrived to trigger it. Newly accumulated amounts after a
/// successful flush wait for the next deadline; there is no immediate
/// second flush within one sweep.
pub async fn sweep_balance_deadlines(state: &AppState) -> Result<(), AppError> {
    let deadline_ms = state.config.balance_deadline_ms();
    let now_ms = current_millis();
    let pendings = state
        .store
        .list_pending_balances()
        .await
        .map_err(AppError::Internal)?;

    for listed in pendings {
        if listed.is_empty() || !listed.deadline_elapsed(now_ms, deadline_ms) {
            continue;
        }
        // The listing above ran without the gate; re-read the aggregate
        // under it so pickups that landed in between are flushed too and
        // none land between our load and save.
        let _gate = state.balance_gate.lock().await;
        let Some(mut pending) = state
            .store
            .load_pending_balance(&listed.xuid)
            .await
            .map_err(AppError::Internal)?
        else {
            continue;
        };
        if pending.is_empty() || !pending.deadline_elapsed(now_ms, deadline_ms) {
            continue;
        }
        let player = find_player_by_xuid(state, &pending.xuid).await;
        let before = pending.clone();
        flush_balance(state, player.as_ref(), &mut pending).await;
        if pending != before {
            state
                .store
                .save_pending_balance(&pending)
                .await
                .map_err(AppError::Internal)?;
        }
    }
    Ok(())
}

async fn find_player_by_xuid(state: &AppState, xuid: &str) -> Option<PlayerRef> {
    let links = state.store.list_link_states().await.ok()?;
    let name = links
        .into_iter()
        .find(|(_, link)| link.xuid == xuid)
        .map(|(name, _)| name)?;
    state.host.find_player(&name)
}

/// Drop the cached snapshot when a player leaves so a rejoin re-baselines
/// instead of reporting the whole inventory as picked up.
pub async fn handle_player_leave(state: &AppState, player: &PlayerRef) {
    state.differ.lock().await.forget(&player.id);
}
