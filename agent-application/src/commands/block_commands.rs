use tracing::{info, warn};

use agent_domain::utils::{current_millis, millis_to_rfc3339};
use agent_domain::{BlockBreakEvent, PendingBlock};

use crate::{AppError, AppState};

/// Handle one block break: gate on link state, enforce pickaxe tier, and
/// queue the mining record for batched remote insert.
pub async fn record_block_break(state: &AppState, event: &BlockBreakEvent) -> Result<(), AppError> {
    let link = state
        .store
        .load_link_state(&event.player.name)
        .await
        .map_err(AppError::Internal)?;
    let link = match link {
        Some(link) if link.is_linked => link,
        _ => {
            // Unlinked players cannot mine the economy: put the block
            // back and destroy whatever dropped.
            state
                .host
                .restore_block(&event.dimension, &event.location, &event.block_id);
            state.host.clear_drops(&event.dimension, &event.location);
            return Ok(());
        }
    };

    let rules = { state.rules.read().await.clone() };
    if !rules.is_recorded_block(&event.block_id) {
        return Ok(());
    }
    if !rules.pickaxe_allows(event.tool.as_ref(), &event.block_id) {
        state.host.clear_drops(&event.dimension, &event.location);
    }

    let record = PendingBlock::new(
        &link.xuid(),
        event.block_id.short_name(),
        event.location,
        event
            .tool
            .as_ref()
            .map(|tool| tool.short_name().to_string())
            .unwrap_or_default(),
        millis_to_rfc3339(current_millis()),
    );
    enqueue_block(state, record).await
}

/// Append to the persisted queue; once the batch threshold is reached the
/// whole queue is flushed in a single request.
async fn enqueue_block(state: &AppState, record: PendingBlock) -> Result<(), AppError> {
    // Gate held across load, flush and save; a concurrent enqueue during
    // an in-flight insert must not be overwritten by the queue clear.
    let _gate = state.block_gate.lock().await;
    let mut queue = state
        .store
        .load_pending_blocks()
        .await
        .map_err(AppError::Internal)?;
    queue.push(record);

    if queue.len() >= state.config.block_batch_size {
        flush_pending_blocks(state, queue).await?;
    } else {
        state
            .store
            .save_pending_blocks(&queue)
            .await
            .map_err(AppError::Internal)?;
    }
    Ok(())
}

/// One authenticated insert for the entire queue. Success clears it;
/// failure persists it unchanged so the same batch retries later.
async fn flush_pending_blocks(state: &AppState, queue: Vec<PendingBlock>) -> Result<(), AppError> {
    match state.backend.insert_blocks(&queue).await {
        Ok(()) => {
            info!("saved {} mined blocks to backend", queue.len());
            state.metrics.record_block_flush(queue.len());
            state
                .store
                .save_pending_blocks(&[])
                .await
                .map_err(AppError::Internal)?;
        }
        Err(err) => {
            state.metrics.record_flush_error();
            warn!("failed to save mined blocks, kept {} pending: {}", queue.len(), err);
            state
                .store
                .save_pending_blocks(&queue)
                .await
                .map_err(AppError::Internal)?;
        }
    }
    Ok(())
}

/// Manual flush for the ops surface; flushes whatever is queued now.
pub async fn flush_pending_blocks_now(state: &AppState) -> Result<usize, AppError> {
    let _gate = state.block_gate.lock().await;
    let queue = state
        .store
        .load_pending_blocks()
        .await
        .map_err(AppError::Internal)?;
    if queue.is_empty() {
        return Ok(0);
    }
    let count = queue.len();
    flush_pending_blocks(state, queue).await?;
    Ok(count)
}
