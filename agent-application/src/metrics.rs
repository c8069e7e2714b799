use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    polls: AtomicU64,
    pickup_events: AtomicU64,
    removal_events: AtomicU64,
    auto_removed_items: AtomicU64,
    balance_flushes: AtomicU64,
    block_flushes: AtomicU64,
    blocks_flushed: AtomicU64,
    flush_errors: AtomicU64,
}

impl Metrics {
    pub fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pickup(&self) {
        self.pickup_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removal_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auto_removed(&self, count: u64) {
        self.auto_removed_items.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_balance_flush(&self) {
        self.balance_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_flush(&self, block_count: usize) {
        self.block_flushes.fetch_add(1, Ordering::Relaxed);
        self.blocks_flushed
            .fetch_add(block_count as u64, Ordering::Relaxed);
    }

    pub fn record_flush_error(&self) {
        self.flush_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_error_count(&self) -> u64 {
        self.flush_errors.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let polls = self.polls.load(Ordering::Relaxed);
        let pickups = self.pickup_events.load(Ordering::Relaxed);
        let removals = self.removal_events.load(Ordering::Relaxed);
        let auto_removed = self.auto_removed_items.load(Ordering::Relaxed);
        let balance_flushes = self.balance_flushes.load(Ordering::Relaxed);
        let block_flushes = self.block_flushes.load(Ordering::Relaxed);
        let blocks_flushed = self.blocks_flushed.load(Ordering::Relaxed);
        let flush_errors = self.flush_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE matscraft_polls_total counter\n\
matscraft_polls_total {}\n\
# TYPE matscraft_pickup_events_total counter\n\
matscraft_pickup_events_total {}\n\
# TYPE matscraft_removal_events_total counter\n\
matscraft_removal_events_total {}\n\
# TYPE matscraft_auto_removed_items_total counter\n\
matscraft_auto_removed_items_total {}\n\
# TYPE matscraft_balance_flushes_total counter\n\
matscraft_balance_flushes_total {}\n\
# TYPE matscraft_block_flushes_total counter\n\
matscraft_block_flushes_total {}\n\
# TYPE matscraft_blocks_flushed_total counter\n\
matscraft_blocks_flushed_total {}\n\
# TYPE matscraft_flush_errors_total counter\n\
matscraft_flush_errors_total {}\n",
            polls,
            pickups,
            removals,
            auto_removed,
            balance_flushes,
            block_flushes,
            blocks_flushed,
            flush_errors
        )
    }
}
