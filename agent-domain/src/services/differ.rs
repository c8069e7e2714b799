use std::collections::HashMap;

use crate::entities::{InventoryEvent, InventorySnapshot, ItemDelta};
use crate::value_objects::PlayerId;

/// Detects per-type quantity changes in player inventories by comparing
/// consecutive snapshots.
///
/// The host has no native pickup event, so changes are inferred on a poll
/// cadence. A gain and loss of equal size between two polls cancels out
/// and is invisible; that miss window shrinks with the poll interval.
#[derive(Debug, Default)]
pub struct InventoryDiffer {
    snapshots: HashMap<PlayerId, InventorySnapshot>,
}

impl InventoryDiffer {
    /// Compare the new snapshot against the previous one (empty if none),
    /// store it as the new baseline, and return one event per item type
    /// with a non-zero net delta.
    pub fn observe(
        &mut self,
        player: &PlayerId,
        next: InventorySnapshot,
        now_ms: i64,
    ) -> Vec<InventoryEvent> {
        let prev = self.snapshots.remove(player).unwrap_or_default();

        let mut events = Vec::new();
        for item in prev.union_keys(&next) {
            let before = prev.quantity(item) as i64;
            let after = next.quantity(item) as i64;
            let delta = after - before;
            if delta == 0 {
                continue;
            }
            let record = ItemDelta {
                player: player.clone(),
                item: item.clone(),
                amount: delta.unsigned_abs() as u32,
                timestamp_ms: now_ms,
            };
            if delta > 0 {
                events.push(InventoryEvent::Pickup(record));
            } else {
                events.push(InventoryEvent::Removal(record));
            }
        }

        self.snapshots.insert(player.clone(), next);
        events
    }

    /// Store a baseline without emitting events. Items already held when
    /// a player first appears are not pickups.
    pub fn prime(&mut self, player: &PlayerId, snapshot: InventorySnapshot) {
        self.snapshots.insert(player.clone(), snapshot);
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.snapshots.contains_key(player)
    }

    /// Fold an auto-remove back into the baseline so the strip itself is
    /// not reported as a removal on the next poll.
    pub fn deduct(&mut self, player: &PlayerId, item: &crate::value_objects::ItemId, amount: u32) {
        if let Some(snapshot) = self.snapshots.get_mut(player) {
            let remaining = snapshot.quantity(item).saturating_sub(amount);
            let mut stacks: Vec<_> = snapshot
                .iter()
                .filter(|(id, _)| *id != item)
                .map(|(id, qty)| crate::entities::ItemStack {
                    item: id.clone(),
                    amount: qty,
                })
                .collect();
            if remaining > 0 {
                stacks.push(crate::entities::ItemStack {
                    item: item.clone(),
                    amount: remaining,
                });
            }
            *snapshot = InventorySnapshot::from_stacks(stacks);
        }
    }

    /// Drop the cached snapshot for a disconnected player.
    pub fn forget(&mut self, player: &PlayerId) {
        self.snapshots.remove(player);
    }

    pub fn tracked_players(&self) -> usize {
        self.snapshots.len()
    }
}
