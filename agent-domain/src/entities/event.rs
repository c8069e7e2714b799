// Inventory change events
// Synthesized by the diff poller; the host has no native pickup event

use serde::{Deserialize, Serialize};

use crate::value_objects::{ItemId, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDelta {
    pub player: PlayerId,
    pub item: ItemId,
    /// Always positive; the variant carries the direction.
    pub amount: u32,
    pub timestamp_ms: i64,
}

/// Tagged union of everything the poller can observe for one item type
/// between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryEvent {
    Pickup(ItemDelta),
    Removal(ItemDelta),
    AutoRemove(ItemDelta),
}

impl InventoryEvent {
    pub fn delta(&self) -> &ItemDelta {
        match self {
            InventoryEvent::Pickup(delta)
            | InventoryEvent::Removal(delta)
            | InventoryEvent::AutoRemove(delta) => delta,
        }
    }
}
