// Inventory snapshot entity
// One player's inventory contents collapsed to per-type totals

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::ItemId;

/// A single stack as reported by the game host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: ItemId::new(item),
            amount,
        }
    }
}

/// Per-type quantity totals for one player at one poll tick.
///
/// Identity is tracked by item type, not by slot, so stack merges and
/// inventory reshuffles between two polls do not produce spurious deltas.
/// Absence of a key means zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    items: BTreeMap<ItemId, u32>,
}

impl InventorySnapshot {
    pub fn from_stacks<I>(stacks: I) -> Self
    where
        I: IntoIterator<Item = ItemStack>,
    {
        let mut snapshot = Self::default();
        for stack in stacks {
            if stack.amount == 0 {
                continue;
            }
            *snapshot.items.entry(stack.item).or_insert(0) += stack.amount;
        }
        snapshot
    }

    pub fn quantity(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.items.iter().map(|(item, amount)| (item, *amount))
    }

    /// Item types present in either snapshot, each yielded once.
    pub fn union_keys<'a>(&'a self, other: &'a InventorySnapshot) -> Vec<&'a ItemId> {
        let mut keys: Vec<&ItemId> = self.items.keys().collect();
        for key in other.items.keys() {
            if !self.items.contains_key(key) {
                keys.push(key);
            }
        }
        keys
    }
}
