// Pending sync records
// Queued locally until a remote flush returns success (at-least-once)

use serde::{Deserialize, Serialize};

use crate::value_objects::{Currency, Xuid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLocation {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// One mined-block record awaiting remote insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBlock {
    pub hash: String,
    pub minecraft_id: String,
    pub block_name: String,
    pub location: BlockLocation,
    pub pickaxe: String,
    pub mined_at: String,
}

impl PendingBlock {
    pub fn new(
        xuid: &Xuid,
        block_name: impl Into<String>,
        location: BlockLocation,
        pickaxe: impl Into<String>,
        mined_at: String,
    ) -> Self {
        Self {
            hash: uuid::Uuid::new_v4().to_string(),
            minecraft_id: xuid.0.clone(),
            block_name: block_name.into(),
            location,
            pickaxe: pickaxe.into(),
            mined_at,
        }
    }
}

/// Per-player aggregate of tracked currency pickups since the last
/// successful balance flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBalance {
    pub xuid: String,
    pub discord_id: String,
    #[serde(default)]
    pub mats: i64,
    #[serde(default)]
    pub huh: i64,
    pub last_sync_ms: i64,
}

impl PendingBalance {
    pub fn new(xuid: &Xuid, discord_id: impl Into<String>, now_ms: i64) -> Self {
        Self {
            xuid: xuid.0.clone(),
            discord_id: discord_id.into(),
            mats: 0,
            huh: 0,
            last_sync_ms: now_ms,
        }
    }

    pub fn add(&mut self, currency: Currency, amount: i64) {
        match currency {
            Currency::Mats => self.mats += amount,
            Currency::Huh => self.huh += amount,
        }
    }

    pub fn amount(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Mats => self.mats,
            Currency::Huh => self.huh,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mats == 0 && self.huh == 0
    }

    pub fn deadline_elapsed(&self, now_ms: i64, deadline_ms: i64) -> bool {
        self.last_sync_ms + deadline_ms < now_ms
    }

    /// Reset after a successful flush: amounts drop to zero and the sync
    /// deadline starts over.
    pub fn mark_synced(&mut self, now_ms: i64) {
        self.mats = 0;
        self.huh = 0;
        self.last_sync_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_accumulates_per_currency() {
        let mut pending = PendingBalance::new(&Xuid("123".into()), "d1", 0);
        pending.add(Currency::Mats, 3);
        pending.add(Currency::Mats, 2);
        pending.add(Currency::Huh, 7);
        assert_eq!(pending.mats, 5);
        assert_eq!(pending.huh, 7);
        assert!(!pending.is_empty());
    }

    #[test]
    fn mark_synced_resets_amounts_and_deadline() {
        let mut pending = PendingBalance::new(&Xuid("123".into()), "d1", 0);
        pending.add(Currency::Mats, 10);
        assert!(pending.deadline_elapsed(31_000, 30_000));
        pending.mark_synced(31_000);
        assert!(pending.is_empty());
        assert!(!pending.deadline_elapsed(40_000, 30_000));
    }
}
