use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{
    ChatMode, GroupData, ItemRules, PendingBalance, PendingBlock, PlayerLinkState,
    TeleportRequest,
};

/// Typed facade over the host's persisted key-value slots.
///
/// Every load returns defaults for missing or unreadable state; a failed
/// save is an error the caller must surface.
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn load_pending_blocks(&self) -> anyhow::Result<Vec<PendingBlock>>;
    async fn save_pending_blocks(&self, blocks: &[PendingBlock]) -> anyhow::Result<()>;

    async fn load_pending_balance(&self, xuid: &str) -> anyhow::Result<Option<PendingBalance>>;
    async fn save_pending_balance(&self, pending: &PendingBalance) -> anyhow::Result<()>;
    async fn list_pending_balances(&self) -> anyhow::Result<Vec<PendingBalance>>;

    async fn load_link_state(&self, player_name: &str) -> anyhow::Result<Option<PlayerLinkState>>;
    async fn save_link_state(
        &self,
        player_name: &str,
        state: &PlayerLinkState,
    ) -> anyhow::Result<()>;
    async fn list_link_states(&self) -> anyhow::Result<HashMap<String, PlayerLinkState>>;

    async fn load_groups(&self) -> anyhow::Result<HashMap<String, GroupData>>;
    async fn save_groups(&self, groups: &HashMap<String, GroupData>) -> anyhow::Result<()>;

    async fn load_chat_modes(&self) -> anyhow::Result<HashMap<String, ChatMode>>;
    async fn save_chat_modes(&self, modes: &HashMap<String, ChatMode>) -> anyhow::Result<()>;

    async fn load_teleport_requests(&self) -> anyhow::Result<Vec<TeleportRequest>>;
    async fn save_teleport_requests(&self, requests: &[TeleportRequest]) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn load_item_rules(&self, path: &str) -> anyhow::Result<ItemRules>;
    async fn save_item_rules(&self, path: &str, rules: &ItemRules) -> anyhow::Result<()>;
}
