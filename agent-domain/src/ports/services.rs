use async_trait::async_trait;

use crate::entities::{
    BalanceSnapshot, BlockLocation, ItemStack, LinkOutcome, PendingBlock, PlayerAccount,
    PlayerRef,
};
use crate::value_objects::{Currency, ItemId, PlayerId, Xuid};

/// The remote economy backend.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `Ok(None)` means the backend answered but knows no such player;
    /// `Err` is a transport or protocol failure. Both are fail-closed.
    async fn fetch_account(&self, xuid: &Xuid) -> anyhow::Result<Option<PlayerAccount>>;

    /// Flush a per-player pickup aggregate; returns the authoritative
    /// balance on success.
    async fn sync_balance(&self, xuid: &Xuid, mats: i64, huh: i64)
        -> anyhow::Result<BalanceSnapshot>;

    async fn insert_blocks(&self, blocks: &[PendingBlock]) -> anyhow::Result<()>;

    async fn verify_link(
        &self,
        xuid: &Xuid,
        username: &str,
        code: &str,
    ) -> anyhow::Result<LinkOutcome>;

    async fn logout(&self, xuid: &Xuid) -> anyhow::Result<()>;

    async fn ping(&self) -> anyhow::Result<()>;
}

/// External gamertag-to-XUID lookup.
#[async_trait]
pub trait XuidResolver: Send + Sync {
    async fn resolve(&self, gamertag: &str) -> anyhow::Result<Xuid>;
}

/// Everything the agent is allowed to do to the running game world.
///
/// The host engine's own event subscription mechanism stays on the other
/// side of this boundary; the host pushes block-break and chat events
/// into the application layer and the agent reaches back through here.
pub trait GameHost: Send + Sync {
    fn players(&self) -> Vec<PlayerRef>;
    fn find_player(&self, name: &str) -> Option<PlayerRef>;

    /// Errors when the player disconnected mid-poll; callers skip and
    /// continue with the next player.
    fn read_inventory(&self, player: &PlayerId) -> anyhow::Result<Vec<ItemStack>>;
    /// Remove every stack of the given type; returns the total removed.
    fn clear_item(&self, player: &PlayerId, item: &ItemId) -> anyhow::Result<u32>;

    fn set_score(&self, player: &PlayerId, currency: Currency, value: i64);
    fn add_score(&self, player: &PlayerId, currency: Currency, amount: i64);

    fn action_bar(&self, player: &PlayerId, message: &str);
    fn send_message(&self, player: &PlayerId, message: &str);
    fn clear_title(&self, player: &PlayerId);

    fn has_tag(&self, player: &PlayerId, tag: &str) -> bool;
    fn add_tag(&self, player: &PlayerId, tag: &str);
    fn remove_tag(&self, player: &PlayerId, tag: &str);

    fn teleport(&self, player: &PlayerId, to: &PlayerId) -> anyhow::Result<()>;

    fn restore_block(&self, dimension: &str, location: &BlockLocation, block_id: &ItemId);
    fn clear_drops(&self, dimension: &str, location: &BlockLocation);
}
