// In-memory test doubles for the command and query tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, Notify, RwLock};

use agent_domain::ports::{BackendApi, GameHost, StateRepository, XuidResolver};
use agent_domain::services::InventoryDiffer;
use agent_domain::{
    BalanceSnapshot, BlockLocation, ChatMode, Currency, GroupData, ItemId, ItemRules, ItemStack,
    LinkOutcome, PendingBalance, PendingBlock, PlayerAccount, PlayerId, PlayerLinkState,
    PlayerRef, RuntimeConfig, TeleportRequest, Xuid,
};

use crate::{AppState, Metrics};

#[derive(Default)]
struct StoreData {
    pending_blocks: Vec<PendingBlock>,
    balances: HashMap<String, PendingBalance>,
    links: HashMap<String, PlayerLinkState>,
    groups: HashMap<String, GroupData>,
    chat_modes: HashMap<String, ChatMode>,
    teleports: Vec<TeleportRequest>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn put_link(&self, player_name: &str, link: PlayerLinkState) {
        self.data
            .lock()
            .unwrap()
            .links
            .insert(player_name.to_string(), link);
    }

    pub fn put_balance(&self, pending: PendingBalance) {
        self.data
            .lock()
            .unwrap()
            .balances
            .insert(pending.xuid.clone(), pending);
    }

    pub fn put_teleport(&self, request: TeleportRequest) {
        self.data.lock().unwrap().teleports.push(request);
    }

    pub fn put_group(&self, group: GroupData) {
        self.data
            .lock()
            .unwrap()
            .groups
            .insert(group.name.clone(), group);
    }

    pub fn blocks(&self) -> Vec<PendingBlock> {
        self.data.lock().unwrap().pending_blocks.clone()
    }

    pub fn balance(&self, xuid: &str) -> Option<PendingBalance> {
        self.data.lock().unwrap().balances.get(xuid).cloned()
    }

    pub fn link(&self, player_name: &str) -> Option<PlayerLinkState> {
        self.data.lock().unwrap().links.get(player_name).cloned()
    }

    pub fn groups(&self) -> HashMap<String, GroupData> {
        self.data.lock().unwrap().groups.clone()
    }

    pub fn teleports(&self) -> Vec<TeleportRequest> {
        self.data.lock().unwrap().teleports.clone()
    }
}

#[async_trait]
impl StateRepository for MemoryStore {
    async fn load_pending_blocks(&self) -> anyhow::Result<Vec<PendingBlock>> {
        Ok(self.data.lock().unwrap().pending_blocks.clone())
    }

    async fn save_pending_blocks(&self, blocks: &[PendingBlock]) -> anyhow::Result<()> {
        self.data.lock().unwrap().pending_blocks = blocks.to_vec();
        Ok(())
    }

    async fn load_pending_balance(&self, xuid: &str) -> anyhow::Result<Option<PendingBalance>> {
        Ok(self.data.lock().unwrap().balances.get(xuid).cloned())
    }

    async fn save_pending_balance(&self, pending: &PendingBalance) -> anyhow::Result<()> {
        self.data
            .lock()
            .unwrap()
            .balances
            .insert(pending.xuid.clone(), pending.clone());
        Ok(())
    }

    async fn list_pending_balances(&self) -> anyhow::Result<Vec<PendingBalance>> {
        Ok(self.data.lock().unwrap().balances.values().cloned().collect())
    }

    async fn load_link_state(&self, player_name: &str) -> anyhow::Result<Option<PlayerLinkState>> {
        Ok(self.data.lock().unwrap().links.get(player_name).cloned())
    }

    async fn save_link_state(
        &self,
        player_name: &str,
        state: &PlayerLinkState,
    ) -> anyhow::Result<()> {
        self.data
            .lock()
            .unwrap()
            .links
            .insert(player_name.to_string(), state.clone());
        Ok(())
    }

    async fn list_link_states(&self) -> anyhow::Result<HashMap<String, PlayerLinkState>> {
        Ok(self.data.lock().unwrap().links.clone())
    }

    async fn load_groups(&self) -> anyhow::Result<HashMap<String, GroupData>> {
        Ok(self.data.lock().unwrap().groups.clone())
    }

    async fn save_groups(&self, groups: &HashMap<String, GroupData>) -> anyhow::Result<()> {
        self.data.lock().unwrap().groups = groups.clone();
        Ok(())
    }

    async fn load_chat_modes(&self) -> anyhow::Result<HashMap<String, ChatMode>> {
        Ok(self.data.lock().unwrap().chat_modes.clone())
    }

    async fn save_chat_modes(&self, modes: &HashMap<String, ChatMode>) -> anyhow::Result<()> {
        self.data.lock().unwrap().chat_modes = modes.clone();
        Ok(())
    }

    async fn load_teleport_requests(&self) -> anyhow::Result<Vec<TeleportRequest>> {
        Ok(self.data.lock().unwrap().teleports.clone())
    }

    async fn save_teleport_requests(&self, requests: &[TeleportRequest]) -> anyhow::Result<()> {
        self.data.lock().unwrap().teleports = requests.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct StubBackend {
    pub accounts: Mutex<HashMap<String, PlayerAccount>>,
    pub fail_sync: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub synced: Mutex<Vec<(String, i64, i64)>>,
    pub inserted: Mutex<Vec<Vec<PendingBlock>>>,
    pub logged_out: Mutex<Vec<String>>,
    // When the block_* flag is set, the call parks after notifying
    // *_started until *_release fires, so a test can interleave work
    // with an in-flight request.
    pub block_sync: AtomicBool,
    pub sync_started: Notify,
    pub sync_release: Notify,
    pub block_insert: AtomicBool,
    pub insert_started: Notify,
    pub insert_release: Notify,
}

impl StubBackend {
    pub fn put_account(&self, xuid: &str, account: PlayerAccount) {
        self.accounts
            .lock()
            .unwrap()
            .insert(xuid.to_string(), account);
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn fetch_account(&self, xuid: &Xuid) -> anyhow::Result<Option<PlayerAccount>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("backend unreachable");
        }
        Ok(self.accounts.lock().unwrap().get(&xuid.0).cloned())
    }

    async fn sync_balance(
        &self,
        xuid: &Xuid,
        mats: i64,
        huh: i64,
    ) -> anyhow::Result<BalanceSnapshot> {
        if self.fail_sync.load(Ordering::SeqCst) {
            anyhow::bail!("balance sync refused");
        }
        if self.block_sync.load(Ordering::SeqCst) {
            self.sync_started.notify_one();
            self.sync_release.notified().await;
        }
        self.synced
            .lock()
            .unwrap()
            .push((xuid.0.clone(), mats, huh));
        let account = self.accounts.lock().unwrap().get(&xuid.0).cloned();
        let mut balance = account.map(|account| account.balance()).unwrap_or_default();
        balance.mats += mats;
        balance.huh += huh;
        Ok(balance)
    }

    async fn insert_blocks(&self, blocks: &[PendingBlock]) -> anyhow::Result<()> {
        if self.fail_insert.load(Ordering::SeqCst) {
            anyhow::bail!("insert refused");
        }
        if self.block_insert.load(Ordering::SeqCst) {
            self.insert_started.notify_one();
            self.insert_release.notified().await;
        }
        self.inserted.lock().unwrap().push(blocks.to_vec());
        Ok(())
    }

    async fn verify_link(
        &self,
        xuid: &Xuid,
        _username: &str,
        code: &str,
    ) -> anyhow::Result<LinkOutcome> {
        if code == "good" {
            let account = self
                .accounts
                .lock()
                .unwrap()
                .get(&xuid.0)
                .cloned()
                .unwrap_or(PlayerAccount {
                    discord_id: "d-1".into(),
                    discord_username: "tester".into(),
                    mats: 0,
                    huh: 0,
                });
            Ok(LinkOutcome::Linked(account))
        } else {
            Ok(LinkOutcome::Rejected("Invalid Code".into()))
        }
    }

    async fn logout(&self, xuid: &Xuid) -> anyhow::Result<()> {
        self.logged_out.lock().unwrap().push(xuid.0.clone());
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub players: Mutex<Vec<PlayerRef>>,
    pub inventories: Mutex<HashMap<String, Vec<ItemStack>>>,
    pub scores: Mutex<HashMap<(String, Currency), i64>>,
    pub messages: Mutex<Vec<(String, String)>>,
    pub action_bars: Mutex<Vec<(String, String)>>,
    pub tags: Mutex<HashMap<String, HashSet<String>>>,
    pub restored_blocks: Mutex<Vec<BlockLocation>>,
    pub cleared_drops: Mutex<Vec<BlockLocation>>,
    pub teleported: Mutex<Vec<(String, String)>>,
    pub fail_teleport: AtomicBool,
}

impl FakeHost {
    pub fn join(&self, player: PlayerRef) {
        self.players.lock().unwrap().push(player);
    }

    pub fn set_inventory(&self, player: &PlayerId, stacks: Vec<ItemStack>) {
        self.inventories
            .lock()
            .unwrap()
            .insert(player.0.clone(), stacks);
    }

    pub fn score(&self, player: &PlayerId, currency: Currency) -> i64 {
        self.scores
            .lock()
            .unwrap()
            .get(&(player.0.clone(), currency))
            .copied()
            .unwrap_or(0)
    }

    pub fn messages_for(&self, player: &PlayerId) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == &player.0)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn action_bars_for(&self, player: &PlayerId) -> Vec<String> {
        self.action_bars
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == &player.0)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl GameHost for FakeHost {
    fn players(&self) -> Vec<PlayerRef> {
        self.players.lock().unwrap().clone()
    }

    fn find_player(&self, name: &str) -> Option<PlayerRef> {
        self.players
            .lock()
            .unwrap()
            .iter()
            .find(|player| player.name == name)
            .cloned()
    }

    fn read_inventory(&self, player: &PlayerId) -> anyhow::Result<Vec<ItemStack>> {
        self.inventories
            .lock()
            .unwrap()
            .get(&player.0)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("player gone"))
    }

    fn clear_item(&self, player: &PlayerId, item: &ItemId) -> anyhow::Result<u32> {
        let mut inventories = self.inventories.lock().unwrap();
        let Some(stacks) = inventories.get_mut(&player.0) else {
            anyhow::bail!("player gone");
        };
        let removed: u32 = stacks
            .iter()
            .filter(|stack| &stack.item == item)
            .map(|stack| stack.amount)
            .sum();
        stacks.retain(|stack| &stack.item != item);
        Ok(removed)
    }

    fn set_score(&self, player: &PlayerId, currency: Currency, value: i64) {
        self.scores
            .lock()
            .unwrap()
            .insert((player.0.clone(), currency), value);
    }

    fn add_score(&self, player: &PlayerId, currency: Currency, amount: i64) {
        *self
            .scores
            .lock()
            .unwrap()
            .entry((player.0.clone(), currency))
            .or_insert(0) += amount;
    }

    fn action_bar(&self, player: &PlayerId, message: &str) {
        self.action_bars
            .lock()
            .unwrap()
            .push((player.0.clone(), message.to_string()));
    }

    fn send_message(&self, player: &PlayerId, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((player.0.clone(), message.to_string()));
    }

    fn clear_title(&self, _player: &PlayerId) {}

    fn has_tag(&self, player: &PlayerId, tag: &str) -> bool {
        self.tags
            .lock()
            .unwrap()
            .get(&player.0)
            .map(|tags| tags.contains(tag))
            .unwrap_or(false)
    }

    fn add_tag(&self, player: &PlayerId, tag: &str) {
        self.tags
            .lock()
            .unwrap()
            .entry(player.0.clone())
            .or_default()
            .insert(tag.to_string());
    }

    fn remove_tag(&self, player: &PlayerId, tag: &str) {
        if let Some(tags) = self.tags.lock().unwrap().get_mut(&player.0) {
            tags.remove(tag);
        }
    }

    fn teleport(&self, player: &PlayerId, to: &PlayerId) -> anyhow::Result<()> {
        if self.fail_teleport.load(Ordering::SeqCst) {
            anyhow::bail!("different dimension");
        }
        self.teleported
            .lock()
            .unwrap()
            .push((player.0.clone(), to.0.clone()));
        Ok(())
    }

    fn restore_block(&self, _dimension: &str, location: &BlockLocation, _block_id: &ItemId) {
        self.restored_blocks.lock().unwrap().push(*location);
    }

    fn clear_drops(&self, _dimension: &str, location: &BlockLocation) {
        self.cleared_drops.lock().unwrap().push(*location);
    }
}

pub struct StubResolver {
    pub xuid: Option<String>,
}

#[async_trait]
impl XuidResolver for StubResolver {
    async fn resolve(&self, _gamertag: &str) -> anyhow::Result<Xuid> {
        match &self.xuid {
            Some(xuid) => Ok(Xuid(xuid.clone())),
            None => anyhow::bail!("lookup failed"),
        }
    }
}

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".into(),
        api_token: None,
        base_url: "http://localhost:9".into(),
        secret_key: "test-key".into(),
        token_ttl_seconds: 60,
        poll_interval_ms: 250,
        balance_sync_seconds: 30,
        sweep_interval_seconds: 5,
        block_batch_size: 10,
        request_timeout_seconds: 5,
        max_body_bytes: 1024 * 1024,
        data_dir: "/tmp".into(),
        item_rules_path: "/tmp/item_rules.yaml".into(),
        xuid_lookup_url: "http://localhost:9/xuid".into(),
        xuid_fallback_lookup_url: None,
    }
}

pub struct TestWorld {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub backend: Arc<StubBackend>,
    pub host: Arc<FakeHost>,
}

pub fn test_world() -> TestWorld {
    let store = Arc::new(MemoryStore::default());
    let backend = Arc::new(StubBackend::default());
    let host = Arc::new(FakeHost::default());
    let state = AppState {
        config: test_config(),
        backend: backend.clone(),
        store: store.clone(),
        host: host.clone(),
        xuid_resolver: Arc::new(StubResolver {
            xuid: Some("9000".into()),
        }),
        differ: Arc::new(AsyncMutex::new(InventoryDiffer::default())),
        rules: Arc::new(RwLock::new(ItemRules::matscraft_defaults())),
        metrics: Arc::new(Metrics::default()),
        balance_gate: Arc::new(AsyncMutex::new(())),
        block_gate: Arc::new(AsyncMutex::new(())),
    };
    TestWorld {
        state,
        store,
        backend,
        host,
    }
}

pub fn linked(xuid: &str) -> PlayerLinkState {
    PlayerLinkState::linked(&Xuid(xuid.into()), "d-1".into(), "tester".into())
}
