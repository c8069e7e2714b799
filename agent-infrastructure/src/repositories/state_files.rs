use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use agent_domain::ports::StateRepository;
use agent_domain::{
    ChatMode, GroupData, PendingBalance, PendingBlock, PlayerLinkState, TeleportRequest,
};

const SCHEMA_VERSION: u32 = 1;

/// Versioned on-disk envelope. Earlier deployments wrote the bare payload,
/// so loads fall back to the raw shape before giving up.
#[derive(Debug, Serialize, Deserialize)]
struct VersionedFile<T> {
    schema_version: u32,
    data: T,
}

/// One JSON file per state slot under `data_dir`. Loads degrade to the
/// default value on missing or unreadable files; saves propagate errors.
pub struct FileStateRepository {
    data_dir: PathBuf,
}

impl FileStateRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn slot_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    async fn load_slot<T>(&self, name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.slot_path(name);
        if !path.exists() {
            return T::default();
        }
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                warn!("failed to read {}: {}", path.display(), err);
                return T::default();
            }
        };
        if let Ok(envelope) = serde_json::from_str::<VersionedFile<T>>(&content) {
            return envelope.data;
        }
        // legacy layout without the envelope
        match serde_json::from_str::<T>(&content) {
            Ok(data) => data,
            Err(err) => {
                warn!("corrupt state file {}, resetting: {}", path.display(), err);
                T::default()
            }
        }
    }

    async fn save_slot<T>(&self, name: &str, data: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let path = self.slot_path(name);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !Path::new(parent).exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        let envelope = VersionedFile {
            schema_version: SCHEMA_VERSION,
            data,
        };
        let content = serde_json::to_string(&envelope)?;
        fs::write(&path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl StateRepository for FileStateRepository {
    async fn load_pending_blocks(&self) -> anyhow::Result<Vec<PendingBlock>> {
        Ok(self.load_slot("pending_blocks.json").await)
    }

    async fn save_pending_blocks(&self, blocks: &[PendingBlock]) -> anyhow::Result<()> {
        self.save_slot("pending_blocks.json", &blocks).await
    }

    async fn load_pending_balance(&self, xuid: &str) -> anyhow::Result<Option<PendingBalance>> {
        let balances: HashMap<String, PendingBalance> =
            self.load_slot("pending_balances.json").await;
        Ok(balances.get(xuid).cloned())
    }

    async fn save_pending_balance(&self, pending: &PendingBalance) -> anyhow::Result<()> {
        let mut balances: HashMap<String, PendingBalance> =
            self.load_slot("pending_balances.json").await;
        balances.insert(pending.xuid.clone(), pending.clone());
        self.save_slot("pending_balances.json", &balances).await
    }

    async fn list_pending_balances(&self) -> anyhow::Result<Vec<PendingBalance>> {
        let balances: HashMap<String, PendingBalance> =
            self.load_slot("pending_balances.json").await;
        Ok(balances.into_values().collect())
    }

    async fn load_link_state(&self, player_name: &str) -> anyhow::Result<Option<PlayerLinkState>> {
        let links: HashMap<String, PlayerLinkState> = self.load_slot("link_states.json").await;
        Ok(links.get(player_name).cloned())
    }

    async fn save_link_state(
        &self,
        player_name: &str,
        state: &PlayerLinkState,
    ) -> anyhow::Result<()> {
        let mut links: HashMap<String, PlayerLinkState> = self.load_slot("link_states.json").await;
        links.insert(player_name.to_string(), state.clone());
        self.save_slot("link_states.json", &links).await
    }

    async fn list_link_states(&self) -> anyhow::Result<HashMap<String, PlayerLinkState>> {
        Ok(self.load_slot("link_states.json").await)
    }

    async fn load_groups(&self) -> anyhow::Result<HashMap<String, GroupData>> {
        Ok(self.load_slot("groups.json").await)
    }

    async fn save_groups(&self, groups: &HashMap<String, GroupData>) -> anyhow::Result<()> {
        self.save_slot("groups.json", groups).await
    }

    async fn load_chat_modes(&self) -> anyhow::Result<HashMap<String, ChatMode>> {
        Ok(self.load_slot("chat_modes.json").await)
    }

    async fn save_chat_modes(&self, modes: &HashMap<String, ChatMode>) -> anyhow::Result<()> {
        self.save_slot("chat_modes.json", modes).await
    }

    async fn load_teleport_requests(&self) -> anyhow::Result<Vec<TeleportRequest>> {
        Ok(self.load_slot("teleport_requests.json").await)
    }

    async fn save_teleport_requests(&self, requests: &[TeleportRequest]) -> anyhow::Result<()> {
        self.save_slot("teleport_requests.json", &requests).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use agent_domain::{BlockLocation, Xuid};

    static DIR_SEQ: AtomicU64 = AtomicU64::new(0);

    fn temp_repo() -> FileStateRepository {
        let dir = std::env::temp_dir().join(format!(
            "matscraft-state-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        FileStateRepository::new(dir)
    }

    fn block(x: i32) -> PendingBlock {
        PendingBlock::new(
            &Xuid("9000".into()),
            "common_mats_ore",
            BlockLocation { x, y: 0, z: 0 },
            "mezo_pickaxe",
            "2026-01-01T00:00:00+00:00".into(),
        )
    }

    #[tokio::test]
    async fn pending_blocks_round_trip_in_order() {
        let repo = temp_repo();
        let blocks = vec![block(1), block(2), block(3)];

        repo.save_pending_blocks(&blocks).await.unwrap();
        let loaded = repo.load_pending_blocks().await.unwrap();

        assert_eq!(loaded, blocks);
    }

    #[tokio::test]
    async fn missing_files_load_as_defaults() {
        let repo = temp_repo();

        assert!(repo.load_pending_blocks().await.unwrap().is_empty());
        assert!(repo.load_groups().await.unwrap().is_empty());
        assert!(repo.load_link_state("Steve").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_files_load_as_defaults() {
        let repo = temp_repo();
        fs::create_dir_all(&repo.data_dir).await.unwrap();
        fs::write(repo.slot_path("pending_blocks.json"), "{not json")
            .await
            .unwrap();

        assert!(repo.load_pending_blocks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_files_without_envelope_still_load() {
        let repo = temp_repo();
        let blocks = vec![block(7)];
        fs::create_dir_all(&repo.data_dir).await.unwrap();
        fs::write(
            repo.slot_path("pending_blocks.json"),
            serde_json::to_string(&blocks).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(repo.load_pending_blocks().await.unwrap(), blocks);
    }

    #[tokio::test]
    async fn balance_saves_upsert_by_xuid() {
        let repo = temp_repo();
        let mut first = PendingBalance::new(&Xuid("1".into()), "d-1", 0);
        first.add(agent_domain::Currency::Mats, 3);
        repo.save_pending_balance(&first).await.unwrap();

        let mut updated = first.clone();
        updated.add(agent_domain::Currency::Huh, 2);
        repo.save_pending_balance(&updated).await.unwrap();
        repo.save_pending_balance(&PendingBalance::new(&Xuid("2".into()), "d-2", 0))
            .await
            .unwrap();

        assert_eq!(repo.load_pending_balance("1").await.unwrap(), Some(updated));
        assert_eq!(repo.list_pending_balances().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn link_states_are_keyed_by_player_name() {
        let repo = temp_repo();
        let link = PlayerLinkState::linked(&Xuid("9000".into()), "d-1".into(), "tester".into());
        repo.save_link_state("Steve", &link).await.unwrap();

        assert_eq!(repo.load_link_state("Steve").await.unwrap(), Some(link));
        assert!(repo.load_link_state("Alex").await.unwrap().is_none());
    }
}
