use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::info;

use agent_domain::ports::GameHost;
use agent_domain::{BlockLocation, Currency, ItemId, ItemStack, PlayerId, PlayerRef};

/// In-memory world used when the agent runs without a game server
/// attached. Player-visible output goes to the log; world mutations are
/// recorded so the poll and sweep loops behave as they would in-game.
#[derive(Default)]
pub struct SimGameHost {
    players: Mutex<Vec<PlayerRef>>,
    inventories: Mutex<HashMap<String, Vec<ItemStack>>>,
    scores: Mutex<HashMap<(String, Currency), i64>>,
    tags: Mutex<HashMap<String, HashSet<String>>>,
}

impl SimGameHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_player(&self, player: PlayerRef) {
        self.inventories
            .lock()
            .unwrap()
            .entry(player.id.0.clone())
            .or_default();
        self.players.lock().unwrap().push(player);
    }

    pub fn despawn_player(&self, player: &PlayerId) {
        self.players.lock().unwrap().retain(|p| &p.id != player);
        self.inventories.lock().unwrap().remove(&player.0);
    }

    pub fn give_item(&self, player: &PlayerId, item: ItemId, amount: u32) {
        let mut inventories = self.inventories.lock().unwrap();
        inventories
            .entry(player.0.clone())
            .or_default()
            .push(ItemStack { item, amount });
    }
}

impl GameHost for SimGameHost {
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
            .ok_or_else(|| anyhow::anyhow!("player {} not in world", player.0))
    }

    fn clear_item(&self, player: &PlayerId, item: &ItemId) -> anyhow::Result<u32> {
        let mut inventories = self.inventories.lock().unwrap();
        let Some(stacks) = inventories.get_mut(&player.0) else {
            anyhow::bail!("player {} not in world", player.0);
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
        info!(player = %player.0, "[action bar] {}", message);
    }

    fn send_message(&self, player: &PlayerId, message: &str) {
        info!(player = %player.0, "[chat] {}", message);
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
        info!(player = %player.0, to = %to.0, "teleport");
        Ok(())
    }

    fn restore_block(&self, dimension: &str, location: &BlockLocation, block_id: &ItemId) {
        info!(
            dimension,
            x = location.x,
            y = location.y,
            z = location.z,
            block = %block_id,
            "restored block"
        );
    }

    fn clear_drops(&self, dimension: &str, location: &BlockLocation) {
        info!(
            dimension,
            x = location.x,
            y = location.y,
            z = location.z,
            "cleared drops"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_item_removes_all_stacks_of_the_type() {
        let host = SimGameHost::new();
        let player = PlayerRef::new("p1", "Steve");
        host.spawn_player(player.clone());
        host.give_item(&player.id, ItemId::new("matscraft:mats"), 3);
        host.give_item(&player.id, ItemId::new("matscraft:mats"), 2);
        host.give_item(&player.id, ItemId::new("minecraft:dirt"), 1);

        let removed = host
            .clear_item(&player.id, &ItemId::new("matscraft:mats"))
            .unwrap();

        assert_eq!(removed, 5);
        assert_eq!(host.read_inventory(&player.id).unwrap().len(), 1);
    }

    #[test]
    fn despawned_player_inventory_reads_fail() {
        let host = SimGameHost::new();
        let player = PlayerRef::new("p1", "Steve");
        host.spawn_player(player.clone());
        host.despawn_player(&player.id);

        assert!(host.read_inventory(&player.id).is_err());
        assert!(host.players().is_empty());
    }
}
