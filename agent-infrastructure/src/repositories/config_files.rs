use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use agent_domain::ports::ConfigRepository;
use agent_domain::ItemRules;

pub struct FileConfigRepository;

impl FileConfigRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    /// A missing rules file means the stock rule set; an unreadable one is
    /// an error the caller decides about.
    async fn load_item_rules(&self, path: &str) -> anyhow::Result<ItemRules> {
        if !Path::new(path).exists() {
            warn!("item rules file {} not found, using defaults", path);
            return Ok(ItemRules::matscraft_defaults());
        }
        let content = fs::read_to_string(path).await?;
        let rules: ItemRules = serde_yaml::from_str(&content)?;
        Ok(rules)
    }

    async fn save_item_rules(&self, path: &str, rules: &ItemRules) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_yaml::to_string(rules)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
