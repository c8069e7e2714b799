use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use agent_application::{AppState, Metrics};
use agent_domain::ports::{ConfigRepository, GameHost};
use agent_domain::services::InventoryDiffer;
use agent_domain::ItemRules;
use agent_infrastructure::{
    AppConfig, FileConfigRepository, FileStateRepository, HttpBackendApi, LookupXuidResolver,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(host: Arc<dyn GameHost>) -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = Arc::new(FileStateRepository::new(runtime_config.data_dir.clone()));
        let config_repo = FileConfigRepository::new();
        let rules = config_repo
            .load_item_rules(&runtime_config.item_rules_path)
            .await
            .unwrap_or_else(|err| {
                warn!("failed to load item rules, using defaults: {}", err);
                ItemRules::matscraft_defaults()
            });

        let backend = Arc::new(HttpBackendApi::new(&runtime_config)?);
        let xuid_resolver = Arc::new(LookupXuidResolver::new(&runtime_config)?);

        let state = AppState {
            config: runtime_config,
            backend,
            store,
            host,
            xuid_resolver,
            differ: Arc::new(Mutex::new(InventoryDiffer::default())),
            rules: Arc::new(RwLock::new(rules)),
            metrics: Arc::new(Metrics::default()),
            balance_gate: Arc::new(Mutex::new(())),
            block_gate: Arc::new(Mutex::new(())),
        };

        Ok(Self { state })
    }
}
