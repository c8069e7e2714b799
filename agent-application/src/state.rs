use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use agent_domain::ports::{BackendApi, GameHost, StateRepository, XuidResolver};
use agent_domain::services::InventoryDiffer;
use agent_domain::{ItemRules, RuntimeConfig};

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub backend: Arc<dyn BackendApi>,
    pub store: Arc<dyn StateRepository>,
    pub host: Arc<dyn GameHost>,
    pub xuid_resolver: Arc<dyn XuidResolver>,
    pub differ: Arc<Mutex<InventoryDiffer>>,
    pub rules: Arc<RwLock<ItemRules>>,
    pub metrics: Arc<Metrics>,
    /// Serializes load/flush/save on the pending balance aggregates. A
    /// pickup saved while a flush is in flight must not be overwritten
    /// by the flush clearing its stale copy.
    pub balance_gate: Arc<Mutex<()>>,
    /// Same, for the pending block queue.
    pub block_gate: Arc<Mutex<()>>,
}
