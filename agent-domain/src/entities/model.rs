// Runtime configuration shared across layers

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub base_url: String,
    pub secret_key: String,
    pub token_ttl_seconds: i64,
    pub poll_interval_ms: u64,
    pub balance_sync_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub block_batch_size: usize,
    pub request_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub data_dir: String,
    pub item_rules_path: String,
    pub xuid_lookup_url: String,
    pub xuid_fallback_lookup_url: Option<String>,
}

impl RuntimeConfig {
    pub fn balance_deadline_ms(&self) -> i64 {
        (self.balance_sync_seconds as i64) * 1_000
    }
}
