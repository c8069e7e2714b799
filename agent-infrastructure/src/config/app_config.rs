use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use agent_domain::RuntimeConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3235".to_string(),
            api_token: None,
            base_url: "http://127.0.0.1:8000".to_string(),
            secret_key: "matscraft-dev-secret".to_string(),
            token_ttl_seconds: 300,
            poll_interval_ms: 250,
            balance_sync_seconds: 30,
            sweep_interval_seconds: 5,
            block_batch_size: 10,
            request_timeout_seconds: 15,
            max_body_bytes: 1024 * 1024,
            data_dir: "./data".to_string(),
            item_rules_path: "./item_rules.yaml".to_string(),
            xuid_lookup_url: "https://api.geysermc.org/v2/xuid".to_string(),
            xuid_fallback_lookup_url: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("MATSCRAFT_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        if let Some(fallback) = &self.xuid_fallback_lookup_url {
            if fallback.trim().is_empty() {
                self.xuid_fallback_lookup_url = None;
            }
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.xuid_lookup_url = self.xuid_lookup_url.trim_end_matches('/').to_string();
        if let Some(fallback) = &mut self.xuid_fallback_lookup_url {
            *fallback = fallback.trim_end_matches('/').to_string();
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.data_dir = resolve_path(base, &self.data_dir);
        self.item_rules_path = resolve_path(base, &self.item_rules_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(anyhow!("secret_key must not be empty"));
        }
        if self.token_ttl_seconds <= 0 {
            return Err(anyhow!("token_ttl_seconds must be greater than 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than 0"));
        }
        if self.block_batch_size == 0 {
            return Err(anyhow!("block_batch_size must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            base_url: self.base_url.clone(),
            secret_key: self.secret_key.clone(),
            token_ttl_seconds: self.token_ttl_seconds,
            poll_interval_ms: self.poll_interval_ms,
            balance_sync_seconds: self.balance_sync_seconds,
            sweep_interval_seconds: self.sweep_interval_seconds,
            block_batch_size: self.block_batch_size,
            request_timeout_seconds: self.request_timeout_seconds,
            max_body_bytes: self.max_body_bytes,
            data_dir: self.data_dir.clone(),
            item_rules_path: self.item_rules_path.clone(),
            xuid_lookup_url: self.xuid_lookup_url.clone(),
            xuid_fallback_lookup_url: self.xuid_fallback_lookup_url.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("MATSCRAFT_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("MATSCRAFT_BASE_URL") {
            self.base_url = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_SECRET_KEY") {
            self.secret_key = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_TOKEN_TTL_SECONDS") {
            self.token_ttl_seconds = value.parse().unwrap_or(self.token_ttl_seconds);
        }
        if let Ok(value) = env::var("MATSCRAFT_POLL_INTERVAL_MS") {
            self.poll_interval_ms = value.parse().unwrap_or(self.poll_interval_ms);
        }
        if let Ok(value) = env::var("MATSCRAFT_BALANCE_SYNC_SECONDS") {
            self.balance_sync_seconds = value.parse().unwrap_or(self.balance_sync_seconds);
        }
        if let Ok(value) = env::var("MATSCRAFT_SWEEP_INTERVAL_SECONDS") {
            self.sweep_interval_seconds = value.parse().unwrap_or(self.sweep_interval_seconds);
        }
        if let Ok(value) = env::var("MATSCRAFT_BLOCK_BATCH_SIZE") {
            self.block_batch_size = value.parse().unwrap_or(self.block_batch_size);
        }
        if let Ok(value) = env::var("MATSCRAFT_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("MATSCRAFT_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("MATSCRAFT_DATA_DIR") {
            self.data_dir = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_ITEM_RULES_PATH") {
            self.item_rules_path = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_XUID_LOOKUP_URL") {
            self.xuid_lookup_url = value;
        }
        if let Ok(value) = env::var("MATSCRAFT_XUID_FALLBACK_LOOKUP_URL") {
            self.xuid_fallback_lookup_url = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_optionals_normalize_to_none() {
        let mut config = AppConfig {
            api_token: Some("   ".into()),
            xuid_fallback_lookup_url: Some("".into()),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.api_token, None);
        assert_eq!(config.xuid_fallback_lookup_url, None);
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_urls() {
        let mut config = AppConfig {
            base_url: "http://backend:8000/".into(),
            xuid_lookup_url: "https://lookup/v2/xuid/".into(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.base_url, "http://backend:8000");
        assert_eq!(config.xuid_lookup_url, "https://lookup/v2/xuid");
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let config = AppConfig {
            bind_addr: "not-an-addr".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_secret_key_is_rejected() {
        let config = AppConfig {
            secret_key: " ".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_the_config_dir() {
        let mut config = AppConfig {
            data_dir: "data".into(),
            item_rules_path: "/etc/matscraft/item_rules.yaml".into(),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/srv/matscraft")));
        assert_eq!(config.data_dir, "/srv/matscraft/data");
        assert_eq!(config.item_rules_path, "/etc/matscraft/item_rules.yaml");
    }

    #[test]
    fn runtime_config_mirrors_the_loaded_values() {
        let config = AppConfig {
            block_batch_size: 25,
            balance_sync_seconds: 45,
            ..AppConfig::default()
        };
        let runtime = config.to_runtime_config();
        assert_eq!(runtime.block_batch_size, 25);
        assert_eq!(runtime.balance_deadline_ms(), 45_000);
    }
}
