use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use agent_domain::ports::XuidResolver;
use agent_domain::{RuntimeConfig, Xuid};

/// Gamertag-to-XUID lookup against a geyser-style REST service, with an
/// optional secondary provider tried when the primary fails.
pub struct LookupXuidResolver {
    client: Client,
    primary_url: String,
    fallback_url: Option<String>,
}

impl LookupXuidResolver {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            primary_url: config.xuid_lookup_url.trim_end_matches('/').to_string(),
            fallback_url: config
                .xuid_fallback_lookup_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    async fn lookup(&self, base_url: &str, gamertag: &str) -> Result<Xuid> {
        let body: XuidBody = self
            .client
            .get(format!("{base_url}/{gamertag}"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_xuid(body)
    }
}

/// Providers disagree on the field type: geyser returns a number,
/// others a string.
#[derive(Debug, Deserialize)]
struct XuidBody {
    xuid: serde_json::Value,
}

fn parse_xuid(body: XuidBody) -> Result<Xuid> {
    match body.xuid {
        serde_json::Value::String(value) if !value.trim().is_empty() => {
            Ok(Xuid(value.trim().to_string()))
        }
        serde_json::Value::Number(value) => Ok(Xuid(value.to_string())),
        other => Err(anyhow!("unusable xuid value: {}", other)),
    }
}

#[async_trait]
impl XuidResolver for LookupXuidResolver {
    async fn resolve(&self, gamertag: &str) -> Result<Xuid> {
        match self.lookup(&self.primary_url, gamertag).await {
            Ok(xuid) => Ok(xuid),
            Err(primary_err) => {
                let Some(fallback) = &self.fallback_url else {
                    return Err(primary_err);
                };
                warn!(
                    gamertag,
                    "primary XUID lookup failed, trying fallback: {}", primary_err
                );
                self.lookup(fallback, gamertag).await
            }
        }
    }
}
