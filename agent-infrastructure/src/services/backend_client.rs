use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use agent_domain::ports::BackendApi;
use agent_domain::services::issue_token;
use agent_domain::utils::current_seconds;
use agent_domain::{
    BalanceSnapshot, LinkOutcome, PendingBlock, PlayerAccount, RuntimeConfig, Xuid,
};

const SECRET_HEADER: &str = "matscraft-secret";

/// Authenticated JSON client for the remote economy backend. Every request
/// carries a freshly issued short-lived token in the `matscraft-secret`
/// header.
pub struct HttpBackendApi {
    client: Client,
    base_url: String,
    secret_key: String,
    token_ttl_seconds: i64,
}

impl HttpBackendApi {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            token_ttl_seconds: config.token_ttl_seconds,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn secret(&self) -> Result<String> {
        issue_token(&self.secret_key, self.token_ttl_seconds, current_seconds())
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BalanceEnvelope {
    balance: BalanceSnapshot,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn fetch_account(&self, xuid: &Xuid) -> Result<Option<PlayerAccount>> {
        let response = self
            .client
            .get(self.url(&format!("/users/{}", xuid.0)))
            .header(SECRET_HEADER, self.secret()?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: DataEnvelope<PlayerAccount> =
            response.error_for_status()?.json().await?;
        Ok(Some(envelope.data))
    }

    async fn sync_balance(&self, xuid: &Xuid, mats: i64, huh: i64) -> Result<BalanceSnapshot> {
        let response = self
            .client
            .post(self.url(&format!("/users/{}/update_balance", xuid.0)))
            .query(&[("type", "item_pickup")])
            .header(SECRET_HEADER, self.secret()?)
            .json(&json!({ "data": { "mats": mats, "huh": huh } }))
            .send()
            .await?;
        let envelope: BalanceEnvelope = response.error_for_status()?.json().await?;
        Ok(envelope.balance)
    }

    async fn insert_blocks(&self, blocks: &[PendingBlock]) -> Result<()> {
        self.client
            .post(self.url("/users/blocks"))
            .header(SECRET_HEADER, self.secret()?)
            .json(&json!({ "data": blocks }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn verify_link(&self, xuid: &Xuid, username: &str, code: &str) -> Result<LinkOutcome> {
        let response = self
            .client
            .post(self.url(&format!("/users/{}/verify", xuid.0)))
            .header(SECRET_HEADER, self.secret()?)
            .json(&json!({ "data": { "username": username, "code": code } }))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            let envelope: DataEnvelope<PlayerAccount> = response.json().await?;
            return Ok(LinkOutcome::Linked(envelope.data));
        }
        // 4xx is a decision, not a failure: the code was wrong or expired.
        if status.is_client_error() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Invalid Token".to_string());
            return Ok(LinkOutcome::Rejected(message));
        }
        Err(anyhow!("verification endpoint responded {}", status))
    }

    async fn logout(&self, xuid: &Xuid) -> Result<()> {
        self.client
            .post(self.url(&format!("/users/{}/logout", xuid.0)))
            .header(SECRET_HEADER, self.secret()?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/users/ping"))
            .header(SECRET_HEADER, self.secret()?)
            .send()
            .await?;
        if response.status().is_server_error() {
            anyhow::bail!("backend responded {}", response.status());
        }
        Ok(())
    }
}
