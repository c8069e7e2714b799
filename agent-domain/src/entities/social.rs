// Group and teleport-request entities backing the chat command surface

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupData {
    pub name: String,
    pub owner: String,
    /// Players who have requested to join and await the owner's accept.
    #[serde(default)]
    pub pending: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl GroupData {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            name: name.into(),
            owner: owner.clone(),
            pending: Vec::new(),
            members: vec![owner],
        }
    }

    pub fn is_member(&self, player: &str) -> bool {
        self.members.iter().any(|member| member == player)
    }

    pub fn is_pending(&self, player: &str) -> bool {
        self.pending.iter().any(|name| name == player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Global,
    Group,
}

impl Default for ChatMode {
    fn default() -> Self {
        ChatMode::Global
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportRequest {
    pub requester: String,
    pub target: String,
    pub created_ms: i64,
    pub expires_ms: i64,
}

impl TeleportRequest {
    /// Requests expire after this long.
    pub const TIMEOUT_MS: i64 = 60_000;
    /// Maximum outstanding requests per requester.
    pub const MAX_PENDING: usize = 5;

    pub fn new(requester: impl Into<String>, target: impl Into<String>, now_ms: i64) -> Self {
        Self {
            requester: requester.into(),
            target: target.into(),
            created_ms: now_ms,
            expires_ms: now_ms + Self::TIMEOUT_MS,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_ms <= now_ms
    }
}
