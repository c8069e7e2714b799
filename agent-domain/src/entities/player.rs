// Player-facing entities: host handle, link state, backend account

use serde::{Deserialize, Serialize};

use crate::value_objects::{PlayerId, Xuid};

/// Handle to a connected player as reported by the game host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id.into()),
            name: name.into(),
        }
    }
}

/// Persisted per-player account-link record.
///
/// Owned by the auth flow; every economy feature gates on `is_linked`.
/// The default is fail-closed: unlinked, no external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLinkState {
    pub xuid: String,
    pub is_linked: bool,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub discord_username: Option<String>,
}

impl PlayerLinkState {
    pub fn unlinked(xuid: &Xuid) -> Self {
        Self {
            xuid: xuid.0.clone(),
            is_linked: false,
            discord_id: None,
            discord_username: None,
        }
    }

    pub fn linked(xuid: &Xuid, discord_id: String, discord_username: String) -> Self {
        Self {
            xuid: xuid.0.clone(),
            is_linked: true,
            discord_id: Some(discord_id),
            discord_username: Some(discord_username),
        }
    }

    pub fn xuid(&self) -> Xuid {
        Xuid(self.xuid.clone())
    }
}

/// Local mirror of the authoritative remote balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub mats: i64,
    pub huh: i64,
}

/// Account payload returned by `GET /users/{xuid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub discord_id: String,
    pub discord_username: String,
    #[serde(default)]
    pub mats: i64,
    #[serde(default)]
    pub huh: i64,
}

impl PlayerAccount {
    pub fn balance(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            mats: self.mats,
            huh: self.huh,
        }
    }
}

/// Result of submitting a verification code to the auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked(PlayerAccount),
    Rejected(String),
}
