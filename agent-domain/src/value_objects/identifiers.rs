// Identifier value objects

use serde::{Deserialize, Serialize};

/// Runtime entity id assigned by the game host. Stable for one session only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

/// Namespaced item or block type id, e.g. `matscraft:mats`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(':').map(|(ns, _)| ns)
    }

    /// Item id without its namespace, the form the backend expects.
    pub fn short_name(&self) -> &str {
        self.0.split_once(':').map(|(_, name)| name).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform-level external player identifier, resolved via a lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Xuid(pub String);

impl std::fmt::Display for Xuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_splits_namespace() {
        let id = ItemId::new("matscraft:common_mats_ore");
        assert_eq!(id.namespace(), Some("matscraft"));
        assert_eq!(id.short_name(), "common_mats_ore");
    }

    #[test]
    fn item_id_without_namespace_keeps_full_name() {
        let id = ItemId::new("stone");
        assert_eq!(id.namespace(), None);
        assert_eq!(id.short_name(), "stone");
    }
}
