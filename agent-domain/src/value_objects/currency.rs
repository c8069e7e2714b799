// Currency value object

use serde::{Deserialize, Serialize};

use crate::value_objects::ItemId;

/// The two economy counters mirrored between local score objectives and
/// the remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    Mats,
    Huh,
}

impl Currency {
    /// Name of the scoreboard objective holding the local mirror.
    pub fn objective(&self) -> &'static str {
        match self {
            Currency::Mats => "Mats",
            Currency::Huh => "Huh",
        }
    }

    pub fn item_id(&self) -> ItemId {
        match self {
            Currency::Mats => ItemId::new("matscraft:mats"),
            Currency::Huh => ItemId::new("matscraft:huh"),
        }
    }

    pub fn from_item_id(item: &ItemId) -> Option<Currency> {
        match item.0.as_str() {
            "matscraft:mats" => Some(Currency::Mats),
            "matscraft:huh" => Some(Currency::Huh),
            _ => None,
        }
    }

    pub const ALL: [Currency; 2] = [Currency::Mats, Currency::Huh];
}
