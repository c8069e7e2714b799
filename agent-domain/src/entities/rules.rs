// Item rules loaded from configuration
// Which items the poller tracks, which are stripped on sight, and which
// ores each pickaxe tier is allowed to harvest

use serde::{Deserialize, Serialize};

use crate::value_objects::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickaxeAbility {
    pub item_id: ItemId,
    pub allowed_blocks: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRules {
    /// Item types the poller reacts to at all.
    pub tracked_items: Vec<ItemId>,
    /// Item types stripped from inventories right after diffing.
    pub auto_remove_items: Vec<ItemId>,
    /// Items exempt from the unlinked-player strip (the phone is handed
    /// out before linking).
    pub exempt_items: Vec<ItemId>,
    pub pickaxes: Vec<PickaxeAbility>,
    /// Namespace whose blocks are recorded on break.
    pub ore_namespace: String,
}

impl Default for ItemRules {
    fn default() -> Self {
        Self::matscraft_defaults()
    }
}

impl ItemRules {
    /// The stock MatsCraft rule set, used when no rules file is present.
    pub fn matscraft_defaults() -> Self {
        let ores = [
            "matscraft:common_mats_ore",
            "matscraft:uncommon_mats_ore",
            "matscraft:rare_mats_ore",
            "matscraft:epic_mats_ore",
            "matscraft:legendary_mats_ore",
        ];
        let mut tracked: Vec<ItemId> = vec![
            ItemId::new("matscraft:mats"),
            ItemId::new("matscraft:huh"),
        ];
        tracked.extend(ores.iter().map(|id| ItemId::new(*id)));

        Self {
            tracked_items: tracked,
            auto_remove_items: vec![
                ItemId::new("matscraft:mats"),
                ItemId::new("matscraft:huh"),
            ],
            exempt_items: vec![ItemId::new("matsphone:matsphone")],
            pickaxes: vec![
                PickaxeAbility {
                    item_id: ItemId::new("matscraft:nanndo_pickaxe"),
                    allowed_blocks: ores[..2].iter().map(|id| ItemId::new(*id)).collect(),
                },
                PickaxeAbility {
                    item_id: ItemId::new("matscraft:lowpolyduck_pickaxe"),
                    allowed_blocks: ores[..4].iter().map(|id| ItemId::new(*id)).collect(),
                },
                PickaxeAbility {
                    item_id: ItemId::new("matscraft:mezo_pickaxe"),
                    allowed_blocks: ores.iter().map(|id| ItemId::new(*id)).collect(),
                },
            ],
            ore_namespace: "matscraft".to_string(),
        }
    }

    pub fn is_tracked(&self, item: &ItemId) -> bool {
        self.tracked_items.contains(item)
    }

    pub fn is_auto_remove(&self, item: &ItemId) -> bool {
        self.auto_remove_items.contains(item)
    }

    pub fn is_exempt(&self, item: &ItemId) -> bool {
        self.exempt_items.contains(item)
    }

    pub fn is_recorded_block(&self, block: &ItemId) -> bool {
        block.namespace() == Some(self.ore_namespace.as_str())
    }

    /// Whether the given tool may harvest the given block. Unknown tools
    /// harvest nothing.
    pub fn pickaxe_allows(&self, tool: Option<&ItemId>, block: &ItemId) -> bool {
        let Some(tool) = tool else {
            return false;
        };
        self.pickaxes
            .iter()
            .find(|ability| &ability.item_id == tool)
            .map(|ability| ability.allowed_blocks.contains(block))
            .unwrap_or(false)
    }
}
