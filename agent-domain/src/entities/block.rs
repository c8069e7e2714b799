// Block break event as delivered by the game host

use serde::{Deserialize, Serialize};

use crate::entities::{BlockLocation, PlayerRef};
use crate::value_objects::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBreakEvent {
    pub player: PlayerRef,
    pub block_id: ItemId,
    pub location: BlockLocation,
    pub dimension: String,
    /// Type id of the tool held after the break, if any.
    #[serde(default)]
    pub tool: Option<ItemId>,
}
