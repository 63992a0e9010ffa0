use serde::{Deserialize, Serialize};

use crate::entity::Component;
use crate::player::PlayerStateKind;

/// Marks an entity the player can collect for points. Magnetic players pull
/// every entity carrying this component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleComponent {
    /// Points awarded on pickup.
    pub value: u32,
}

impl Component for CollectibleComponent {}

/// Effect granted by a gift box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftComponent {
    /// Player state entered on pickup.
    pub effect: PlayerStateKind,
}

impl Component for GiftComponent {}

/// Level exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalComponent {
    /// Set the first time a player touches the goal.
    pub reached: bool,
}

impl Component for GoalComponent {}
