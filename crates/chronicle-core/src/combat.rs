//! Combat encounter state.

use serde::{Deserialize, Serialize};

/// An active combat encounter tied to one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combat {
    pub id: String,
    pub location_id: String,
    pub round: u32,
    /// Id of the combatant whose turn it is.
    pub current_turn: String,
    #[serde(default)]
    pub initiative_order: Vec<String>,
}

impl Combat {
    pub fn new(id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location_id: location_id.into(),
            round: 1,
            current_turn: String::new(),
            initiative_order: Vec::new(),
        }
    }
}
