//! Shared mutable game state and the per-user client view of it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::character::PlayerCharacter;
use crate::combat::Combat;
use crate::location::Location;

/// The authoritative world state shared by all connections.
///
/// Owned by the server behind a single async lock; the session registry and
/// model gateway never touch it directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// User id -> that user's character.
    #[serde(default)]
    pub player_characters: HashMap<String, PlayerCharacter>,
    #[serde(default)]
    pub locations: HashMap<String, Location>,
    #[serde(default)]
    pub active_combats: HashMap<String, Combat>,
}

impl GameState {
    pub fn character(&self, user_id: &str) -> Option<&PlayerCharacter> {
        self.player_characters.get(user_id)
    }

    pub fn character_mut(&mut self, user_id: &str) -> Option<&mut PlayerCharacter> {
        self.player_characters.get_mut(user_id)
    }

    pub fn location(&self, location_id: &str) -> Option<&Location> {
        self.locations.get(location_id)
    }

    /// Build the client-facing snapshot for one user's character.
    pub fn view_for(&self, user_id: &str) -> Option<GameStateView> {
        let pc = self.character(user_id)?;
        let current_location = self.location(&pc.current_location_id).cloned();
        let combat = pc
            .active_combat_id
            .as_deref()
            .and_then(|id| self.active_combats.get(id))
            .cloned();
        Some(GameStateView {
            in_combat: combat.is_some(),
            player_character: pc.clone(),
            current_location,
            combat,
        })
    }
}

/// What one client sees after each turn: its character, where it stands,
/// and any combat it is part of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub player_character: PlayerCharacter,
    pub current_location: Option<Location>,
    pub in_combat: bool,
    pub combat: Option<Combat>,
}
