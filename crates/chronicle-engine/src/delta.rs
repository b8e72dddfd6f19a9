//! State deltas returned by the model and their application to the shared
//! game state.
//!
//! The model hands back partial objects; only recognized fields are
//! applied, everything else is ignored rather than rejected.

use serde_json::{Map, Value};
use tracing::debug;

use chronicle_core::{Combat, GameState, Location, Monster, PlayerCharacter};

/// What should happen to the character's combat after this turn.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatDirective {
    /// Start a combat, or advance the one already running.
    Engage(Value),
    /// End the active combat.
    Disengage,
    /// Leave combat state untouched.
    Unchanged,
}

/// Partial state changes extracted from one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDelta {
    pub player_character: Option<Map<String, Value>>,
    pub current_location: Option<Map<String, Value>>,
    pub combat: CombatDirective,
}

impl Default for TurnDelta {
    fn default() -> Self {
        Self {
            player_character: None,
            current_location: None,
            combat: CombatDirective::Unchanged,
        }
    }
}

impl TurnDelta {
    /// Extract a delta from a model payload. Missing or oddly-shaped
    /// sections yield an empty delta, never an error.
    pub fn from_model_payload(payload: &Value) -> Self {
        let changes = payload
            .get("game_state_changes")
            .and_then(Value::as_object);

        let section = |name: &str| -> Option<Map<String, Value>> {
            changes
                .and_then(|c| c.get(name))
                .and_then(Value::as_object)
                .cloned()
        };

        let combat = match payload.get("in_combat").and_then(Value::as_bool) {
            Some(true) => payload
                .get("combat")
                .filter(|c| c.is_object())
                .cloned()
                .map(CombatDirective::Engage)
                .unwrap_or(CombatDirective::Unchanged),
            Some(false) => CombatDirective::Disengage,
            None => CombatDirective::Unchanged,
        };

        Self {
            player_character: section("player_character"),
            current_location: section("current_location"),
            combat,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.player_character.is_none()
            && self.current_location.is_none()
            && self.combat == CombatDirective::Unchanged
    }

    /// Apply this delta to the shared state for one user. Unknown fields
    /// are skipped with a debug log.
    pub fn apply(&self, state: &mut GameState, user_id: &str) {
        let Some(pc) = state.player_characters.get_mut(user_id) else {
            return;
        };

        if let Some(updates) = &self.player_character {
            apply_character_updates(pc, updates);
        }

        let location_id = pc.current_location_id.clone();
        let combat_location = location_id.clone();
        let character_id = pc.id.clone();

        if let Some(updates) = &self.current_location {
            if let Some(location) = state.locations.get_mut(&location_id) {
                apply_location_updates(location, updates);
            }
        }

        match &self.combat {
            CombatDirective::Engage(data) => {
                let combat_id = data
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("combat_{}", combat_location));

                let combat = state
                    .active_combats
                    .entry(combat_id.clone())
                    .or_insert_with(|| {
                        let mut combat = Combat::new(combat_id.clone(), combat_location.clone());
                        combat.current_turn = character_id.clone();
                        combat
                    });
                apply_combat_updates(combat, data);

                if let Some(pc) = state.player_characters.get_mut(user_id) {
                    pc.active_combat_id = Some(combat_id);
                }
            }
            CombatDirective::Disengage => {
                if let Some(pc) = state.player_characters.get_mut(user_id) {
                    if let Some(combat_id) = pc.active_combat_id.take() {
                        state.active_combats.remove(&combat_id);
                    }
                }
            }
            CombatDirective::Unchanged => {}
        }
    }
}

fn apply_character_updates(pc: &mut PlayerCharacter, updates: &Map<String, Value>) {
    for (key, value) in updates {
        match key.as_str() {
            "name" => set_string(&mut pc.name, value),
            "race" => set_string(&mut pc.race, value),
            "class_name" => set_string(&mut pc.class_name, value),
            "current_location_id" => set_string(&mut pc.current_location_id, value),
            "level" => {
                if let Some(n) = value.as_u64() {
                    pc.level = n as u32;
                }
            }
            "hp" => set_i32(&mut pc.hp, value),
            "max_hp" => set_i32(&mut pc.max_hp, value),
            "ac" => set_i32(&mut pc.ac, value),
            "strength" => set_i32(&mut pc.strength, value),
            "dexterity" => set_i32(&mut pc.dexterity, value),
            "constitution" => set_i32(&mut pc.constitution, value),
            "intelligence" => set_i32(&mut pc.intelligence, value),
            "wisdom" => set_i32(&mut pc.wisdom, value),
            "charisma" => set_i32(&mut pc.charisma, value),
            "inventory" => {
                if let Ok(items) = serde_json::from_value(value.clone()) {
                    pc.inventory = items;
                }
            }
            other => debug!("Ignoring unknown character field '{}'", other),
        }
    }
}

fn apply_location_updates(location: &mut Location, updates: &Map<String, Value>) {
    for (key, value) in updates {
        match key.as_str() {
            "name" => set_string(&mut location.name, value),
            "description" => set_string(&mut location.description, value),
            "exits" => {
                if let Ok(exits) = serde_json::from_value(value.clone()) {
                    location.exits = exits;
                }
            }
            "npcs" => {
                if let Ok(npcs) = serde_json::from_value(value.clone()) {
                    location.npcs = npcs;
                }
            }
            "items" => {
                if let Ok(items) = serde_json::from_value(value.clone()) {
                    location.items = items;
                }
            }
            "monsters" => {
                if let Ok(monsters) = serde_json::from_value::<Vec<Monster>>(value.clone()) {
                    location.monsters = monsters;
                }
            }
            other => debug!("Ignoring unknown location field '{}'", other),
        }
    }
}

fn apply_combat_updates(combat: &mut Combat, data: &Value) {
    if let Some(round) = data.get("round").and_then(Value::as_u64) {
        combat.round = round as u32;
    }
    if let Some(turn) = data.get("current_turn").and_then(Value::as_str) {
        combat.current_turn = turn.to_string();
    }
    if let Some(order) = data.get("initiative_order") {
        if let Ok(order) = serde_json::from_value(order.clone()) {
            combat.initiative_order = order;
        }
    }
}

fn set_string(target: &mut String, value: &Value) {
    if let Some(s) = value.as_str() {
        *target = s.to_string();
    }
}

fn set_i32(target: &mut i32, value: &Value) {
    if let Some(n) = value.as_i64() {
        *target = n as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::PlayerCharacter;
    use serde_json::json;

    fn state_with_character() -> GameState {
        let mut state = GameState::default();
        let mut pc = PlayerCharacter::blank("u1");
        pc.name = "Thorn".to_string();
        state.player_characters.insert("u1".to_string(), pc);
        state.locations.insert(
            "town_square".to_string(),
            Location::new("town_square", "Town Square", "The square."),
        );
        state
    }

    #[test]
    fn test_rule_payload_updates_location_monsters() {
        let payload = json!({
            "success": true,
            "game_state_changes": {
                "current_location": {
                    "monsters": [{"id": "monster_1", "hp": 7, "max_hp": 15}]
                }
            }
        });
        let delta = TurnDelta::from_model_payload(&payload);
        assert!(!delta.is_empty());

        let mut state = state_with_character();
        delta.apply(&mut state, "u1");
        let monsters = &state.locations["town_square"].monsters;
        assert_eq!(monsters.len(), 1);
        assert_eq!(monsters[0].hp, 7);
    }

    #[test]
    fn test_character_partial_applies_known_fields_only() {
        let payload = json!({
            "game_state_changes": {
                "player_character": {"hp": 5, "nonsense": "ignored", "name": "Renamed"}
            }
        });
        let delta = TurnDelta::from_model_payload(&payload);

        let mut state = state_with_character();
        delta.apply(&mut state, "u1");
        let pc = state.character("u1").unwrap();
        assert_eq!(pc.hp, 5);
        assert_eq!(pc.name, "Renamed");
    }

    #[test]
    fn test_combat_engage_then_disengage() {
        let mut state = state_with_character();

        let start = TurnDelta::from_model_payload(&json!({
            "in_combat": true,
            "combat": {"round": 1, "initiative_order": ["u1", "monster_1"]}
        }));
        start.apply(&mut state, "u1");

        let pc = state.character("u1").unwrap();
        let combat_id = pc.active_combat_id.clone().expect("combat started");
        assert_eq!(state.active_combats[&combat_id].round, 1);
        assert_eq!(
            state.active_combats[&combat_id].initiative_order,
            vec!["u1".to_string(), "monster_1".to_string()]
        );

        // Same directive again advances the existing combat.
        let advance = TurnDelta::from_model_payload(&json!({
            "in_combat": true,
            "combat": {"round": 2}
        }));
        advance.apply(&mut state, "u1");
        assert_eq!(state.active_combats[&combat_id].round, 2);

        let end = TurnDelta::from_model_payload(&json!({"in_combat": false}));
        end.apply(&mut state, "u1");
        assert!(state.character("u1").unwrap().active_combat_id.is_none());
        assert!(state.active_combats.is_empty());
    }

    #[test]
    fn test_odd_payload_yields_empty_delta() {
        let delta = TurnDelta::from_model_payload(&json!("just a string"));
        assert!(delta.is_empty());

        let delta = TurnDelta::from_model_payload(&json!({"narrative": "story"}));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_apply_without_character_is_a_noop() {
        let delta = TurnDelta::from_model_payload(&json!({
            "game_state_changes": {"player_character": {"hp": 1}}
        }));
        let mut state = GameState::default();
        delta.apply(&mut state, "ghost");
        assert!(state.player_characters.is_empty());
    }
}
