//! The turn engine: player text in, narrative plus state delta out.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use chronicle_core::{Combat, Location, PlayerCharacter};
use chronicle_model::{GatewayError, GenerationParams, ModelGateway};

use crate::delta::TurnDelta;

const DM_SYSTEM_PROMPT: &str = "You are the Dungeon Master of a fantasy \
text adventure. Stay in the world, keep responses short and vivid, and \
respect the game state you are given.";

/// Everything the engine sees about the world when processing one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnSnapshot {
    pub player_character: PlayerCharacter,
    pub current_location: Option<Location>,
    pub active_combat: Option<Combat>,
    pub locations: HashMap<String, Location>,
}

/// Output of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub narrative: String,
    pub delta: TurnDelta,
}

/// Processes player turns against the model gateway.
///
/// Holds the gateway by handle; a fresh engine per test gets a fresh
/// gateway with its own cache.
pub struct TurnEngine {
    gateway: Arc<ModelGateway>,
    params: GenerationParams,
}

impl TurnEngine {
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        Self {
            gateway,
            params: GenerationParams::new().temperature(0.7).max_tokens(600),
        }
    }

    /// Process one player message.
    ///
    /// Provider failures never appear here; the gateway degrades them to
    /// mock output internally. The only error is [`GatewayError`] for an
    /// unresolvable backend, which callers report back to the player.
    pub async fn process(
        &self,
        input: &str,
        snapshot: &TurnSnapshot,
    ) -> Result<TurnResult, GatewayError> {
        let prompt = self.build_prompt(input, snapshot);
        let schema = turn_schema();

        let payload = self
            .gateway
            .generate_structured(
                &prompt,
                &schema,
                Some(&self.params),
                None,
                Some(DM_SYSTEM_PROMPT),
                true,
            )
            .await?;

        let delta = TurnDelta::from_model_payload(&payload);
        let narrative = match extract_narrative(&payload) {
            Some(text) => text,
            // Structured payload carried no usable story: narrate plainly.
            None => {
                self.gateway
                    .generate(input, Some(&self.params), None, Some(DM_SYSTEM_PROMPT), true)
                    .await?
            }
        };

        Ok(TurnResult { narrative, delta })
    }

    fn build_prompt(&self, input: &str, snapshot: &TurnSnapshot) -> String {
        let state_json = serde_json::to_string(snapshot).unwrap_or_default();
        format!(
            "The player says: \"{}\"\n\nCurrent game state:\n{}\n\nNarrate \
what happens as a narrative and report any rule-driven state changes.",
            input, state_json
        )
    }
}

fn extract_narrative(payload: &Value) -> Option<String> {
    for key in ["narrative", "narrative_summary"] {
        if let Some(text) = payload.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

fn turn_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "narrative": {
                "type": "string",
                "description": "What the player experiences this turn"
            },
            "game_state_changes": {
                "type": "object",
                "properties": {
                    "player_character": {"type": "object"},
                    "current_location": {"type": "object"}
                }
            },
            "in_combat": {"type": "boolean"},
            "combat": {"type": "object"}
        },
        "required": ["narrative"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_config::{BackendKind, BackendSettings, ModelConfig};
    use std::collections::BTreeMap;

    fn local_gateway() -> Arc<ModelGateway> {
        let mut backends = BTreeMap::new();
        backends.insert(
            "local".to_string(),
            BackendSettings {
                kind: BackendKind::Local,
                api_key: None,
                model: String::new(),
            },
        );
        Arc::new(ModelGateway::new(&ModelConfig {
            backends,
            default_backend: "local".to_string(),
            cache_max_size: 16,
            cache_ttl_secs: 3600,
            context_max_age_hours: 24,
        }))
    }

    fn snapshot() -> TurnSnapshot {
        let mut pc = PlayerCharacter::blank("u1");
        pc.name = "Thorn".to_string();
        TurnSnapshot {
            player_character: pc,
            current_location: Some(Location::new("town_square", "Town Square", "The square.")),
            active_combat: None,
            locations: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_process_always_yields_a_narrative() {
        let engine = TurnEngine::new(local_gateway());
        let result = engine
            .process("I attack the goblin", &snapshot())
            .await
            .unwrap();
        assert!(!result.narrative.is_empty());
    }

    #[tokio::test]
    async fn test_process_survives_empty_input() {
        let engine = TurnEngine::new(local_gateway());
        let result = engine.process("", &snapshot()).await.unwrap();
        assert!(!result.narrative.is_empty());
    }

    #[test]
    fn test_extract_narrative_prefers_narrative_key() {
        let payload = json!({"narrative": "a story", "narrative_summary": "short"});
        assert_eq!(extract_narrative(&payload).as_deref(), Some("a story"));

        let payload = json!({"narrative_summary": "short"});
        assert_eq!(extract_narrative(&payload).as_deref(), Some("short"));

        assert!(extract_narrative(&json!({})).is_none());
    }
}
