//! Generation parameters shared by all backends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for one generation request.
///
/// The struct serializes with a fixed field order and the extras live in a
/// sorted map, so two equal parameter sets always produce the same JSON.
/// That keeps cache keys order-independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Override the backend's configured model for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Provider-specific extras, sorted by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Canonical JSON rendering used for cache keying.
    pub fn canonical_json(&self) -> String {
        // Serialization of this struct cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_ignores_extra_insertion_order() {
        let mut a = GenerationParams::new().temperature(0.7);
        a.extra.insert("b".to_string(), json!(2));
        a.extra.insert("a".to_string(), json!(1));

        let mut b = GenerationParams::new().temperature(0.7);
        b.extra.insert("a".to_string(), json!(1));
        b.extra.insert("b".to_string(), json!(2));

        assert_eq!(a.canonical_json(), b.canonical_json());
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let params = GenerationParams::new();
        assert_eq!(params.canonical_json(), "{}");
    }
}
