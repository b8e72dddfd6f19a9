//! Backend adapters.
//!
//! Providers form a closed set of variants behind one capability interface;
//! the gateway selects a variant at configuration time, never by runtime
//! type inspection. Both operations are infallible: every provider-side
//! failure is absorbed here and answered by the deterministic mock, tagged
//! [`Origin::Degraded`](crate::outcome::Origin).

mod anthropic;
mod gemini;
mod local;
mod openai;

pub use anthropic::AnthropicBackend;
pub use gemini::GeminiBackend;
pub use local::LocalBackend;
pub use openai::OpenAiBackend;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use chronicle_config::{BackendKind, BackendSettings};

use crate::mock;
use crate::outcome::Generated;
use crate::params::GenerationParams;

/// Internal provider failure, converted to a mock response at the dispatch
/// boundary and never surfaced to gateway callers.
#[derive(Debug, Error)]
pub(crate) enum ProviderError {
    #[error("no credential configured")]
    MissingCredential,
    #[error("network error: {0}")]
    Network(String),
    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One configured model backend.
#[derive(Debug)]
pub enum ModelBackend {
    OpenAi(OpenAiBackend),
    Anthropic(AnthropicBackend),
    Gemini(GeminiBackend),
    Local(LocalBackend),
}

impl ModelBackend {
    /// Build a backend from its configured settings.
    ///
    /// Unknown kinds are logged and skipped; the rest of the configuration
    /// stays usable.
    pub fn from_settings(name: &str, settings: &BackendSettings) -> Option<Self> {
        match settings.kind {
            BackendKind::OpenAi => Some(Self::OpenAi(OpenAiBackend::new(
                settings.api_key.clone(),
                settings.model.clone(),
            ))),
            BackendKind::Anthropic => Some(Self::Anthropic(AnthropicBackend::new(
                settings.api_key.clone(),
                settings.model.clone(),
            ))),
            BackendKind::Gemini => Some(Self::Gemini(GeminiBackend::new(
                settings.api_key.clone(),
                settings.model.clone(),
            ))),
            BackendKind::Local => Some(Self::Local(LocalBackend::new(settings.model.clone()))),
            BackendKind::Unknown => {
                warn!("Unknown backend type for '{}', skipping", name);
                None
            }
        }
    }

    /// Adapter kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::Anthropic(_) => "anthropic",
            Self::Gemini(_) => "gemini",
            Self::Local(_) => "local",
        }
    }

    /// Configured model identifier.
    pub fn model_id(&self) -> &str {
        match self {
            Self::OpenAi(b) => b.model(),
            Self::Anthropic(b) => b.model(),
            Self::Gemini(b) => b.model(),
            Self::Local(b) => b.model(),
        }
    }

    /// Generate free text. Never fails: provider failures degrade to the
    /// keyword-matched mock.
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        system_prompt: Option<&str>,
    ) -> Generated<String> {
        let attempt = match self {
            Self::OpenAi(b) => b.try_generate(prompt, params, system_prompt).await,
            Self::Anthropic(b) => b.try_generate(prompt, params, system_prompt).await,
            Self::Gemini(b) => b.try_generate(prompt, params, system_prompt).await,
            Self::Local(_) => Err(ProviderError::MissingCredential),
        };
        match attempt {
            Ok(text) => Generated::live(text),
            Err(e) => {
                self.log_degradation(&e);
                Generated::degraded(mock::mock_text(prompt))
            }
        }
    }

    /// Generate a schema-conformant payload. Never fails: parse and
    /// provider failures degrade to the schema-shaped mock.
    pub async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
        params: &GenerationParams,
        system_prompt: Option<&str>,
    ) -> Generated<Value> {
        let attempt = match self {
            Self::OpenAi(b) => {
                b.try_generate_structured(prompt, schema, params, system_prompt)
                    .await
            }
            Self::Anthropic(b) => {
                b.try_generate_structured(prompt, schema, params, system_prompt)
                    .await
            }
            Self::Gemini(b) => {
                b.try_generate_structured(prompt, schema, params, system_prompt)
                    .await
            }
            Self::Local(_) => Err(ProviderError::MissingCredential),
        };
        match attempt {
            Ok(value) => Generated::live(value),
            Err(e) => {
                self.log_degradation(&e);
                Generated::degraded(mock::mock_structured(prompt, schema))
            }
        }
    }

    fn log_degradation(&self, error: &ProviderError) {
        match error {
            ProviderError::MissingCredential => {
                debug!("{} backend has no credential, using mock response", self.kind());
            }
            other => {
                warn!("{} backend call failed ({}), using mock response", self.kind(), other);
            }
        }
    }
}

/// Append schema guidance to a prompt for providers without native JSON
/// output modes.
pub(crate) fn schema_prompt(prompt: &str, schema: &Value) -> String {
    format!(
        "{}\n\nRespond with a JSON object that follows this schema:\n{}",
        prompt,
        serde_json::to_string_pretty(schema).unwrap_or_default()
    )
}

/// Pull a JSON payload out of free text: a ```json fence first, a bare
/// ``` fence next, the whole string last.
pub(crate) fn extract_json_payload(text: &str) -> Result<Value, ProviderError> {
    let candidate = if let Some(start) = text.find("```json") {
        text[start + 7..]
            .split("```")
            .next()
            .unwrap_or_default()
            .trim()
    } else if let Some(stripped) = text
        .trim()
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
    {
        stripped.trim()
    } else {
        text.trim()
    };

    serde_json::from_str(candidate)
        .map_err(|e| ProviderError::Malformed(format!("JSON parse failed: {}", e)))
}

/// Shared request timeout for provider HTTP clients.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_from_fence() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        let value = extract_json_payload(text).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_json_from_bare_fence() {
        let value = extract_json_payload("```\n{\"b\": true}\n```").unwrap();
        assert_eq!(value, json!({"b": true}));
    }

    #[test]
    fn test_extract_json_whole_string() {
        let value = extract_json_payload(" {\"c\": [1, 2]} ").unwrap();
        assert_eq!(value, json!({"c": [1, 2]}));
    }

    #[test]
    fn test_extract_json_failure() {
        assert!(extract_json_payload("not json at all").is_err());
    }

    #[tokio::test]
    async fn test_local_backend_always_degrades() {
        let backend = ModelBackend::Local(LocalBackend::new(String::new()));
        let out = backend
            .generate("attack", &GenerationParams::new(), None)
            .await;
        assert!(out.is_degraded());
        assert!(out.value.contains("swing your sword"));
    }
}
