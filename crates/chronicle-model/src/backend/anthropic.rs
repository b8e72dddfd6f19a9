//! Anthropic messages adapter.

use serde_json::{json, Value};

use super::{extract_json_payload, http_client, schema_prompt, ProviderError};
use crate::params::GenerationParams;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug)]
pub struct AnthropicBackend {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: http_client(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(
        &self,
        prompt: &str,
        params: &GenerationParams,
        system_prompt: Option<&str>,
    ) -> Value {
        let mut body = json!({
            "model": params.model.as_deref().unwrap_or(&self.model),
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": params.max_tokens.unwrap_or(1000),
            "temperature": params.temperature.unwrap_or(0.7),
            "top_p": params.top_p.unwrap_or(1.0),
        });
        if let Some(system) = system_prompt {
            body["system"] = json!(system);
        }
        body
    }

    async fn post(&self, body: &Value) -> Result<Value, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    fn content(result: &Value) -> Result<String, ProviderError> {
        result["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Malformed("missing content[0].text".to_string()))
    }

    pub(crate) async fn try_generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        system_prompt: Option<&str>,
    ) -> Result<String, ProviderError> {
        let body = self.request_body(prompt, params, system_prompt);
        let result = self.post(&body).await?;
        Self::content(&result)
    }

    pub(crate) async fn try_generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
        params: &GenerationParams,
        system_prompt: Option<&str>,
    ) -> Result<Value, ProviderError> {
        // No native JSON mode: the schema is appended to the prompt and the
        // payload extracted from the reply, fenced or bare.
        let body = self.request_body(&schema_prompt(prompt, schema), params, system_prompt);
        let result = self.post(&body).await?;
        let content = Self::content(&result)?;
        extract_json_payload(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_top_level_field() {
        let backend = AnthropicBackend::new(Some("key".to_string()), "claude-3-opus-20240229".to_string());
        let body = backend.request_body("hi", &GenerationParams::new(), Some("be terse"));
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let backend = AnthropicBackend::new(None, "claude-3-opus-20240229".to_string());
        let err = backend
            .try_generate("hello", &GenerationParams::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
