//! OpenAI chat-completions adapter.

use serde_json::{json, Value};

use super::{http_client, schema_prompt, ProviderError};
use crate::params::GenerationParams;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug)]
pub struct OpenAiBackend {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: http_client(),
        }
    }

    /// Override the endpoint, for proxies and tests.
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
        let mut messages = Vec::new();
        if let Some(system) = system_prompt {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        json!({
            "model": params.model.as_deref().unwrap_or(&self.model),
            "messages": messages,
            "temperature": params.temperature.unwrap_or(0.7),
            "max_tokens": params.max_tokens.unwrap_or(1000),
            "top_p": params.top_p.unwrap_or(1.0),
        })
    }

    async fn post(&self, body: &Value) -> Result<Value, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(key)
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
        result["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Malformed("missing choices[0].message.content".to_string()))
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
        // OpenAI supports JSON output natively; the schema still rides along
        // in the prompt so the model knows the expected shape.
        let mut body = self.request_body(&schema_prompt(prompt, schema), params, system_prompt);
        body["response_format"] = json!({"type": "json_object"});

        let result = self.post(&body).await?;
        let content = Self::content(&result)?;
        serde_json::from_str(&content)
            .map_err(|e| ProviderError::Malformed(format!("JSON parse failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_includes_system_prompt() {
        let backend = OpenAiBackend::new(Some("sk-test".to_string()), "gpt-4".to_string());
        let body = backend.request_body("hello", &GenerationParams::new(), Some("be brief"));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn test_params_override_model() {
        let backend = OpenAiBackend::new(Some("sk-test".to_string()), "gpt-4".to_string());
        let params = GenerationParams::new().model("gpt-4-turbo");
        let body = backend.request_body("x", &params, None);
        assert_eq!(body["model"], "gpt-4-turbo");
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let backend = OpenAiBackend::new(None, "gpt-4".to_string());
        let err = backend
            .try_generate("hello", &GenerationParams::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
