//! The model gateway: backend registry, cached generation, context ops.

use parking_lot::Mutex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};

use chronicle_config::ModelConfig;

use crate::backend::ModelBackend;
use crate::cache::ResponseCache;
use crate::context::ContextStore;
use crate::error::{GatewayError, Result};
use crate::outcome::Generated;
use crate::params::GenerationParams;

/// Diagnostic description of one configured backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub name: String,
    pub kind: String,
    pub model: String,
}

/// Request kind folded into the cache key so plain-text and structured
/// requests for the same prompt never share a slot.
#[derive(Debug, Clone, Copy)]
enum RequestKind {
    Text,
    Json,
}

impl RequestKind {
    fn tag(self) -> &'static str {
        match self {
            RequestKind::Text => "text",
            RequestKind::Json => "json",
        }
    }
}

/// Mediates all generation requests.
///
/// Owns the backend registry, the response cache and the context store
/// exclusively. Constructed once by the process entry point and shared by
/// `Arc`; tests build fresh instances from their own configs.
pub struct ModelGateway {
    backends: Vec<(String, ModelBackend)>,
    default_backend: Option<String>,
    cache: Mutex<ResponseCache>,
    contexts: Mutex<ContextStore>,
}

impl ModelGateway {
    /// Build the gateway from configuration. Backends with an unknown kind
    /// are logged and skipped; a missing default falls back to the first
    /// configured backend.
    pub fn new(config: &ModelConfig) -> Self {
        let mut backends = Vec::new();
        for (name, settings) in &config.backends {
            if let Some(backend) = ModelBackend::from_settings(name, settings) {
                backends.push((name.clone(), backend));
            }
        }

        let default_backend = if backends.iter().any(|(n, _)| *n == config.default_backend) {
            Some(config.default_backend.clone())
        } else {
            let fallback = backends.first().map(|(n, _)| n.clone());
            if let Some(ref name) = fallback {
                warn!(
                    "Default backend '{}' not configured, falling back to '{}'",
                    config.default_backend, name
                );
            }
            fallback
        };

        Self {
            backends,
            default_backend,
            cache: Mutex::new(ResponseCache::new(
                config.cache_max_size,
                Duration::from_secs(config.cache_ttl_secs),
            )),
            contexts: Mutex::new(ContextStore::new()),
        }
    }

    fn resolve(&self, backend_name: Option<&str>) -> Result<(&str, &ModelBackend)> {
        let requested = backend_name
            .map(str::to_string)
            .or_else(|| self.default_backend.clone());
        let available = || {
            self.backends
                .iter()
                .map(|(n, _)| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let name = requested.ok_or_else(|| GatewayError::BackendNotFound {
            name: "<none>".to_string(),
            available: available(),
        })?;
        self.backends
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, b)| (n.as_str(), b))
            .ok_or_else(|| GatewayError::BackendNotFound {
                name,
                available: available(),
            })
    }

    fn cache_key(
        backend: &str,
        prompt: &str,
        params: &GenerationParams,
        kind: RequestKind,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(backend.as_bytes());
        hasher.update(b"\n");
        hasher.update(prompt.as_bytes());
        hasher.update(b"\n");
        hasher.update(params.canonical_json().as_bytes());
        hasher.update(b"\n");
        hasher.update(kind.tag().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generate free text through the resolved backend, cache-checked.
    pub async fn generate(
        &self,
        prompt: &str,
        params: Option<&GenerationParams>,
        backend_name: Option<&str>,
        system_prompt: Option<&str>,
        use_cache: bool,
    ) -> Result<String> {
        self.generate_detailed(prompt, params, backend_name, system_prompt, use_cache)
            .await
            .map(|g| g.value)
    }

    /// Like [`generate`](Self::generate) but reports where the value came
    /// from (cache, live provider, or degraded mock).
    pub async fn generate_detailed(
        &self,
        prompt: &str,
        params: Option<&GenerationParams>,
        backend_name: Option<&str>,
        system_prompt: Option<&str>,
        use_cache: bool,
    ) -> Result<Generated<String>> {
        let default_params = GenerationParams::default();
        let params = params.unwrap_or(&default_params);
        let (name, backend) = self.resolve(backend_name)?;
        let key = Self::cache_key(name, prompt, params, RequestKind::Text);

        if use_cache {
            if let Some(text) = self.cache.lock().get(&key).as_ref().and_then(Value::as_str) {
                debug!("Cache hit for key {}...", &key[..8]);
                return Ok(Generated::cached(text.to_string()));
            }
        }

        let generated = backend.generate(prompt, params, system_prompt).await;
        if use_cache {
            self.cache
                .lock()
                .set(key, Value::String(generated.value.clone()));
        }
        Ok(generated)
    }

    /// Generate a structured payload, cache-keyed separately from the
    /// plain-text path even for an identical prompt.
    pub async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
        params: Option<&GenerationParams>,
        backend_name: Option<&str>,
        system_prompt: Option<&str>,
        use_cache: bool,
    ) -> Result<Value> {
        self.generate_structured_detailed(prompt, schema, params, backend_name, system_prompt, use_cache)
            .await
            .map(|g| g.value)
    }

    pub async fn generate_structured_detailed(
        &self,
        prompt: &str,
        schema: &Value,
        params: Option<&GenerationParams>,
        backend_name: Option<&str>,
        system_prompt: Option<&str>,
        use_cache: bool,
    ) -> Result<Generated<Value>> {
        let default_params = GenerationParams::default();
        let params = params.unwrap_or(&default_params);
        let (name, backend) = self.resolve(backend_name)?;
        let key = Self::cache_key(name, prompt, params, RequestKind::Json);

        if use_cache {
            if let Some(value) = self.cache.lock().get(&key) {
                debug!("Cache hit for key {}...", &key[..8]);
                return Ok(Generated::cached(value));
            }
        }

        let generated = backend
            .generate_structured(prompt, schema, params, system_prompt)
            .await;
        if use_cache {
            self.cache.lock().set(key, generated.value.clone());
        }
        Ok(generated)
    }

    /// Store an opaque context payload under an identifier.
    pub fn store_context(&self, id: impl Into<String>, payload: Value) {
        self.contexts.lock().store(id, payload);
    }

    /// Fetch a stored context. Stale records are returned until a sweep
    /// runs; absence-on-age is the sweeping caller's responsibility.
    pub fn get_context(&self, id: &str) -> Option<Value> {
        self.contexts.lock().get(id)
    }

    /// Sweep contexts older than `max_age_hours`, returning the count
    /// removed.
    pub fn clear_old_contexts(&self, max_age_hours: i64) -> usize {
        let removed = self
            .contexts
            .lock()
            .clear_old(chrono::Duration::hours(max_age_hours));
        if removed > 0 {
            debug!("Cleared {} old contexts", removed);
        }
        removed
    }

    /// Empty the response cache.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        debug!("Response cache cleared");
    }

    /// Drop every stored context unconditionally.
    pub fn clear_contexts(&self) {
        self.contexts.lock().clear();
    }

    /// Configured backend names, in configuration order.
    pub fn available_backends(&self) -> Vec<String> {
        self.backends.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Diagnostic info for a backend (default backend when unnamed).
    pub fn backend_info(&self, backend_name: Option<&str>) -> Result<BackendInfo> {
        let (name, backend) = self.resolve(backend_name)?;
        Ok(BackendInfo {
            name: name.to_string(),
            kind: backend.kind().to_string(),
            model: backend.model_id().to_string(),
        })
    }
}
