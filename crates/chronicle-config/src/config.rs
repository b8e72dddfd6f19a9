use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub world: WorldConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            world: WorldConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist configuration as pretty JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: bool,
    /// Directory served at `/static`; the index page lives here too.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors: true,
            static_dir: "frontend".to_string(),
        }
    }
}

/// Provider kind for a configured backend.
///
/// Unknown values deserialize to `Unknown` so a stale config entry is
/// skipped at gateway construction instead of failing the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAi,
    Anthropic,
    Gemini,
    Local,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Anthropic => write!(f, "anthropic"),
            BackendKind::Gemini => write!(f, "gemini"),
            BackendKind::Local => write!(f, "local"),
            BackendKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Settings for one configured model backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSettings {
    #[serde(rename = "type")]
    pub kind: BackendKind,
    /// Resolved credential. Absent means the backend runs degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
}

/// Model gateway configuration.
///
/// Backends are keyed by name in a sorted map so construction order (and
/// therefore `available_backends()`) is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub backends: BTreeMap<String, BackendSettings>,
    pub default_backend: String,
    pub cache_max_size: usize,
    pub cache_ttl_secs: u64,
    pub context_max_age_hours: i64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let mut backends = BTreeMap::new();
        backends.insert(
            "openai".to_string(),
            BackendSettings {
                kind: BackendKind::OpenAi,
                api_key: None,
                model: "gpt-4".to_string(),
            },
        );
        backends.insert(
            "anthropic".to_string(),
            BackendSettings {
                kind: BackendKind::Anthropic,
                api_key: None,
                model: "claude-3-opus-20240229".to_string(),
            },
        );
        backends.insert(
            "gemini".to_string(),
            BackendSettings {
                kind: BackendKind::Gemini,
                api_key: None,
                model: "gemini-1.5-flash-latest".to_string(),
            },
        );
        backends.insert(
            "local".to_string(),
            BackendSettings {
                kind: BackendKind::Local,
                api_key: None,
                model: String::new(),
            },
        );
        Self {
            backends,
            default_backend: "openai".to_string(),
            cache_max_size: 1000,
            cache_ttl_secs: 3600,
            context_max_age_hours: 24,
        }
    }
}

/// World generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldConfig {
    /// Directory holding one JSON document per generated town.
    pub towns_dir: Option<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { towns_dir: None }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::Validation(format!(
                "Invalid log level: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backends_present() {
        let config = ModelConfig::default();
        assert!(config.backends.contains_key("openai"));
        assert!(config.backends.contains_key("anthropic"));
        assert!(config.backends.contains_key("gemini"));
        assert!(config.backends.contains_key("local"));
        assert_eq!(config.default_backend, "openai");
    }

    #[test]
    fn test_unknown_backend_kind_is_not_fatal() {
        let raw = r#"{"type": "mystery", "model": "m"}"#;
        let settings: BackendSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.kind, BackendKind::Unknown);
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("nope.json")).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.server.port = 9090;
        config.save(&path).await.unwrap();

        let reloaded = Config::load(&path).await.unwrap();
        assert_eq!(reloaded.server.port, 9090);
    }
}
