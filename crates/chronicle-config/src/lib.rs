pub mod config;
pub mod credentials;

pub use config::{
    BackendKind, BackendSettings, Config, ConfigError, ConfigResult, LogLevel, LoggingConfig,
    ModelConfig, ServerConfig, WorldConfig,
};
pub use credentials::resolve_api_key;

use std::path::PathBuf;

/// Chronicle data directory (`~/.chronicle`).
pub fn chronicle_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chronicle"))
}

/// Default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    chronicle_dir().map(|dir| dir.join("config.json"))
}

/// Default directory for persisted generated towns.
pub fn default_towns_dir() -> Option<PathBuf> {
    chronicle_dir().map(|dir| dir.join("towns"))
}

/// Default log file path.
pub fn default_log_path() -> Option<PathBuf> {
    chronicle_dir().map(|dir| dir.join("logs").join("chronicle.log"))
}

/// Create the Chronicle directory tree if missing.
pub async fn init_chronicle_dirs() -> ConfigResult<()> {
    if let Some(base) = chronicle_dir() {
        tokio::fs::create_dir_all(&base).await?;
        tokio::fs::create_dir_all(base.join("towns")).await?;
        tokio::fs::create_dir_all(base.join("logs")).await?;
    }
    Ok(())
}

/// Expand a leading `~/` to the user home directory.
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronicle_dir() {
        let dir = chronicle_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains(".chronicle"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.chronicle/config.json");
        assert!(expanded.is_some());
        assert!(!expanded.unwrap().to_string_lossy().starts_with('~'));
    }
}
