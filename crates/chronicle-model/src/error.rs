use thiserror::Error;

/// Caller-visible gateway errors.
///
/// Per-call generation failures never appear here: they are absorbed inside
/// the adapters and reported through [`crate::outcome::Origin::Degraded`].
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend '{name}' not found. Available backends: {available}")]
    BackendNotFound { name: String, available: String },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
