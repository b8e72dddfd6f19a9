//! Model access layer: backend adapters, response cache, context store and
//! the gateway that ties them together.
//!
//! Callers construct one [`ModelGateway`] from configuration and share it by
//! handle; there is no process-global instance.

pub mod backend;
pub mod cache;
pub mod context;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod outcome;
pub mod params;

pub use backend::ModelBackend;
pub use cache::ResponseCache;
pub use context::ContextStore;
pub use error::{GatewayError, Result};
pub use gateway::{BackendInfo, ModelGateway};
pub use outcome::{Generated, Origin};
pub use params::GenerationParams;
