//! Shared application state.

use std::sync::Arc;
use tokio::sync::RwLock;

use chronicle_config::Config;
use chronicle_core::GameState;
use chronicle_engine::TurnEngine;
use chronicle_model::ModelGateway;
use chronicle_session::SessionRegistry;

/// Everything a connection handler needs, created once in `main` and shared
/// by `Arc`. The gateway owns its cache and context store; the registry
/// owns the user->channels map; the game state sits behind one async lock.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<ModelGateway>,
    pub engine: TurnEngine,
    pub registry: SessionRegistry,
    pub game: RwLock<GameState>,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<ModelGateway>, game: GameState) -> Self {
        let engine = TurnEngine::new(Arc::clone(&gateway));
        Self {
            config,
            gateway,
            engine,
            registry: SessionRegistry::new(),
            game: RwLock::new(game),
        }
    }
}
