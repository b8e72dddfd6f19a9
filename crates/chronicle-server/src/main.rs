use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod game;
mod server;
mod state;
mod ws;

use chronicle_config::{BackendKind, Config};
use chronicle_core::GameState;
use chronicle_model::ModelGateway;
use chronicle_world::TownGenerator;

use server::run_server;
use state::AppState;

#[derive(Parser, Debug, Clone)]
#[command(name = "chronicle-server")]
#[command(about = "Chronicle narrative game server")]
#[command(version)]
struct Cli {
    /// Bind host (overrides config)
    #[arg(long, env = "CHRONICLE_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Default model backend (overrides config)
    #[arg(long, env = "CHRONICLE_BACKEND")]
    backend: Option<String>,

    /// Config file path
    #[arg(long, env = "CHRONICLE_CONFIG", default_value = "~/.chronicle/config.json")]
    config: String,

    /// Log filter (overrides config log level)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = chronicle_config::init_chronicle_dirs().await {
        eprintln!("Warning: failed to init chronicle directories: {}", e);
    }

    let config_path = chronicle_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| std::path::PathBuf::from(&cli.config));
    let mut config = Config::load(&config_path).await?;

    // CLI arguments override the config file.
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(backend) = cli.backend {
        config.model.default_backend = backend;
    }

    let filter = cli
        .log_level
        .clone()
        .unwrap_or_else(|| {
            if cli.debug {
                "debug".to_string()
            } else {
                config.logging.level.to_string()
            }
        });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Chronicle server");
    info!("  Config: {:?}", config_path);
    info!("  Default backend: {}", config.model.default_backend);

    resolve_credentials(&mut config);

    let gateway = Arc::new(ModelGateway::new(&config.model));
    info!("  Backends: {}", gateway.available_backends().join(", "));

    let game = bootstrap_world(&config).await;
    let state = Arc::new(AppState::new(config, gateway, game));

    spawn_context_sweeper(Arc::clone(&state));

    run_server(state).await
}

/// Fill in missing backend credentials from the environment (interactive
/// prompt as a fallback). An absent credential leaves the backend running
/// against mock output for the process lifetime.
fn resolve_credentials(config: &mut Config) {
    for (name, settings) in config.model.backends.iter_mut() {
        if settings.api_key.is_some() {
            continue;
        }
        let env_var = match settings.kind {
            BackendKind::OpenAi => "OPENAI_API_KEY",
            BackendKind::Anthropic => "ANTHROPIC_API_KEY",
            BackendKind::Gemini => "GOOGLE_API_KEY",
            BackendKind::Local | BackendKind::Unknown => continue,
        };
        settings.api_key = chronicle_config::resolve_api_key(env_var, name);
    }
}

/// Build the initial game world: the hand-authored starting town plus the
/// generated town of Eigengrau from the persisted content cache.
async fn bootstrap_world(config: &Config) -> GameState {
    let mut game = GameState::default();
    game.locations = chronicle_engine::starting_locations();

    let towns_dir = config
        .world
        .towns_dir
        .as_ref()
        .and_then(|dir| chronicle_config::expand_tilde(dir))
        .or_else(chronicle_config::default_towns_dir);

    if let Some(dir) = towns_dir {
        match TownGenerator::open(&dir).await {
            Ok(mut generator) => match generator.get_or_generate("eigengrau").await {
                Ok(town) => {
                    info!("Town '{}' ready with {} locations", town.name, town.locations.len());
                    for (id, location) in &town.locations {
                        game.locations.insert(id.clone(), location.clone());
                    }
                }
                Err(e) => warn!("Town generation failed: {}", e),
            },
            Err(e) => warn!("Could not open town cache at {:?}: {}", dir, e),
        }
    }

    game
}

/// Periodic sweep of stale gateway contexts. The store never expires
/// records on read, so liveness comes from this task.
fn spawn_context_sweeper(state: Arc<AppState>) {
    let max_age_hours = state.config.model.context_max_age_hours;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        interval.tick().await; // immediate first tick
        loop {
            interval.tick().await;
            let removed = state.gateway.clear_old_contexts(max_age_hours);
            if removed > 0 {
                info!("Swept {} stale model contexts", removed);
            }
        }
    });
}
