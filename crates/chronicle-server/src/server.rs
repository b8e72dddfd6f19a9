//! HTTP router and serve loop.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;
use crate::ws::ws_handler;

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = PathBuf::from(&state.config.server.static_dir);
    let cors = state.config.server.cors;

    let mut router = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/backends", get(list_backends))
        .route("/ws/:user_id", get(ws_handler))
        .nest_service("/static", ServeDir::new(static_dir.join("static")))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

pub async fn run_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    )
    .parse()?;

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chronicle listening on http://{}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let path = PathBuf::from(&state.config.server.static_dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            format!("index.html not found in {:?}", path.parent()),
        )
            .into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Diagnostics: configured backends and which one answers by default.
async fn list_backends(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backends: Vec<_> = state
        .gateway
        .available_backends()
        .into_iter()
        .filter_map(|name| state.gateway.backend_info(Some(&name)).ok())
        .map(|info| {
            json!({
                "name": info.name,
                "type": info.kind,
                "model": info.model,
            })
        })
        .collect();

    let default = state
        .gateway
        .backend_info(None)
        .map(|info| info.name)
        .unwrap_or_default();

    Json(json!({
        "backends": backends,
        "default_backend": default,
    }))
}
