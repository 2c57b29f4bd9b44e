use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use gemgate_types::{AppConfig, GatewayError};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::proxy::handlers;
use crate::proxy::mappers::history::HistoryNormalizer;
use crate::proxy::middleware::{cors_layer, site_gate_middleware};
use crate::proxy::upstream::{Gateway, GeminiClient};

/// Inline attachments travel as base64 JSON.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Axum application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn Gateway>,
    pub normalizer: HistoryNormalizer,
}

impl AppState {
    /// State backed by the Gemini REST client described in `config.gateway`.
    pub fn new(config: AppConfig) -> Result<Self, GatewayError> {
        let client = GeminiClient::from_config(&config.gateway)?;
        Ok(Self::with_gateway(config, Arc::new(client)))
    }

    pub fn with_gateway(config: AppConfig, gateway: Arc<dyn Gateway>) -> Self {
        let normalizer = HistoryNormalizer::new(config.gateway.history_placeholder.clone());
        Self { config: Arc::new(config), gateway, normalizer }
    }
}

/// JSON API routes.
pub fn build_proxy_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/api/login", post(handlers::login::handle_login))
        .route("/api/gemini", post(handlers::chat::handle_chat))
        .route("/api/nanobanana", post(handlers::image::handle_image))
        .route("/api/nanobanana/stream", post(handlers::image::handle_image_stream))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// API routes, health checks, `extra` and the page directory, all behind
/// the site gate.
pub fn build_site_router(state: AppState, extra: Router<()>) -> Router<()> {
    let gate = Arc::new(state.config.gate.clone());
    let server_config = &state.config.server;
    let static_dir = Path::new(&server_config.static_dir);
    if !static_dir.is_dir() {
        tracing::warn!("Static directory {} not found; pages will 404", static_dir.display());
    }
    let pages = ServeDir::new(static_dir).append_index_html_on_directories(true);
    let cors = cors_layer(&server_config.cors_origins);

    build_proxy_router(state)
        .route("/health", get(health))
        .route("/healthz", get(health))
        .merge(extra)
        .fallback_service(pages)
        .layer(axum::middleware::from_fn_with_state(gate, site_gate_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
