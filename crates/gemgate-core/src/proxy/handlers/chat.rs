use axum::{extract::State, Json};
use gemgate_types::{join_text, GatewayError, GenerationRequest, Part, RawTurn};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::ApiError;
use crate::proxy::batch::{BatchLimits, BatchMode, BatchOrchestrator, CallTarget};
use crate::proxy::server::AppState;
use crate::proxy::upstream::{resolve_credential, ModelModifiers};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<RawTurn>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Visible text of the reply, newline-joined
    pub text: String,
    pub parts: Vec<Part>,
}

/// `POST /api/gemini`
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let gateway_config = &state.config.gateway;
    let credential = resolve_credential(body.api_key.as_deref(), gateway_config.api_key.as_deref())?;
    if body.message.trim().is_empty() {
        return Err(GatewayError::validation("Message is required").into());
    }

    let history = state.normalizer.normalize_raw(body.history)?;
    let model = body
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| gateway_config.chat_model.clone());
    info!("[Gemini] Chat request: model={} history={}", model, history.len());

    let request = GenerationRequest::new(body.message, history);
    let target = CallTarget {
        credential,
        model,
        modifiers: ModelModifiers::chat(gateway_config.max_output_tokens),
    };

    let results = BatchOrchestrator::new(&*state.gateway, BatchLimits::from(gateway_config))
        .run(&request, BatchMode::Single, &target, |_| {})
        .await?;

    let parts: Vec<Part> = results.into_iter().flat_map(|r| r.parts).collect();
    Ok(Json(ChatResponse { text: join_text(&parts), parts }))
}
