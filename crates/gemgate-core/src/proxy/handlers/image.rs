use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use gemgate_types::{GatewayError, GenerationRequest, GenerationResult, InlineData, PromptModifiers, RawTurn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use super::common::ApiError;
use crate::proxy::batch::{BatchLimits, BatchMode, BatchOrchestrator, BatchPlan, BatchProgress, CallTarget};
use crate::proxy::server::AppState;
use crate::proxy::upstream::{resolve_credential, ModelModifiers};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RequestMode {
    #[default]
    Single,
    FullSet,
    Variations,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<RawTurn>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// `preset`, `styles`, `customStyle`, `aspectRatio`
    #[serde(flatten)]
    pub modifiers: PromptModifiers,
    #[serde(default)]
    pub attachments: Vec<InlineData>,
    #[serde(default)]
    pub mode: RequestMode,
    /// Generations per style in `variations` mode
    #[serde(default)]
    pub variations: Option<usize>,
    #[serde(default)]
    pub label_styles: bool,
}

impl ImageRequest {
    pub fn batch_mode(&self) -> BatchMode {
        match self.mode {
            RequestMode::Single => BatchMode::Single,
            RequestMode::FullSet => BatchMode::FullSet,
            RequestMode::Variations => BatchMode::Variations {
                count: self.variations.unwrap_or(1),
                label_styles: self.label_styles,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub success: bool,
    pub results: Vec<GenerationResult>,
}

struct PreparedBatch {
    request: GenerationRequest,
    mode: BatchMode,
    target: CallTarget,
    limits: BatchLimits,
}

/// Everything that can fail without contacting the gateway.
fn prepare(state: &AppState, body: ImageRequest) -> Result<PreparedBatch, GatewayError> {
    let gateway_config = &state.config.gateway;
    let credential = resolve_credential(body.api_key.as_deref(), gateway_config.api_key.as_deref())?;
    let mode = body.batch_mode();
    let limits = BatchLimits::from(gateway_config);

    let request = GenerationRequest {
        prompt: body.message,
        prior_turns: state.normalizer.normalize_raw(body.history)?,
        modifiers: body.modifiers,
        attachments: body.attachments,
    };
    if request.is_empty() {
        return Err(GatewayError::validation("Message is required"));
    }
    let planned = BatchPlan::new(mode, &request.modifiers, limits)?.len();

    info!(
        "[Nanobanana] {:?} request: {} calls, {} attachments, history={}",
        mode,
        planned,
        request.attachments.len(),
        request.prior_turns.len()
    );

    let target = CallTarget {
        credential,
        model: gateway_config.image_model.clone(),
        modifiers: ModelModifiers::image(),
    };
    Ok(PreparedBatch { request, mode, target, limits })
}

/// `POST /api/nanobanana`
pub async fn handle_image(
    State(state): State<AppState>,
    Json(body): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    let batch = prepare(&state, body)?;
    let results = BatchOrchestrator::new(&*state.gateway, batch.limits)
        .run(&batch.request, batch.mode, &batch.target, |progress| {
            tracing::debug!("[Nanobanana] {}/{} done", progress.current, progress.total);
        })
        .await?;
    Ok(Json(ImageResponse { success: true, results }))
}

enum StreamMessage {
    Progress(BatchProgress),
    Done(Vec<GenerationResult>),
    Failed(GatewayError),
}

impl StreamMessage {
    fn into_event(self) -> Event {
        let event = match self {
            StreamMessage::Progress(progress) => Event::default().event("progress").json_data(progress),
            StreamMessage::Done(results) => {
                Event::default().event("result").json_data(json!({ "success": true, "results": results }))
            },
            StreamMessage::Failed(err) => Event::default()
                .event("error")
                .json_data(json!({ "error": err.to_string(), "status": err.http_status_code() })),
        };
        event.unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
    }
}

/// `POST /api/nanobanana/stream`: `progress` events, then one `result` or
/// `error` event. Pre-flight errors are returned as plain JSON.
pub async fn handle_image_stream(
    State(state): State<AppState>,
    Json(body): Json<ImageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let batch = prepare(&state, body)?;
    let gateway = Arc::clone(&state.gateway);
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let outcome = BatchOrchestrator::new(&*gateway, batch.limits)
            .run(&batch.request, batch.mode, &batch.target, move |progress| {
                let _ = progress_tx.send(StreamMessage::Progress(progress));
            })
            .await;
        let last = match outcome {
            Ok(results) => StreamMessage::Done(results),
            Err(e) => StreamMessage::Failed(e),
        };
        let _ = tx.send(last);
    });

    let stream = async_stream::stream! {
        while let Some(message) = rx.recv().await {
            yield Ok(message.into_event());
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_maps_to_modifiers_and_mode() {
        let body: ImageRequest = serde_json::from_value(json!({
            "message": "a lighthouse",
            "preset": "Poster",
            "styles": ["Retro"],
            "customStyle": "ink wash",
            "aspectRatio": "9:16",
            "mode": "variations",
            "variations": 2,
            "labelStyles": true
        }))
        .unwrap();

        assert_eq!(body.modifiers.preset.as_deref(), Some("Poster"));
        assert_eq!(body.modifiers.custom_style.as_deref(), Some("ink wash"));
        assert_eq!(body.modifiers.aspect_ratio.as_deref(), Some("9:16"));
        assert_eq!(body.batch_mode(), BatchMode::Variations { count: 2, label_styles: true });
    }

    #[test]
    fn minimal_body_is_single_mode() {
        let body: ImageRequest = serde_json::from_value(json!({"message": "a tree"})).unwrap();
        assert_eq!(body.batch_mode(), BatchMode::Single);
        assert_eq!(body.modifiers, PromptModifiers::default());

        let full: ImageRequest = serde_json::from_value(json!({"mode": "fullSet"})).unwrap();
        assert_eq!(full.batch_mode(), BatchMode::FullSet);
    }
}
