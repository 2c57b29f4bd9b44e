use async_trait::async_trait;
use gemgate_types::protocol::gemini::GenerateContentResponse;
use gemgate_types::{GatewayConfig, GatewayError, Part, Role, Turn};
use reqwest::Client;
use serde_json::{json, Value};

use super::{Gateway, GatewayRequest};
use crate::proxy::common::client_builder::build_http_client;
use crate::proxy::common::sanitize_error::{rewrite_message, upstream_error};
use crate::proxy::mappers::history::HistoryNormalizer;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` REST client.
///
/// Accepts a pre-built `reqwest::Client` so the connection pool is shared
/// with the rest of the server.
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    normalizer: HistoryNormalizer,
}

impl GeminiClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, normalizer: HistoryNormalizer) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http_client, base_url, normalizer }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http_client = build_http_client(config.request_timeout_secs)?;
        Ok(Self::new(
            http_client,
            config.base_url.clone(),
            HistoryNormalizer::new(config.history_placeholder.clone()),
        ))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Request body: normalized history, then the outbound message as a user turn.
    pub fn build_body(&self, request: &GatewayRequest) -> Value {
        let mut contents = self.normalizer.normalize(&request.history);
        contents.push(Turn::new(Role::User, request.message.clone().into_parts()));

        let mut body = json!({ "contents": contents });
        if !request.modifiers.is_empty() {
            body["generationConfig"] = json!(request.modifiers);
        }
        body
    }
}

#[async_trait]
impl Gateway for GeminiClient {
    async fn generate(&self, request: &GatewayRequest) -> Result<Vec<Part>, GatewayError> {
        let body = self.build_body(request);
        let url = self.endpoint(&request.model);
        tracing::debug!(
            "[Gateway] POST {} ({} history turns)",
            url,
            body["contents"].as_array().map_or(0, |c| c.len().saturating_sub(1))
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &request.credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("[Gateway] Request failed: {}", e);
                GatewayError::upstream(None, rewrite_message(None, &format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::upstream(Some(status.as_u16()), format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            tracing::warn!("[Gateway] Upstream returned HTTP {}", status.as_u16());
            return Err(upstream_error(status.as_u16(), &text));
        }

        parse_response(&text)
    }
}

/// Extract `candidates[0].content.parts`.
///
/// Part kinds this crate does not model are skipped with a warning.
pub fn parse_response(text: &str) -> Result<Vec<Part>, GatewayError> {
    let response: GenerateContentResponse = serde_json::from_str(text).map_err(|e| {
        GatewayError::upstream(None, format!("Malformed response from upstream: {}", e))
    })?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response.prompt_feedback.and_then(|f| f.block_reason);
        let message = match reason {
            Some(reason) => format!("Malformed response from upstream: no candidates (blocked: {})", reason),
            None => "Malformed response from upstream: no candidates".to_string(),
        };
        return Err(GatewayError::upstream(None, message));
    };

    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            "[Gateway] Tokens: prompt={} candidates={} total={}",
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count
        );
    }

    let raw_parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if raw_parts.is_empty() {
        tracing::debug!("[Gateway] Candidate has no parts (finish: {:?})", candidate.finish_reason);
    }

    Ok(raw_parts
        .into_iter()
        .filter_map(|raw| match Part::try_from(raw) {
            Ok(part) => Some(part),
            Err(e) => {
                tracing::warn!("[Gateway] Skipping response part: {}", e);
                None
            },
        })
        .collect())
}
