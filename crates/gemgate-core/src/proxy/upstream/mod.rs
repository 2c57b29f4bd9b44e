//! Upstream module - the gateway boundary and its Gemini REST implementation

pub mod client;

use std::sync::Arc;

use async_trait::async_trait;
use gemgate_types::{GatewayError, Part, Turn};
use serde::Serialize;

use crate::proxy::mappers::prompt::OutboundMessage;

pub use client::GeminiClient;

pub const CREDENTIAL_MISSING_MESSAGE: &str =
    "No API key available. Provide one or set GEMINI_API_SECRET on the server.";

/// Model-side knobs sent as `generationConfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelModifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

impl ModelModifiers {
    pub fn chat(max_output_tokens: u32) -> Self {
        Self { max_output_tokens: Some(max_output_tokens), response_modalities: None }
    }

    pub fn image() -> Self {
        Self {
            max_output_tokens: None,
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_output_tokens.is_none() && self.response_modalities.is_none()
    }
}

/// One gateway exchange.
///
/// `history` is shared so every call of a batch sees the same snapshot.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub history: Arc<[Turn]>,
    pub message: OutboundMessage,
    pub credential: String,
    pub model: String,
    pub modifiers: ModelModifiers,
}

/// Single request/response exchange with the generative provider.
///
/// Implementations must not retry; a failure is returned as-is.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn generate(&self, request: &GatewayRequest) -> Result<Vec<Part>, GatewayError>;
}

/// Pick the caller's credential, falling back to the server default.
/// Blank values count as absent.
pub fn resolve_credential(
    caller: Option<&str>,
    server_default: Option<&str>,
) -> Result<String, GatewayError> {
    caller
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| server_default.map(str::trim).filter(|k| !k.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| GatewayError::configuration(CREDENTIAL_MISSING_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_credential_wins() {
        assert_eq!(resolve_credential(Some("caller"), Some("server")).unwrap(), "caller");
    }

    #[test]
    fn blank_caller_falls_back_to_default() {
        assert_eq!(resolve_credential(Some("  "), Some("server")).unwrap(), "server");
        assert_eq!(resolve_credential(None, Some("server")).unwrap(), "server");
    }

    #[test]
    fn no_credential_is_configuration_error() {
        let err = resolve_credential(Some(""), None).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration { .. }));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn modifiers_serialize_as_generation_config() {
        assert_eq!(
            serde_json::to_value(ModelModifiers::chat(1000)).unwrap(),
            serde_json::json!({"maxOutputTokens": 1000})
        );
        assert_eq!(
            serde_json::to_value(ModelModifiers::image()).unwrap(),
            serde_json::json!({"responseModalities": ["TEXT", "IMAGE"]})
        );
        assert!(ModelModifiers::default().is_empty());
    }
}
