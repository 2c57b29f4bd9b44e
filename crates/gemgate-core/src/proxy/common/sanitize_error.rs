//! Upstream error shaping.
//!
//! Credential failures are rewritten into one stable, user-facing message.
//! Everything else passes through with the provider's own wording, taken from
//! `error.message` when the body is a Google error envelope.

use gemgate_types::GatewayError;
use serde_json::Value;

pub const INVALID_CREDENTIAL_MESSAGE: &str =
    "Invalid API key. Please check your API key and try again.";

const CREDENTIAL_MARKERS: &[&str] = &["API key not valid", "API_KEY_INVALID", "invalid api key"];

/// Build the error for a non-2xx upstream response.
///
/// Credential failures are reported as 401 whatever status the provider used
/// (Gemini answers a bad key with 400).
pub fn upstream_error(status_code: u16, raw_text: &str) -> GatewayError {
    if is_credential_failure(Some(status_code), raw_text) {
        return GatewayError::upstream(Some(401), INVALID_CREDENTIAL_MESSAGE);
    }
    let message =
        extract_message(raw_text).unwrap_or_else(|| format!("Upstream error (HTTP {})", status_code));
    GatewayError::upstream(Some(status_code), message)
}

/// Rewrite a transport-level failure message when it names a bad credential.
pub fn rewrite_message(status_code: Option<u16>, message: &str) -> String {
    if is_credential_failure(status_code, message) {
        INVALID_CREDENTIAL_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

fn is_credential_failure(status_code: Option<u16>, text: &str) -> bool {
    let lowered = text.to_lowercase();
    if CREDENTIAL_MARKERS.iter().any(|marker| lowered.contains(&marker.to_lowercase())) {
        return true;
    }
    matches!(status_code, Some(401 | 403)) && text.contains("PERMISSION_DENIED")
}

/// Pull a human-readable message out of an upstream body.
///
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}` and plain text.
pub fn extract_message(raw_text: &str) -> Option<String> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => {
            let error = json.get("error").unwrap_or(&json);
            error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .or_else(|| Some(trimmed.to_string()))
        },
        Err(_) => Some(trimmed.to_string()),
    }
}
