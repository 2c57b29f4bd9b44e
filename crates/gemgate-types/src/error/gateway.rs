//! Gateway-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while preparing or executing generation calls.
///
/// `Configuration` and `Validation` are raised before any network call.
/// `Upstream` covers a single failed gateway call; `PartialBatch` covers a
/// multi-call batch that failed after at least one successful call.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GatewayError {
    /// No credential available (neither caller-supplied nor server default)
    #[error("{message}")]
    Configuration { message: String },

    /// Request rejected before contacting the gateway
    #[error("{message}")]
    Validation { message: String },

    /// The gateway call itself failed
    #[error("{message}")]
    Upstream {
        /// HTTP status returned by the provider, absent for transport errors
        status: Option<u16>,
        message: String,
    },

    /// A call inside a multi-call batch failed after `completed` successes
    #[error("Batch aborted after {completed} of {total} generations: {message}")]
    PartialBatch { completed: usize, total: usize, message: String },
}

impl GatewayError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream { status, message: message.into() }
    }

    /// Get HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } | Self::Validation { .. } => 400,
            Self::Upstream { status: Some(401 | 403), .. } => 401,
            Self::Upstream { status: Some(429), .. } => 429,
            Self::Upstream { .. } | Self::PartialBatch { .. } => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(GatewayError::configuration("no key").http_status_code(), 400);
        assert_eq!(GatewayError::validation("empty").http_status_code(), 400);
        assert_eq!(GatewayError::upstream(Some(403), "denied").http_status_code(), 401);
        assert_eq!(GatewayError::upstream(Some(429), "slow down").http_status_code(), 429);
        assert_eq!(GatewayError::upstream(None, "connection reset").http_status_code(), 502);
        assert_eq!(
            GatewayError::PartialBatch { completed: 1, total: 3, message: "x".to_string() }
                .http_status_code(),
            502
        );
    }

    #[test]
    fn test_display_is_user_facing() {
        let err = GatewayError::upstream(Some(500), "Internal error encountered.");
        assert_eq!(err.to_string(), "Internal error encountered.");

        let partial = GatewayError::PartialBatch {
            completed: 2,
            total: 6,
            message: "Internal error encountered.".to_string(),
        };
        assert_eq!(
            partial.to_string(),
            "Batch aborted after 2 of 6 generations: Internal error encountered."
        );
    }
}
