//! Application configuration models.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_HISTORY_PLACEHOLDER: &str = "Image generated successfully.";
pub const DEFAULT_COOKIE_NAME: &str = "site_access";
/// One week.
pub const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

// ============================================================================
// Server
// ============================================================================

/// HTTP listener and static file settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the pre-built pages (login, gemini, nanobanana)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Extra origins allowed to call the API cross-origin (e.g. a dev server)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_static_dir() -> String {
    "./web/dist".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` pair suitable for a TCP bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Site gate
// ============================================================================

/// Shared-secret cookie gate in front of the pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct GateConfig {
    /// Shared site password; the gate is disabled when unset
    #[validate(length(min = 1))]
    #[serde(default)]
    pub site_password: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[validate(range(min = 60))]
    #[serde(default = "default_cookie_max_age")]
    pub max_age_secs: u64,
    /// Adds the `Secure` attribute to the access cookie (enable behind TLS)
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_cookie_max_age() -> u64 {
    DEFAULT_COOKIE_MAX_AGE_SECS
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            site_password: None,
            cookie_name: default_cookie_name(),
            max_age_secs: default_cookie_max_age(),
            secure_cookie: false,
        }
    }
}

impl GateConfig {
    pub fn is_enabled(&self) -> bool {
        self.site_password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Upstream Gemini API settings and batch limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct GatewayConfig {
    /// Server-held default credential, used when the caller omits one
    #[serde(default)]
    pub api_key: Option<String>,
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[validate(range(min = 1))]
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Text substituted for model turns left empty after binary parts are stripped
    #[validate(length(min = 1))]
    #[serde(default = "default_history_placeholder")]
    pub history_placeholder: String,
    #[validate(range(min = 1, max = 16))]
    #[serde(default = "default_max_variations")]
    pub max_variations: usize,
    #[validate(range(min = 3, max = 64))]
    #[serde(default = "default_max_batch_calls")]
    pub max_batch_calls: usize,
    #[validate(range(min = 5))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_history_placeholder() -> String {
    DEFAULT_HISTORY_PLACEHOLDER.to_string()
}

fn default_max_variations() -> usize {
    4
}

fn default_max_batch_calls() -> usize {
    12
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            max_output_tokens: default_max_output_tokens(),
            history_placeholder: default_history_placeholder(),
            max_variations: default_max_variations(),
            max_batch_calls: default_max_batch_calls(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// ============================================================================
// Application
// ============================================================================

/// Top-level configuration (`gemgate.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    #[serde(default)]
    pub server: ServerConfig,
    #[validate(nested)]
    #[serde(default)]
    pub gate: GateConfig,
    #[validate(nested)]
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Run field validation, reporting the first failing field.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|errors| first_validation_error(&errors))
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gate.site_password.is_some() {
            copy.gate.site_password = Some("********".to_string());
        }
        if copy.gateway.api_key.is_some() {
            copy.gateway.api_key = Some("********".to_string());
        }
        copy
    }
}

fn first_validation_error(errors: &ValidationErrors) -> ConfigError {
    // Flatten "gateway.max_variations"-style paths out of the nested error tree.
    let mut pending = vec![(String::new(), errors)];
    while let Some((prefix, errs)) = pending.pop() {
        for (field, kind) in errs.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                validator::ValidationErrorsKind::Field(list) => {
                    let message = list
                        .first()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .unwrap_or_else(|| "invalid".to_string());
                    return ConfigError::ValidationError { field: path, message };
                },
                validator::ValidationErrorsKind::Struct(inner) => pending.push((path, &**inner)),
                validator::ValidationErrorsKind::List(map) => {
                    for inner in map.values() {
                        pending.push((path.clone(), &**inner));
                    }
                },
            }
        }
    }
    ConfigError::ValidationError { field: "config".to_string(), message: errors.to_string() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.check().is_ok());
        assert!(!config.gate.is_enabled());
        assert_eq!(config.gateway.history_placeholder, DEFAULT_HISTORY_PLACEHOLDER);
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"gateway": {"chat_model": "gemini-3-pro-preview"}}"#).unwrap();
        assert_eq!(config.gateway.chat_model, "gemini-3-pro-preview");
        assert_eq!(config.gateway.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.gate.cookie_name, DEFAULT_COOKIE_NAME);
    }

    #[test]
    fn nested_validation_reports_field_path() {
        let mut config = AppConfig::default();
        config.gateway.max_variations = 0;
        match config.check() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "gateway.max_variations");
            },
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn bad_base_url_rejected() {
        let mut config = AppConfig::default();
        config.gateway.base_url = "not a url".to_string();
        assert!(config.check().is_err());
    }

    #[test]
    fn redacted_masks_secrets() {
        let mut config = AppConfig::default();
        config.gate.site_password = Some("hunter2".to_string());
        config.gateway.api_key = Some("AIza-secret".to_string());
        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("AIza-secret"));
    }

    #[test]
    fn gate_enabled_only_with_password() {
        let mut gate = GateConfig::default();
        assert!(!gate.is_enabled());
        gate.site_password = Some(String::new());
        assert!(!gate.is_enabled());
        gate.site_password = Some("pw".to_string());
        assert!(gate.is_enabled());
    }
}
