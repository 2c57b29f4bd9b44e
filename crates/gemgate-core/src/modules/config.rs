use std::fs;
use std::path::{Path, PathBuf};

use gemgate_types::{AppConfig, ConfigError};

use crate::error::AppResult;
use crate::utils::paths::get_data_dir;

const CONFIG_FILE: &str = "gemgate.json";

/// Location of `gemgate.json` inside the data directory.
pub fn config_path() -> AppResult<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}

/// Load configuration: `gemgate.json` (defaults when absent), then
/// environment overrides, then validation.
pub fn load_config() -> AppResult<AppConfig> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.check()?;
    Ok(config)
}

/// Read a config file; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))
}

/// Apply environment overrides. Blank values are ignored.
///
/// | variable | field |
/// |---|---|
/// | `GEMINI_API_SECRET` | `gateway.api_key` |
/// | `SITE_PASSWORD` | `gate.site_password` |
/// | `GEMGATE_PORT` | `server.port` |
/// | `GEMGATE_HOST` | `server.host` |
/// | `GEMGATE_STATIC_DIR` | `server.static_dir` |
/// | `GEMGATE_UPSTREAM_URL` | `gateway.base_url` |
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(key) = get("GEMINI_API_SECRET") {
        config.gateway.api_key = Some(key);
    }
    if let Some(password) = get("SITE_PASSWORD") {
        config.gate.site_password = Some(password);
    }
    if let Some(raw) = get("GEMGATE_PORT") {
        match raw.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("GEMGATE_PORT is not a valid port ({}), ignoring", raw),
        }
    }
    if let Some(host) = get("GEMGATE_HOST") {
        config.server.host = host;
    }
    if let Some(dir) = get("GEMGATE_STATIC_DIR") {
        config.server.static_dir = dir;
    }
    if let Some(raw) = get("GEMGATE_UPSTREAM_URL") {
        let url = raw.trim_end_matches('/').to_string();
        if url::Url::parse(&url).is_ok() {
            tracing::info!("Using custom upstream URL");
            config.gateway.base_url = url;
        } else {
            tracing::warn!("GEMGATE_UPSTREAM_URL is not a valid URL, ignoring");
        }
    }
}
