use std::time::Duration;

use gemgate_types::GatewayError;

/// Build the pooled HTTP client used for upstream calls.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(5)))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| GatewayError::configuration(format!("Failed to build HTTP client: {}", e)))
}
