use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gemgate_types::GatewayError;
use serde_json::json;

/// `GatewayError` rendered as `{"error": message}` with its mapped status.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("[API] {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_kind() {
        let response = ApiError(GatewayError::validation("Message is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError(GatewayError::upstream(Some(403), "denied")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let partial = GatewayError::PartialBatch { completed: 1, total: 3, message: "boom".into() };
        assert_eq!(ApiError(partial).into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
