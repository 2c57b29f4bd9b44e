use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::proxy::middleware::gate::{access_cookie, constant_time_compare};
use crate::proxy::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// `POST /api/login`
pub async fn handle_login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let gate = &state.config.gate;
    let Some(password) = gate.site_password.as_deref().filter(|p| !p.is_empty()) else {
        // Gate disabled: nothing to unlock.
        return Json(json!({ "success": true })).into_response();
    };

    if !constant_time_compare(&body.password, password) {
        tracing::warn!("[Login] Rejected site password attempt");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid password" })))
            .into_response();
    }

    tracing::info!("[Login] Site access granted");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, access_cookie(gate, password))],
        Json(json!({ "success": true })),
    )
        .into_response()
}
