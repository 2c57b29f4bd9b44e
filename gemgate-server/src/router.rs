use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use gemgate_core::proxy::{build_site_router, AppState};

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/version", get(version_info));
    build_site_router(state, public_routes)
}

async fn version_info() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "version": option_env!("GIT_VERSION").unwrap_or("dev"),
            "build_time": option_env!("BUILD_TIME").unwrap_or("unknown"),
            "cargo_version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
