#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test, panics are the assertion mechanism")]

use std::fs;

use axum::http::{header, HeaderValue, StatusCode};
use axum::Router;
use axum_test::TestServer;
use gemgate_core::proxy::middleware::gate::access_token_for;
use gemgate_core::proxy::{build_site_router, AppState};
use gemgate_types::AppConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header as header_matcher, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PASSWORD: &str = "correct horse";

struct Harness {
    server: TestServer,
    _pages: TempDir,
}

fn pages() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for page in ["gemini", "nanobanana", "login"] {
        fs::create_dir_all(dir.path().join(page)).expect("page dir");
        fs::write(dir.path().join(page).join("index.html"), format!("<h1>{}</h1>", page)).expect("page");
    }
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").expect("home page");
    dir
}

fn harness(upstream: Option<&MockServer>, password: Option<&str>, server_key: Option<&str>) -> Harness {
    let pages = pages();
    let mut config = AppConfig::default();
    config.server.static_dir = pages.path().display().to_string();
    config.gate.site_password = password.map(str::to_string);
    config.gateway.api_key = server_key.map(str::to_string);
    if let Some(upstream) = upstream {
        config.gateway.base_url = format!("{}/v1beta", upstream.uri());
    }

    let state = AppState::new(config).expect("state");
    let server = TestServer::new(build_site_router(state, Router::new())).expect("test server");
    Harness { server, _pages: pages }
}

fn access_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("site_access={}", access_token_for(PASSWORD))).expect("cookie")
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": text},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
            ]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let h = harness(None, Some(PASSWORD), None);
    let response = h.server.post("/api/login").json(&json!({"password": "nope"})).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({"error": "Invalid password"}));
}

#[tokio::test]
async fn correct_password_sets_access_cookie() {
    let h = harness(None, Some(PASSWORD), None);
    let response = h.server.post("/api/login").json(&json!({"password": PASSWORD})).await;

    response.assert_status_ok();
    let cookie = response.header(header::SET_COOKIE);
    let cookie = cookie.to_str().expect("ascii cookie");
    assert!(cookie.starts_with(&format!("site_access={}", access_token_for(PASSWORD))));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(response.json::<Value>(), json!({"success": true}));
}

#[tokio::test]
async fn pages_redirect_to_login_without_cookie() {
    let h = harness(None, Some(PASSWORD), None);
    for page in ["/", "/gemini/", "/nanobanana/"] {
        let response = h.server.get(page).await;
        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header(header::LOCATION), "/login");
    }
}

#[tokio::test]
async fn cookie_opens_the_pages() {
    let h = harness(None, Some(PASSWORD), None);
    let response = h.server.get("/gemini/").add_header(header::COOKIE, access_cookie()).await;

    response.assert_status_ok();
    assert!(response.text().contains("<h1>gemini</h1>"));
}

#[tokio::test]
async fn stale_cookie_is_not_enough() {
    let h = harness(None, Some(PASSWORD), None);
    let response =
        h.server.get("/").add_header(header::COOKIE, HeaderValue::from_static("site_access=true")).await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn login_page_sends_authorized_users_home() {
    let h = harness(None, Some(PASSWORD), None);
    let response = h.server.get("/login/").add_header(header::COOKIE, access_cookie()).await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header(header::LOCATION), "/");

    let anonymous = h.server.get("/login/").await;
    anonymous.assert_status_ok();
}

#[tokio::test]
async fn health_and_api_bypass_the_gate() {
    let h = harness(None, Some(PASSWORD), None);
    let health = h.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>(), json!({"status": "ok"}));

    // Reaches the handler (and fails there) instead of redirecting.
    let api = h.server.post("/api/gemini").json(&json!({"message": "hi"})).await;
    api.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn disabled_gate_serves_pages_directly() {
    let h = harness(None, None, None);
    let response = h.server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("home"));
}

#[tokio::test]
async fn chat_without_any_key_is_a_configuration_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;

    let h = harness(Some(&upstream), None, None);
    let response = h.server.post("/api/gemini").json(&json!({"message": "hi", "apiKey": ""})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap_or_default().contains("API key"));
}

#[tokio::test]
async fn chat_requires_a_message() {
    let h = harness(None, None, Some("server-key"));
    let response = h.server.post("/api/gemini").json(&json!({"message": "  "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"error": "Message is required"}));
}

#[tokio::test]
async fn chat_uses_server_key_and_returns_text() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_matcher("x-goog-api-key", "server-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Hi there")))
        .expect(1)
        .mount(&upstream)
        .await;

    let h = harness(Some(&upstream), None, Some("server-key"));
    let response = h
        .server
        .post("/api/gemini")
        .json(&json!({
            "message": "hello",
            "history": [{"role": "user", "parts": "earlier"}, {"role": "model", "parts": "ok"}]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["text"], "Hi there");
    assert_eq!(body["parts"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn chat_text_omits_thought_summaries() {
    let upstream = MockServer::start().await;
    let reply = json!({
        "candidates": [{"content": {"role": "model", "parts": [
            {"text": "Weighing a friendly tone", "thought": true},
            {"text": "Hello!"}
        ]}}]
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(&upstream)
        .await;

    let h = harness(Some(&upstream), None, Some("server-key"));
    let response = h.server.post("/api/gemini").json(&json!({"message": "hi"})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["text"], "Hello!");
    assert_eq!(body["parts"][0]["thought"], true);
}

#[tokio::test]
async fn malformed_history_is_rejected_before_upstream() {
    let h = harness(None, None, Some("server-key"));
    let response = h
        .server
        .post("/api/gemini")
        .json(&json!({"message": "hello", "history": [{"role": "system", "parts": "be nice"}]}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_set_returns_three_labeled_results() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("page")))
        .expect(3)
        .mount(&upstream)
        .await;

    let h = harness(Some(&upstream), None, None);
    let response = h
        .server
        .post("/api/nanobanana")
        .json(&json!({"message": "a climbing gym", "apiKey": "user-key", "mode": "fullSet"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let labels: Vec<&str> = body["results"]
        .as_array()
        .expect("results array")
        .iter()
        .filter_map(|r| r["label"].as_str())
        .collect();
    assert_eq!(labels, vec!["Landing Page", "Blog Homepage", "Product Page"]);
}

#[tokio::test]
async fn oversized_variation_request_is_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;

    let h = harness(Some(&upstream), None, Some("server-key"));
    let response = h
        .server
        .post("/api/nanobanana")
        .json(&json!({"message": "a kite", "mode": "variations", "variations": 9}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_credential_failure_maps_to_401() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&upstream)
        .await;

    let h = harness(Some(&upstream), None, None);
    let response =
        h.server.post("/api/nanobanana").json(&json!({"message": "a kite", "apiKey": "bad"})).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "Invalid API key. Please check your API key and try again."})
    );
}

#[tokio::test]
async fn stream_route_emits_progress_then_result() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("variant")))
        .expect(2)
        .mount(&upstream)
        .await;

    let h = harness(Some(&upstream), None, Some("server-key"));
    let response = h
        .server
        .post("/api/nanobanana/stream")
        .json(&json!({"message": "a lamp", "styles": ["Dark Mode"], "mode": "variations", "variations": 2}))
        .await;

    response.assert_status_ok();
    let text = response.text();
    assert_eq!(text.matches("event: progress").count(), 2);
    assert_eq!(text.matches("event: result").count(), 1);
    assert!(text.find("event: progress") < text.find("event: result"));
}
