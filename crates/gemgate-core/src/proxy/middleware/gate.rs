//! Shared-password cookie gate in front of the pages.
//!
//! The cookie holds the hex SHA-256 of the site password, so a cookie minted
//! for an old password stops working when the password changes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use gemgate_types::GateConfig;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const LOGIN_PATH: &str = "/login";

const PROTECTED_PREFIXES: &[&str] = &["/gemini", "/nanobanana"];

pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Cookie value proving knowledge of `password`.
pub fn access_token_for(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `Set-Cookie` value issued after a successful login.
pub fn access_cookie(gate: &GateConfig, password: &str) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Max-Age={}; Path=/",
        gate.cookie_name,
        access_token_for(password),
        gate.max_age_secs
    );
    if gate.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn is_protected(path: &str) -> bool {
    path == "/" || PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn has_access(gate: &GateConfig, headers: &HeaderMap) -> bool {
    match gate.site_password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => cookie_value(headers, &gate.cookie_name)
            .is_some_and(|value| constant_time_compare(value, &access_token_for(password))),
        None => true,
    }
}

/// Page paths redirect to the login page until the access cookie is
/// present; `/login` itself redirects home once it is. API routes, health
/// checks and static assets pass through.
pub async fn site_gate_middleware(
    State(gate): State<Arc<GateConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if !gate.is_enabled() {
        return next.run(request).await;
    }

    let path = request.uri().path();
    let authorized = has_access(&gate, request.headers());

    if path.trim_end_matches('/') == LOGIN_PATH {
        if authorized {
            return Redirect::temporary("/").into_response();
        }
    } else if is_protected(path) && !authorized {
        tracing::debug!("[Gate] Redirecting {} to {}", path, LOGIN_PATH);
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    next.run(request).await
}
