//! Proxy module - forwards chat and image generation to the Gemini API.
//!
//! - History normalization and prompt composition (`mappers`)
//! - Sequential batch orchestration with progress reporting (`batch`)
//! - Gemini REST gateway behind the `Gateway` trait (`upstream`)
//! - Axum handlers, cookie gate, and router (`handlers`, `middleware`, `server`)

pub mod batch;
pub mod common;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod server;
pub mod session;
pub mod upstream;

pub use batch::{BatchLimits, BatchMode, BatchOrchestrator, BatchPlan, BatchProgress, CallTarget};
pub use mappers::history::HistoryNormalizer;
pub use mappers::prompt::{compose, OutboundMessage};
pub use server::{build_proxy_router, build_site_router, AppState};
pub use session::{ChatSession, ImageSubmission};
pub use upstream::{Gateway, GatewayRequest, GeminiClient};

#[cfg(test)]
pub(crate) mod test_support;
