// Middleware module - Axum middleware

pub mod cors;
pub mod gate;

pub use cors::cors_layer;
pub use gate::site_gate_middleware;
