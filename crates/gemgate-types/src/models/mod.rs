//! Domain models shared across the gemgate crates.

pub mod config;

pub use config::{AppConfig, GateConfig, GatewayConfig, ServerConfig};
