//! Typed error definitions for gemgate.
//!
//! Both error enums are serde-serializable, and their `Display` text is
//! what the user sees in an error turn.

mod config;
mod gateway;

pub use config::ConfigError;
pub use gateway::GatewayError;
