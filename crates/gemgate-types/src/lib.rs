//! # gemgate Types
//!
//! Core types, models, and error definitions for gemgate.
//!
//! - **`error`** - Typed error hierarchy for gateway calls and configuration
//! - **`models`** - Configuration models (server, site gate, gateway)
//! - **`protocol`** - Gemini conversation types and generation request/result values
//!
//! ## Architecture Role
//!
//! `gemgate-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!     gemgate-types (this crate)
//!            │
//!            ▼
//!      gemgate-core
//!            │
//!            ▼
//!     gemgate-server
//! ```

pub mod error;
pub mod models;
pub mod protocol;

pub use error::{ConfigError, GatewayError};

pub use models::{AppConfig, GateConfig, GatewayConfig, ServerConfig};

pub use protocol::{
    join_text, GenerationRequest, GenerationResult, InlineData, InlineDataPart, Part,
    PromptModifiers, RawTurn, ReasoningPart, Role, TextPart, Turn,
};
