//! Protocol definitions.
//!
//! - `gemini` - Gemini GenerateContent conversation and response types
//! - `generation` - per-call generation request/result values

pub mod gemini;
pub mod generation;

pub use gemini::{
    join_text, InlineData, InlineDataPart, Part, RawTurn, ReasoningPart, Role, TextPart, Turn,
};
pub use generation::{GenerationRequest, GenerationResult, PromptModifiers};
