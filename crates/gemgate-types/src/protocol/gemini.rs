//! Google Gemini GenerateContent conversation types.
//!
//! Client payloads are loosely shaped (`parts` may be a bare string, `null`,
//! or an array). They are parsed once through [`RawTurn::parse`] into the
//! typed [`Turn`] / [`Part`] model; everything downstream works on the typed
//! model only.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

/// Gemini content role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

impl FromStr for Role {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(GatewayError::validation(format!("Unsupported role: {:?}", other))),
        }
    }
}

/// Gemini inline data (base64 image bytes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Plain text part. May carry a provider-issued `thoughtSignature`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    /// Fields this crate does not interpret, echoed back verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextPart {
    /// Thought summary without a signature; never user-facing.
    pub fn is_thought(&self) -> bool {
        self.extra.get("thought").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Binary payload part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPart {
    pub inline_data: InlineData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Model reasoning annotation (`thought: true` plus an opaque signature).
///
/// Only ever produced by the provider; must be echoed back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningPart {
    pub text: String,
    pub thought: bool,
    pub thought_signature: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One unit of content within a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(TextPart),
    InlineData(InlineDataPart),
    Reasoning(ReasoningPart),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(TextPart { text: text.into(), ..TextPart::default() })
    }

    pub fn inline(inline_data: InlineData) -> Self {
        Part::InlineData(InlineDataPart {
            inline_data,
            thought_signature: None,
            extra: Map::new(),
        })
    }

    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData(_))
    }

    /// Visible text of a plain text part. Reasoning and thought summaries
    /// are not user-facing.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(part) if !part.is_thought() => Some(part.text.as_str()),
            _ => None,
        }
    }

    pub fn as_inline_data(&self) -> Option<&InlineData> {
        match self {
            Part::InlineData(part) => Some(&part.inline_data),
            _ => None,
        }
    }

    pub fn thought_signature(&self) -> Option<&str> {
        match self {
            Part::Text(part) => part.thought_signature.as_deref(),
            Part::InlineData(part) => part.thought_signature.as_deref(),
            Part::Reasoning(part) => Some(part.thought_signature.as_str()),
        }
    }
}

impl TryFrom<Value> for Part {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let obj = match value {
            Value::Object(obj) => obj,
            Value::String(text) => return Ok(Part::text(text)),
            other => {
                return Err(GatewayError::validation(format!(
                    "Unsupported part shape: {}",
                    shape_name(&other)
                )))
            },
        };

        let parsed = if obj.contains_key("inlineData") {
            serde_json::from_value(Value::Object(obj)).map(Part::InlineData)
        } else if is_reasoning(&obj) {
            serde_json::from_value(Value::Object(obj)).map(Part::Reasoning)
        } else if obj.get("text").is_some_and(Value::is_string) {
            serde_json::from_value(Value::Object(obj)).map(Part::Text)
        } else {
            let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            return Err(GatewayError::validation(format!(
                "Unsupported part with fields [{}]",
                keys.join(", ")
            )));
        };

        parsed.map_err(|e| GatewayError::validation(format!("Malformed part: {}", e)))
    }
}

fn is_reasoning(obj: &Map<String, Value>) -> bool {
    obj.get("thought").and_then(Value::as_bool).unwrap_or(false)
        && obj.get("thoughtSignature").is_some_and(Value::is_string)
        && obj.get("text").is_some_and(Value::is_string)
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for Part {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Part::Text(part) => part.serialize(serializer),
            Part::InlineData(part) => part.serialize(serializer),
            Part::Reasoning(part) => part.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Part::try_from(value).map_err(de::Error::custom)
    }
}

/// One role-tagged entry in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Visible text parts joined with newlines.
    pub fn joined_text(&self) -> String {
        join_text(&self.parts)
    }
}

/// Join the visible text of `parts` with newlines, skipping empty strings.
pub fn join_text(parts: &[Part]) -> String {
    parts.iter().filter_map(Part::as_text).filter(|t| !t.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Client-supplied turn before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTurn {
    pub role: String,
    #[serde(default)]
    pub parts: Value,
}

impl RawTurn {
    /// Validate the role and coerce `parts` into a part list.
    ///
    /// `null`/absent becomes one empty text part; any other non-array value
    /// becomes one text part holding its string form.
    pub fn parse(self) -> Result<Turn, GatewayError> {
        let role: Role = self.role.parse()?;
        let parts = match self.parts {
            Value::Null => vec![Part::text("")],
            Value::String(text) => vec![Part::text(text)],
            Value::Array(items) => {
                items.into_iter().map(Part::try_from).collect::<Result<Vec<_>, _>>()?
            },
            other => vec![Part::text(other.to_string())],
        };
        Ok(Turn { role, parts })
    }
}

// ============================================================================
// Response
// ============================================================================

/// `generateContent` response body (fields this crate reads).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Candidate content. Parts stay raw so one unknown part kind does not sink
/// the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Gemini usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}
