use gemgate_types::{GatewayError, Part, RawTurn, Role, TextPart, Turn};
use serde_json::Value;

pub use gemgate_types::models::config::DEFAULT_HISTORY_PLACEHOLDER;

/// Reshapes a conversation log into turns the upstream chat API accepts.
///
/// - user turns pass through (attachments are the point of a user turn)
/// - model turns lose their inline binary parts; a dropped part's
///   `thoughtSignature` survives on an empty text part carrying every other
///   field of the dropped part
/// - a turn left without parts gets one placeholder text part
///
/// Normalizing twice gives the same result as normalizing once.
#[derive(Debug, Clone)]
pub struct HistoryNormalizer {
    placeholder: String,
}

impl Default for HistoryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_PLACEHOLDER)
    }
}

impl HistoryNormalizer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self { placeholder: placeholder.into() }
    }

    /// Parse client turns, then normalize them.
    pub fn normalize_raw(&self, raw: Vec<RawTurn>) -> Result<Vec<Turn>, GatewayError> {
        let turns = raw.into_iter().map(RawTurn::parse).collect::<Result<Vec<_>, _>>()?;
        Ok(self.normalize(&turns))
    }

    pub fn normalize(&self, turns: &[Turn]) -> Vec<Turn> {
        let normalized: Vec<Turn> = turns.iter().map(|turn| self.normalize_turn(turn)).collect();

        let stripped: usize = turns
            .iter()
            .filter(|t| t.role == Role::Model)
            .map(|t| t.parts.iter().filter(|p| p.is_inline_data()).count())
            .sum();
        if stripped > 0 {
            tracing::debug!(
                "[History] Stripped {} inline parts from {} model turns",
                stripped,
                turns.iter().filter(|t| t.role == Role::Model).count()
            );
        }

        normalized
    }

    fn normalize_turn(&self, turn: &Turn) -> Turn {
        let parts = match turn.role {
            Role::User if turn.parts.is_empty() => vec![Part::text("")],
            Role::User => turn.parts.clone(),
            Role::Model => {
                let kept: Vec<Part> = turn.parts.iter().filter_map(strip_binary).collect();
                if kept.is_empty() {
                    vec![Part::text(self.placeholder.clone())]
                } else {
                    kept
                }
            },
        };
        Turn { role: turn.role, parts }
    }
}

/// Model-turn filter: binary payloads go, annotations stay.
///
/// A stray `text` field on the dropped part becomes the replacement's text,
/// so the result serializes with a single `text` key.
fn strip_binary(part: &Part) -> Option<Part> {
    match part {
        Part::InlineData(inline) => inline.thought_signature.as_ref().map(|signature| {
            let mut extra = inline.extra.clone();
            let text = match extra.remove("text") {
                Some(Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Part::Text(TextPart { text, thought_signature: Some(signature.clone()), extra })
        }),
        other => Some(other.clone()),
    }
}
