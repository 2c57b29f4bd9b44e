//! Generation request and result values.

use serde::{Deserialize, Serialize};

use super::gemini::{InlineData, Part, Turn};

/// Auxiliary prompt modifiers selected alongside the free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptModifiers {
    /// Preset prefix applied as `"<preset>: <text>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Selected preset style tags, in selection order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
    /// Free-form style text appended after the preset tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

impl PromptModifiers {
    /// Same modifiers with the style selection replaced by at most one style.
    pub fn with_single_style(&self, style: Option<&str>) -> Self {
        Self {
            preset: self.preset.clone(),
            styles: style.map(|s| vec![s.to_string()]).unwrap_or_default(),
            custom_style: None,
            aspect_ratio: self.aspect_ratio.clone(),
        }
    }

    pub fn with_preset(&self, preset: &str) -> Self {
        Self { preset: Some(preset.to_string()), ..self.clone() }
    }

    /// Preset tags followed by the custom style, blanks dropped.
    pub fn selected_styles(&self) -> Vec<String> {
        self.styles
            .iter()
            .map(|s| s.trim())
            .chain(self.custom_style.as_deref().map(str::trim))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Ephemeral per-call request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub prior_turns: Vec<Turn>,
    pub modifiers: PromptModifiers,
    pub attachments: Vec<InlineData>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, prior_turns: Vec<Turn>) -> Self {
        Self { prompt: prompt.into(), prior_turns, ..Self::default() }
    }

    /// True when there is neither text nor an attachment to send.
    pub fn is_empty(&self) -> bool {
        self.prompt.trim().is_empty() && self.attachments.is_empty()
    }
}

/// Parts produced by one gateway call. `label` is set only by batches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_styles_keeps_order_and_appends_custom() {
        let modifiers = PromptModifiers {
            styles: vec!["Retro".to_string(), " ".to_string(), "Dark Mode".to_string()],
            custom_style: Some(" neon outlines ".to_string()),
            ..PromptModifiers::default()
        };
        assert_eq!(modifiers.selected_styles(), vec!["Retro", "Dark Mode", "neon outlines"]);
    }

    #[test]
    fn single_style_drops_custom_text() {
        let modifiers = PromptModifiers {
            preset: Some("Logo".to_string()),
            styles: vec!["Retro".to_string()],
            custom_style: Some("neon".to_string()),
            aspect_ratio: Some("16:9".to_string()),
        };
        let single = modifiers.with_single_style(Some("neon"));
        assert_eq!(single.styles, vec!["neon"]);
        assert_eq!(single.custom_style, None);
        assert_eq!(single.preset.as_deref(), Some("Logo"));
        assert_eq!(single.aspect_ratio.as_deref(), Some("16:9"));
        assert!(modifiers.with_single_style(None).styles.is_empty());
    }

    #[test]
    fn empty_request_detection() {
        assert!(GenerationRequest::new("   ", Vec::new()).is_empty());
        let mut request = GenerationRequest::new("", Vec::new());
        request.attachments.push(InlineData { mime_type: "image/png".into(), data: "AA".into() });
        assert!(!request.is_empty());
    }
}
