//! Prompt composition.
//!
//! Merges the user's free text with a preset prefix, style tags, and an
//! aspect ratio. The image model only honours aspect ratio as an in-prompt
//! instruction, so it is appended as text like the styles.

use gemgate_types::{InlineData, Part, PromptModifiers};

pub const PRESET_SEPARATOR: &str = ": ";
pub const STYLE_SEGMENT: &str = " | Style: ";
pub const ASPECT_RATIO_SEGMENT: &str = " | Aspect Ratio: ";

/// Preset prefixes offered by the image page.
pub const PRESETS: &[&str] = &[
    "Logo",
    "Flyer",
    "Poster",
    "Icon",
    "Banner",
    "Landing Page",
    "Blog Homepage",
    "Product Page",
];

/// Preset style tags offered by the image page.
pub const STYLE_PRESETS: &[&str] =
    &["Minimalist", "Dark Mode", "Glassmorphism", "Retro", "Corporate", "Playful"];

pub const ASPECT_RATIOS: &[&str] = &["1:1", "16:9", "9:16", "4:3", "3:4"];

pub fn is_preset_style(style: &str) -> bool {
    STYLE_PRESETS.contains(&style)
}

/// Outbound message for one gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    Parts(Vec<Part>),
}

impl OutboundMessage {
    pub fn into_parts(self) -> Vec<Part> {
        match self {
            OutboundMessage::Text(text) => vec![Part::text(text)],
            OutboundMessage::Parts(parts) => parts,
        }
    }

    /// The text segment (first part for part lists).
    pub fn text(&self) -> Option<&str> {
        match self {
            OutboundMessage::Text(text) => Some(text),
            OutboundMessage::Parts(parts) => parts.first().and_then(Part::as_text),
        }
    }
}

/// Prefix `base` with `preset`, replacing a preset already applied.
///
/// Only known presets (and `preset` itself) count as an existing prefix, so
/// free text such as `"Note: ..."` is left alone.
pub fn apply_preset(base: &str, preset: &str) -> String {
    let content = match base.split_once(PRESET_SEPARATOR) {
        Some((prefix, rest)) if prefix == preset || PRESETS.contains(&prefix) => rest,
        _ => base,
    };
    format!("{}{}{}", preset, PRESET_SEPARATOR, content)
}

/// Compose the outbound text. The caller's `base` is never modified.
pub fn compose_text(base: &str, modifiers: &PromptModifiers) -> String {
    let mut text = match modifiers.preset.as_deref().map(str::trim) {
        Some(preset) if !preset.is_empty() => apply_preset(base, preset),
        _ => base.to_string(),
    };

    let styles = modifiers.selected_styles();
    for style in styles.iter().filter(|s| !is_preset_style(s)) {
        tracing::debug!("[Prompt] Free-form style requested: {}", style);
    }
    if !styles.is_empty() {
        text.push_str(STYLE_SEGMENT);
        text.push_str(&styles.join(", "));
    }

    if let Some(ratio) = modifiers.aspect_ratio.as_deref().map(str::trim).filter(|r| !r.is_empty())
    {
        if !ASPECT_RATIOS.contains(&ratio) {
            tracing::debug!("[Prompt] Non-standard aspect ratio requested: {}", ratio);
        }
        text.push_str(ASPECT_RATIO_SEGMENT);
        text.push_str(ratio);
    }

    text
}

/// Compose the outbound message: plain text, or a part list led by the
/// composed text when attachments are present (attachments in upload order).
pub fn compose(base: &str, modifiers: &PromptModifiers, attachments: &[InlineData]) -> OutboundMessage {
    let text = compose_text(base, modifiers);
    if attachments.is_empty() {
        return OutboundMessage::Text(text);
    }

    let mut parts = Vec::with_capacity(attachments.len() + 1);
    parts.push(Part::text(text));
    parts.extend(attachments.iter().cloned().map(Part::inline));
    OutboundMessage::Parts(parts)
}
