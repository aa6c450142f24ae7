//! Reply extraction from upstream bodies.
//!
//! Providers answer in one of a few shapes. Each shape has its own extractor;
//! they are tried in priority order and the first non-empty text wins.

use serde_json::Value;

/// Returned when no extractor finds any text.
pub const NO_TEXT_PLACEHOLDER: &str = "(No text returned)";

/// A named strategy for pulling reply text out of an upstream body.
pub type Extractor = fn(&Value) -> Option<String>;

/// Extractors in priority order.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("output_text", output_text),
    ("output_content", output_content),
    ("chat_choice", chat_choice),
];

/// Top-level `output_text` (responses API convenience field).
pub fn output_text(body: &Value) -> Option<String> {
    non_empty(body.get("output_text")?.as_str()?)
}

/// First `output_text` part of `output[0].content`.
pub fn output_content(body: &Value) -> Option<String> {
    body.pointer("/output/0/content")?
        .as_array()?
        .iter()
        .find(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .and_then(|part| part.get("text")?.as_str())
        .and_then(non_empty)
}

/// `choices[0].message.content` (chat completions).
pub fn chat_choice(body: &Value) -> Option<String> {
    non_empty(body.pointer("/choices/0/message/content")?.as_str()?)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Try every extractor in order.
pub fn extract_reply(body: &Value) -> Option<String> {
    EXTRACTORS.iter().find_map(|(name, extract)| {
        let text = extract(body)?;
        tracing::trace!(extractor = *name, "Reply text extracted");
        Some(text)
    })
}

/// [`extract_reply`], falling back to [`NO_TEXT_PLACEHOLDER`].
pub fn reply_or_placeholder(body: &Value) -> String {
    extract_reply(body).unwrap_or_else(|| NO_TEXT_PLACEHOLDER.to_string())
}
