//! Speech request payload

use crate::capability::{is_enabled, is_non_english};
use crate::settings::SpeechSettings;
use serde::{Deserialize, Serialize};

/// Hard cap on characters sent per request
pub const MAX_TEXT_CHARS: usize = 1000;

/// Streaming latency optimization level used by the streaming path
pub const DEFAULT_STREAM_OPTIMIZATION: u8 = 4;

/// Body of `POST /api/elevenlabs/speech`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    /// Client API key; empty means "use the server's key"
    #[serde(rename = "elevenKey")]
    pub api_key: String,

    pub text: String,

    /// Voice id; empty means "server default voice"
    pub voice_id: String,

    pub non_english: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_optimization: Option<u8>,
}

impl SpeechRequest {
    /// Build a non-streaming request, truncating text to [`MAX_TEXT_CHARS`]
    pub fn new(
        text: &str,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
        non_english: bool,
    ) -> Self {
        Self::with_limit(text, api_key, voice_id, non_english, MAX_TEXT_CHARS)
    }

    /// Build a non-streaming request with an explicit character limit
    pub fn with_limit(
        text: &str,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
        non_english: bool,
        max_chars: usize,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            text: truncate_chars(text, max_chars).to_string(),
            voice_id: voice_id.into(),
            non_english,
            streaming: None,
            stream_optimization: None,
        }
    }

    /// Turn this into a streaming request
    pub fn streaming(mut self, optimization: u8) -> Self {
        self.streaming = Some(true);
        self.stream_optimization = Some(optimization);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.unwrap_or(false)
    }
}

/// Why a speak call did not produce a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyText,
    Disabled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyText => write!(f, "empty text"),
            SkipReason::Disabled => write!(f, "speech synthesis not enabled"),
        }
    }
}

/// Resolve the request a speak call would send, given a settings snapshot.
///
/// A non-empty `voice_override` wins over the stored voice.
pub fn resolve_request(
    settings: &SpeechSettings,
    text: &str,
    voice_override: Option<&str>,
    max_chars: usize,
) -> Result<SpeechRequest, SkipReason> {
    if text.trim().is_empty() {
        return Err(SkipReason::EmptyText);
    }

    let api_key = settings.store.api_key();
    if !is_enabled(api_key, &settings.server) {
        return Err(SkipReason::Disabled);
    }

    let voice_id = voice_override
        .filter(|v| !v.is_empty())
        .or_else(|| settings.store.voice_id())
        .unwrap_or_default();
    let non_english = is_non_english(settings.preferences.preferred_language.as_deref());

    Ok(SpeechRequest::with_limit(
        text,
        api_key.unwrap_or_default(),
        voice_id,
        non_english,
        max_chars,
    ))
}

/// Truncate to at most `max` chars without splitting a character
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "日本語テキスト";
        assert_eq!(truncate_chars(text, 3), "日本語");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars(text, 0), "");
    }
}
