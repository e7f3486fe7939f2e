//! Credential and capability checks
//!
//! Pure functions: everything they need is passed in.

use crate::settings::{ServerCapabilities, SpeechSettings};
use serde::{Deserialize, Serialize};

/// Minimum length of a client API key, after trimming
pub const MIN_API_KEY_LEN: usize = 32;

/// Whether speech synthesis can currently work, and where it is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub may_work: bool,
    pub is_configured_server_side: bool,
    pub is_configured_client_side: bool,
}

/// Check the shape of a client API key
pub fn is_valid_api_key(key: Option<&str>) -> bool {
    match key {
        Some(key) => {
            let trimmed = key.trim();
            !trimmed.is_empty() && trimmed.chars().count() >= MIN_API_KEY_LEN
        }
        None => false,
    }
}

/// Decide whether synthesis is enabled.
///
/// A client key, when present, is authoritative: an invalid key disables
/// synthesis even if the server has its own.
pub fn is_enabled(key: Option<&str>, server: &ServerCapabilities) -> bool {
    match key.filter(|k| !k.is_empty()) {
        Some(key) => is_valid_api_key(Some(key)),
        None => server.voice_synthesis,
    }
}

/// Combine server flag, client key validity and stored voice
pub fn capability(settings: &SpeechSettings) -> Capability {
    let is_configured_server_side = settings.server.voice_synthesis;
    let is_configured_client_side = settings
        .store
        .api_key()
        .map(|k| is_valid_api_key(Some(k)))
        .unwrap_or(false);
    let has_voice = settings.store.voice_id().is_some();

    Capability {
        may_work: is_configured_server_side || is_configured_client_side || has_voice,
        is_configured_server_side,
        is_configured_client_side,
    }
}

/// Non-English hint for the synthesis model.
/// Anything not starting with "en" counts, including no preference at all.
pub fn is_non_english(language: Option<&str>) -> bool {
    !language
        .map(|l| l.to_lowercase().starts_with("en"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_english_hint() {
        assert!(!is_non_english(Some("en")));
        assert!(!is_non_english(Some("EN-gb")));
        assert!(is_non_english(Some("de-DE")));
        assert!(is_non_english(Some("")));
        assert!(is_non_english(None));
    }

    #[test]
    fn test_key_length_counts_chars_not_bytes() {
        // 16 two-byte chars: 32 bytes but only 16 chars
        let key = "é".repeat(16);
        assert!(!is_valid_api_key(Some(&key)));
    }
}
