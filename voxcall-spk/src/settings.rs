//! Settings snapshot read by the speaker at call time
//!
//! These structs stand in for state owned elsewhere (backend capability
//! flags, UI preferences, the persisted key/voice store). The speaker only
//! ever reads a cloned snapshot of them.

use serde::{Deserialize, Serialize};

/// Capabilities reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerCapabilities {
    /// Speech synthesis is configured server-side (server holds a key)
    pub voice_synthesis: bool,
}

/// UI preferences relevant to speech
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Preferred UI language code (e.g., "en-US", "de")
    pub preferred_language: Option<String>,
}

/// Persisted client-side speech settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceStore {
    /// Client-supplied API key
    pub api_key: Option<String>,

    /// Default voice id
    pub voice_id: Option<String>,
}

impl VoiceStore {
    /// Client key, with an empty string treated as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Default voice id, with an empty string treated as absent
    pub fn voice_id(&self) -> Option<&str> {
        self.voice_id.as_deref().filter(|v| !v.is_empty())
    }
}

/// Everything the speaker reads from the outside world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub server: ServerCapabilities,
    pub preferences: UiPreferences,
    pub store: VoiceStore,
}

impl SpeechSettings {
    /// Validate settings.
    ///
    /// Only values that end up in the request body are checked. The language
    /// is only used for the non-English hint, so any string is accepted.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(voice_id) = self.store.voice_id() {
            if voice_id.len() > 256 {
                return Err("Voice id too long (max 256 chars)".to_string());
            }
            if voice_id.chars().any(|c| c.is_control()) {
                return Err("Voice id contains invalid characters".to_string());
            }
        }

        // Surrounding whitespace is ignored, as in the key check
        if let Some(key) = self.store.api_key() {
            if key.trim().chars().any(|c| c.is_control()) {
                return Err("API key contains invalid characters".to_string());
            }
        }

        Ok(())
    }
}
