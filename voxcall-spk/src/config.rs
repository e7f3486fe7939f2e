//! Configuration for the speech client

use crate::error::SpeechError;
use crate::request::{DEFAULT_STREAM_OPTIMIZATION, MAX_TEXT_CHARS};
use crate::settings::SpeechSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default path of the speech proxy endpoint
pub const DEFAULT_ENDPOINT_PATH: &str = "/api/elevenlabs/speech";

/// Speech client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Base URL of the server hosting the speech endpoint
    pub base_url: String,

    /// Path of the speech endpoint
    pub endpoint_path: String,

    /// Characters sent per request (longer text is truncated)
    pub max_text_chars: usize,

    /// Latency optimization level sent on streaming requests (0-4)
    pub stream_optimization: u8,

    /// Total timeout for buffered requests, in seconds
    pub timeout_secs: u64,

    /// Connect timeout for all requests, in seconds
    pub connect_timeout_secs: u64,

    /// Largest buffered audio payload accepted
    pub max_audio_bytes: usize,

    /// External audio player
    pub player: PlayerConfig,
}

/// External player configuration.
///
/// With no program set, the first of ffplay, mpv and mpg123 found on PATH
/// is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable (name on PATH or path)
    pub program: Option<PathBuf>,

    /// Arguments for `program`; audio is written to its stdin
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            max_text_chars: MAX_TEXT_CHARS,
            stream_optimization: DEFAULT_STREAM_OPTIMIZATION,
            timeout_secs: 60,
            connect_timeout_secs: 10,
            max_audio_bytes: 10 * 1024 * 1024,
            player: PlayerConfig::default(),
        }
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Unsupported URL scheme: {}. Only http:// and https:// are allowed.",
                url.scheme()
            ));
        }

        if !self.endpoint_path.starts_with('/') {
            return Err("Endpoint path must start with '/'".to_string());
        }
        if self.endpoint_path.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err("Endpoint path contains invalid characters".to_string());
        }

        if self.max_text_chars == 0 {
            return Err("Max text chars must be greater than 0".to_string());
        }
        if self.max_text_chars > MAX_TEXT_CHARS {
            return Err(format!("Max text chars too large (max {})", MAX_TEXT_CHARS));
        }

        if self.stream_optimization > 4 {
            return Err("Stream optimization must be between 0 and 4".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.timeout_secs > 600 {
            return Err("Timeout too large (max 600 seconds)".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if self.max_audio_bytes == 0 {
            return Err("Max audio bytes must be greater than 0".to_string());
        }

        self.player.validate()?;

        Ok(())
    }

    /// Full URL of the speech endpoint
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint_path)
    }
}

impl PlayerConfig {
    /// Validate player configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref program) = self.program {
            if program.as_os_str().is_empty() {
                return Err("Player program cannot be empty if provided".to_string());
            }
        } else if !self.args.is_empty() {
            return Err("Player args given without a player program".to_string());
        }

        if self.args.iter().any(|a| a.contains('\0')) {
            return Err("Player args contain null bytes".to_string());
        }

        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxcallConfig {
    pub speech: SpeechConfig,
    pub settings: SpeechSettings,
}

impl VoxcallConfig {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SpeechError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Self::from_str(&content)
            .map_err(|e| SpeechError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from a JSON, TOML or YAML string
    pub fn from_str(content: &str) -> Result<Self, String> {
        if let Ok(config) = serde_json::from_str::<VoxcallConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<VoxcallConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_yaml::from_str::<VoxcallConfig>(content) {
            return Ok(config);
        }

        Err("Unknown configuration format".to_string())
    }

    /// Apply `VOXCALL_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VOXCALL_BASE_URL") {
            self.speech.base_url = url;
        }

        if let Some(key) = lookup("VOXCALL_API_KEY") {
            self.settings.store.api_key = Some(key);
        }

        if let Some(voice) = lookup("VOXCALL_VOICE_ID") {
            self.settings.store.voice_id = Some(voice);
        }

        if let Some(language) = lookup("VOXCALL_LANGUAGE") {
            self.settings.preferences.preferred_language = Some(language);
        }

        if let Some(flag) = lookup("VOXCALL_SERVER_TTS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.settings.server.voice_synthesis = true,
                "0" | "false" | "no" | "off" => self.settings.server.voice_synthesis = false,
                other => tracing::warn!("Ignoring VOXCALL_SERVER_TTS={}: not a boolean", other),
            }
        }

        if let Some(player) = lookup("VOXCALL_PLAYER") {
            self.speech.player.program = Some(PathBuf::from(player));
            self.speech.player.args.clear();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.speech.validate()?;
        self.settings.validate()
    }
}
