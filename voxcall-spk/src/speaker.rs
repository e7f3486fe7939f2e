//! Speaker: capability gate, transport call and playback dispatch

use crate::capability::{self, Capability};
use crate::config::{SpeechConfig, VoxcallConfig};
use crate::error::SpeechError;
use crate::playback::{
    AudioPlayer, CommandPlayer, CommandPlayerFactory, PlaybackHandle, StreamPlayerFactory,
};
use crate::request::{resolve_request, SkipReason, SpeechRequest};
use crate::settings::SpeechSettings;
use crate::transport::SpeechClient;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of a buffered speak call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Nothing was requested
    Skipped(SkipReason),
    /// Audio was fetched and played
    Played { bytes: usize },
}

/// Speaks text through the speech endpoint.
///
/// Settings are read as a snapshot when a call starts; updating them does
/// not affect calls already in flight. Calls are not coordinated with each
/// other: concurrent calls play concurrently.
pub struct Speaker {
    config: Arc<SpeechConfig>,
    client: SpeechClient,
    settings: Arc<RwLock<SpeechSettings>>,
    player: Arc<dyn AudioPlayer>,
    stream_players: Arc<dyn StreamPlayerFactory>,
}

impl Speaker {
    /// Create a speaker with explicit playback collaborators
    pub fn new(
        config: SpeechConfig,
        settings: SpeechSettings,
        player: Arc<dyn AudioPlayer>,
        stream_players: Arc<dyn StreamPlayerFactory>,
    ) -> Result<Self, SpeechError> {
        settings.validate().map_err(SpeechError::Config)?;
        let client = SpeechClient::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            settings: Arc::new(RwLock::new(settings)),
            player,
            stream_players,
        })
    }

    /// Create a speaker playing through the configured external player
    pub fn from_config(config: VoxcallConfig) -> Result<Self, SpeechError> {
        let player_config = config.speech.player.clone();
        Self::new(
            config.speech,
            config.settings,
            Arc::new(CommandPlayer::new(player_config.clone())),
            Arc::new(CommandPlayerFactory::new(player_config)),
        )
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> SpeechSettings {
        self.settings.read().clone()
    }

    /// Update settings for subsequent calls
    pub fn update_settings<F>(&self, update: F) -> Result<(), SpeechError>
    where
        F: FnOnce(&mut SpeechSettings),
    {
        let mut next = self.settings();
        update(&mut next);
        next.validate().map_err(SpeechError::Config)?;
        *self.settings.write() = next;
        Ok(())
    }

    /// Current capability, derived from the settings snapshot
    pub fn capability(&self) -> Capability {
        capability::capability(&self.settings())
    }

    /// Speak text with buffered playback, fire-and-forget.
    ///
    /// Never fails: errors are logged and swallowed.
    pub async fn speak(&self, text: &str, voice_override: Option<&str>) {
        if let Err(e) = self.try_speak(text, voice_override).await {
            error!("Error playing speech: {}", e);
        }
    }

    /// Fallible core of [`Speaker::speak`]
    pub async fn try_speak(
        &self,
        text: &str,
        voice_override: Option<&str>,
    ) -> Result<SpeakOutcome, SpeechError> {
        let request = match self.prepare(text, voice_override, false) {
            Ok(request) => request,
            Err(reason) => return Ok(SpeakOutcome::Skipped(reason)),
        };

        let response = self.client.fetch_speech(&request).await?;
        let audio = response.bytes().await?;
        let bytes = audio.len();
        debug!("Received {} bytes of audio", bytes);

        self.player.play(audio).await?;
        Ok(SpeakOutcome::Played { bytes })
    }

    /// Speak text with streaming playback (experimental).
    ///
    /// Request errors are returned. On success playback runs in its own task
    /// on a fresh player; the returned handle may be awaited or dropped.
    /// `Ok(None)` means nothing was requested.
    pub async fn speak_stream(
        &self,
        text: &str,
        voice_override: Option<&str>,
    ) -> Result<Option<PlaybackHandle>, SpeechError> {
        let request = match self.prepare(text, voice_override, true) {
            Ok(request) => request,
            Err(_) => return Ok(None),
        };

        let response = self.client.fetch_speech(&request).await?;
        let stream = response.into_stream();
        let player = self.stream_players.create();

        let handle = tokio::spawn(async move {
            let result = player.play_stream(stream).await;
            if let Err(ref e) = result {
                warn!("Streaming playback failed: {}", e);
            }
            result
        });

        Ok(Some(PlaybackHandle::new(handle)))
    }

    fn prepare(
        &self,
        text: &str,
        voice_override: Option<&str>,
        streaming: bool,
    ) -> Result<SpeechRequest, SkipReason> {
        let settings = self.settings();
        let request = resolve_request(&settings, text, voice_override, self.config.max_text_chars)
            .map_err(|reason| {
                debug!("Skipping speech: {}", reason);
                reason
            })?;

        if streaming {
            info!("Requesting streamed speech ({} chars)", request.text.chars().count());
            Ok(request.streaming(self.config.stream_optimization))
        } else {
            info!("Requesting speech ({} chars)", request.text.chars().count());
            Ok(request)
        }
    }
}
