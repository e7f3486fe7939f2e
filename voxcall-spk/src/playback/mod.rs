//! Audio playback collaborators

pub mod command;

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;
use tokio::task::JoinHandle;

pub use command::{CommandPlayer, CommandPlayerFactory};

/// Audio arriving chunk by chunk
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, SpeechError>> + Send>>;

/// Plays a complete audio payload
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play audio, resolving when playback is done
    async fn play(&self, audio: Bytes) -> Result<(), SpeechError>;
}

/// Plays audio incrementally as it arrives
#[async_trait]
pub trait StreamPlayer: Send + Sync {
    /// Play a stream, resolving when the stream is exhausted and played
    async fn play_stream(&self, stream: AudioStream) -> Result<(), SpeechError>;
}

/// Creates a fresh streaming player for every streaming call
pub trait StreamPlayerFactory: Send + Sync {
    fn create(&self) -> Box<dyn StreamPlayer>;
}

impl<F> StreamPlayerFactory for F
where
    F: Fn() -> Box<dyn StreamPlayer> + Send + Sync,
{
    fn create(&self) -> Box<dyn StreamPlayer> {
        self()
    }
}

/// Handle to a spawned streaming playback.
///
/// Dropping the handle detaches the task; playback keeps running.
#[derive(Debug)]
pub struct PlaybackHandle {
    handle: JoinHandle<Result<(), SpeechError>>,
}

impl PlaybackHandle {
    pub(crate) fn new(handle: JoinHandle<Result<(), SpeechError>>) -> Self {
        Self { handle }
    }

    /// Whether playback has finished (successfully or not)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for playback to finish and get its result
    pub async fn wait(self) -> Result<(), SpeechError> {
        self.handle
            .await
            .map_err(|e| SpeechError::Playback(format!("Playback task failed: {}", e)))?
    }
}
