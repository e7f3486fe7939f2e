//! Shared test doubles for voxcall-spk integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use voxcall_spk::playback::{AudioPlayer, AudioStream, StreamPlayer, StreamPlayerFactory};
use voxcall_spk::{SpeechConfig, SpeechError, SpeechSettings, Speaker};

/// A 32-character key: the shortest valid one
pub const VALID_KEY: &str = "0123456789abcdef0123456789abcdef";

/// Buffered player that records what it was asked to play
#[derive(Default)]
pub struct RecordingPlayer {
    pub played: Mutex<Vec<Bytes>>,
    pub fail_with: Option<String>,
}

impl RecordingPlayer {
    pub fn failing(message: &str) -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, audio: Bytes) -> Result<(), SpeechError> {
        self.played.lock().unwrap().push(audio);
        match self.fail_with {
            Some(ref message) => Err(SpeechError::Playback(message.clone())),
            None => Ok(()),
        }
    }
}

/// Streaming player appending every chunk to a shared buffer
pub struct RecordingStreamPlayer {
    received: Arc<Mutex<Vec<u8>>>,
}

#[async_trait]
impl StreamPlayer for RecordingStreamPlayer {
    async fn play_stream(&self, mut stream: AudioStream) -> Result<(), SpeechError> {
        while let Some(chunk) = stream.next().await {
            self.received.lock().unwrap().extend_from_slice(&chunk?);
        }
        Ok(())
    }
}

/// Factory counting how many streaming players it created
#[derive(Default)]
pub struct RecordingStreamFactory {
    pub created: AtomicUsize,
    pub received: Arc<Mutex<Vec<u8>>>,
}

impl RecordingStreamFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<u8> {
        self.received.lock().unwrap().clone()
    }
}

impl StreamPlayerFactory for RecordingStreamFactory {
    fn create(&self) -> Box<dyn StreamPlayer> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingStreamPlayer {
            received: Arc::clone(&self.received),
        })
    }
}

pub fn config_for(base_url: &str) -> SpeechConfig {
    SpeechConfig {
        base_url: base_url.to_string(),
        ..SpeechConfig::default()
    }
}

/// Speaker wired to recording players
pub fn speaker_for(
    base_url: &str,
    settings: SpeechSettings,
) -> (Speaker, Arc<RecordingPlayer>, Arc<RecordingStreamFactory>) {
    let player = Arc::new(RecordingPlayer::default());
    let factory = Arc::new(RecordingStreamFactory::default());
    let speaker = Speaker::new(
        config_for(base_url),
        settings,
        player.clone(),
        factory.clone(),
    )
    .unwrap();
    (speaker, player, factory)
}

/// Settings where the server holds the key
pub fn server_configured() -> SpeechSettings {
    let mut settings = SpeechSettings::default();
    settings.server.voice_synthesis = true;
    settings
}

/// In-memory log sink for tracing
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture logs emitted on the current thread while the guard lives
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
