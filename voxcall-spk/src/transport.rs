//! HTTP transport to the speech proxy endpoint

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::playback::AudioStream;
use crate::request::SpeechRequest;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Fallback when the endpoint gives no usable error message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Error body returned by the speech endpoint
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Client for `POST {base_url}{endpoint_path}`
#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    url: String,
    timeout: Duration,
    max_audio_bytes: usize,
}

impl SpeechClient {
    /// Create a new speech client
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SpeechError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_audio_bytes: config.max_audio_bytes,
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a speech request and validate the response status.
    ///
    /// Streaming requests get no total timeout so long streams are not cut.
    pub async fn fetch_speech(&self, request: &SpeechRequest) -> Result<AudioResponse, SpeechError> {
        debug!(
            "POST {} ({} chars, voice '{}', streaming: {})",
            self.url,
            request.text.chars().count(),
            request.voice_id,
            request.is_streaming()
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request);
        if !request.is_streaming() {
            builder = builder.timeout(self.timeout);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response.bytes().await.ok().as_deref());
            debug!("Speech endpoint returned {}: {}", status, message);
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(AudioResponse {
            response,
            max_bytes: self.max_audio_bytes,
        })
    }
}

/// Successful response carrying audio
pub struct AudioResponse {
    response: reqwest::Response,
    max_bytes: usize,
}

impl AudioResponse {
    /// Content type reported by the server, if any
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Read the whole body, enforcing the configured size cap
    pub async fn bytes(self) -> Result<Bytes, SpeechError> {
        let max = self.max_bytes;
        if let Some(len) = self.response.content_length() {
            if len > max as u64 {
                return Err(SpeechError::AudioTooLarge {
                    size: len as usize,
                    max,
                });
            }
        }

        // Enforce the cap even without a content-length
        let mut buf = BytesMut::new();
        let mut chunks = self.response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if buf.len() + chunk.len() > max {
                return Err(SpeechError::AudioTooLarge {
                    size: buf.len() + chunk.len(),
                    max,
                });
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(buf.freeze())
    }

    /// Body as a stream of audio chunks
    pub fn into_stream(self) -> AudioStream {
        Box::pin(self.response.bytes_stream().map(|chunk| chunk.map_err(SpeechError::from)))
    }
}

/// Pick the message out of an error body: `error`, then `message`, then a
/// generic fallback.
fn error_message(body: Option<&[u8]>) -> String {
    body.and_then(|b| serde_json::from_slice::<ErrorBody>(b).ok())
        .and_then(|b| {
            b.error
                .filter(|e| !e.is_empty())
                .or(b.message.filter(|m| !m.is_empty()))
        })
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
