//! voxcall-spk: client-side speech synthesis
//!
//! Calls a speech proxy endpoint and plays the result:
//! - Capability checks for client keys and server configuration
//! - Buffered playback (fire-and-forget, errors logged)
//! - Streaming playback in a spawned task with an observable handle
//! - External command line players for audio output

pub mod error;
pub mod config;
pub mod settings;
pub mod capability;
pub mod request;
pub mod transport;
pub mod playback;
pub mod speaker;

pub use error::SpeechError;
pub use config::{PlayerConfig, SpeechConfig, VoxcallConfig};
pub use settings::{ServerCapabilities, SpeechSettings, UiPreferences, VoiceStore};
pub use capability::{capability, is_enabled, is_valid_api_key, Capability};
pub use request::{SkipReason, SpeechRequest};
pub use transport::{AudioResponse, SpeechClient};
pub use playback::{AudioPlayer, AudioStream, PlaybackHandle, StreamPlayer, StreamPlayerFactory};
pub use speaker::{SpeakOutcome, Speaker};
