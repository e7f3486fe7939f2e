//! External player process
//!
//! Audio is piped into the stdin of a command line player (ffplay, mpv or
//! mpg123), which does the decoding and output.

use super::{AudioPlayer, AudioStream, StreamPlayer, StreamPlayerFactory};
use crate::config::PlayerConfig;
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Players probed on PATH, in order of preference
const KNOWN_PLAYERS: [&str; 3] = ["ffplay", "mpv", "mpg123"];

/// Plays audio by piping it into an external player
#[derive(Debug, Clone, Default)]
pub struct CommandPlayer {
    config: PlayerConfig,
}

impl CommandPlayer {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    /// Resolve the program and arguments to run.
    /// Done per playback so a player installed later is picked up.
    pub fn resolve(&self) -> Result<(PathBuf, Vec<String>), SpeechError> {
        match self.config.program {
            Some(ref program) => {
                let path = find_program(program).ok_or_else(|| {
                    SpeechError::Playback(format!(
                        "Audio player not found or not executable: {}",
                        program.display()
                    ))
                })?;
                let args = if self.config.args.is_empty() {
                    default_args(&path)
                } else {
                    self.config.args.clone()
                };
                Ok((path, args))
            }
            None => KNOWN_PLAYERS
                .iter()
                .find_map(|name| find_program(Path::new(name)))
                .map(|path| {
                    let args = default_args(&path);
                    (path, args)
                })
                .ok_or_else(|| {
                    SpeechError::Playback(format!(
                        "No audio player found on PATH (tried {})",
                        KNOWN_PLAYERS.join(", ")
                    ))
                }),
        }
    }

    fn spawn(&self) -> Result<Child, SpeechError> {
        let (program, args) = self.resolve()?;
        debug!("Starting audio player {:?} {:?}", program, args);

        Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Playback(format!("Failed to start {}: {}", program.display(), e)))
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: Bytes) -> Result<(), SpeechError> {
        let mut child = self.spawn()?;
        let mut stdin = take_stdin(&mut child)?;

        let written = stdin.write_all(&audio).await;
        drop(stdin);
        if let Err(e) = written {
            return Err(write_failed(child, e).await);
        }

        wait_for_exit(child).await?;
        info!("Played {} bytes of audio", audio.len());
        Ok(())
    }
}

#[async_trait]
impl StreamPlayer for CommandPlayer {
    async fn play_stream(&self, mut stream: AudioStream) -> Result<(), SpeechError> {
        let mut child = self.spawn()?;
        let mut stdin = take_stdin(&mut child)?;

        let mut total = 0usize;
        let mut written = Ok(());
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            total += chunk.len();
            written = stdin.write_all(&chunk).await;
            if written.is_err() {
                break;
            }
        }
        if written.is_ok() {
            written = stdin.flush().await;
        }
        drop(stdin);
        if let Err(e) = written {
            return Err(write_failed(child, e).await);
        }

        wait_for_exit(child).await?;
        info!("Streamed {} bytes of audio", total);
        Ok(())
    }
}

/// Hands out a new [`CommandPlayer`] per streaming call
#[derive(Debug, Clone, Default)]
pub struct CommandPlayerFactory {
    config: PlayerConfig,
}

impl CommandPlayerFactory {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }
}

impl StreamPlayerFactory for CommandPlayerFactory {
    fn create(&self) -> Box<dyn StreamPlayer> {
        Box::new(CommandPlayer::new(self.config.clone()))
    }
}

fn take_stdin(child: &mut Child) -> Result<tokio::process::ChildStdin, SpeechError> {
    child
        .stdin
        .take()
        .ok_or_else(|| SpeechError::Playback("Audio player stdin unavailable".to_string()))
}

async fn wait_for_exit(mut child: Child) -> Result<(), SpeechError> {
    let status = child.wait().await?;
    if !status.success() {
        return Err(SpeechError::Playback(format!("Audio player exited with {}", status)));
    }
    Ok(())
}

/// Error for a failed write to the player's stdin. A player that exited
/// early breaks the pipe, so its exit status is reported when it failed.
async fn write_failed(mut child: Child, e: std::io::Error) -> SpeechError {
    match child.wait().await {
        Ok(status) if !status.success() => {
            SpeechError::Playback(format!("Audio player exited with {}", status))
        }
        _ => SpeechError::Playback(format!("Failed to write audio to player: {}", e)),
    }
}

/// Arguments that make a known player read from stdin and exit when done
fn default_args(program: &Path) -> Vec<String> {
    let name = program
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let args: &[&str] = match name {
        "ffplay" => &["-autoexit", "-nodisp", "-loglevel", "quiet", "-i", "-"],
        "mpv" => &["--no-video", "--really-quiet", "-"],
        "mpg123" => &["-q", "-"],
        _ => &["-"],
    };
    args.iter().map(|a| a.to_string()).collect()
}

/// Look a program up: explicit paths are used as-is, bare names are searched
/// on PATH.
fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let exe = dir.join(program).with_extension(std::env::consts::EXE_EXTENSION);
            [plain, exe]
        })
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
