//! Tests for the external command player
//! Uses coreutils (`cat`, `false`) in place of real audio players

#![cfg(unix)]

use bytes::Bytes;
use futures::stream;
use voxcall_spk::config::PlayerConfig;
use voxcall_spk::playback::{
    AudioPlayer, AudioStream, CommandPlayer, CommandPlayerFactory, StreamPlayer, StreamPlayerFactory,
};
use voxcall_spk::SpeechError;

fn player(program: &str) -> CommandPlayer {
    CommandPlayer::new(PlayerConfig {
        program: Some(program.into()),
        args: vec![],
    })
}

/// Player that exits with status 3 without reading its input
fn early_exit_player() -> CommandPlayer {
    CommandPlayer::new(PlayerConfig {
        program: Some("sh".into()),
        args: vec!["-c".to_string(), "exit 3".to_string()],
    })
}

fn chunks(parts: &[&'static [u8]]) -> AudioStream {
    let items: Vec<Result<Bytes, SpeechError>> =
        parts.iter().map(|p| Ok(Bytes::from_static(*p))).collect();
    Box::pin(stream::iter(items))
}

#[test]
fn test_resolve_bare_name_on_path() {
    let (program, args) = player("cat").resolve().unwrap();
    assert!(program.ends_with("cat"));
    assert_eq!(args, vec!["-"]);
}

#[test]
fn test_resolve_keeps_explicit_args() {
    let player = CommandPlayer::new(PlayerConfig {
        program: Some("cat".into()),
        args: vec!["-u".to_string(), "-".to_string()],
    });
    let (_, args) = player.resolve().unwrap();
    assert_eq!(args, vec!["-u", "-"]);
}

#[test]
fn test_resolve_unknown_program() {
    let result = player("definitely-not-an-audio-player-xyz").resolve();
    assert!(matches!(result, Err(SpeechError::Playback(_))));
}

#[tokio::test]
async fn test_play_pipes_audio() {
    player("cat")
        .play(Bytes::from_static(b"fake audio"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_play_stream_pipes_chunks() {
    player("cat")
        .play_stream(chunks(&[&b"one"[..], &b"two"[..], &b"three"[..]]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failing_player_is_playback_error() {
    let err = player("false")
        .play(Bytes::from_static(b"audio"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, SpeechError::Playback(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_stream_error_stops_playback() {
    let items: Vec<Result<Bytes, SpeechError>> = vec![
        Ok(Bytes::from_static(b"partial")),
        Err(SpeechError::Playback("connection reset".to_string())),
    ];
    let err = player("cat")
        .play_stream(Box::pin(stream::iter(items)))
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Playback error: connection reset");
}

#[tokio::test]
async fn test_factory_creates_working_players() {
    let factory = CommandPlayerFactory::new(PlayerConfig {
        program: Some("cat".into()),
        args: vec![],
    });
    let first = factory.create();
    let second = factory.create();
    first.play_stream(chunks(&[&b"a"[..]])).await.unwrap();
    second.play_stream(chunks(&[&b"b"[..]])).await.unwrap();
}

#[tokio::test]
async fn test_early_exit_reports_exit_status() {
    // Larger than a pipe buffer, so the write fails once the player is gone
    let audio = Bytes::from(vec![0u8; 1024 * 1024]);
    let err = early_exit_player().play(audio).await.err().unwrap();

    assert!(matches!(err, SpeechError::Playback(_)), "got {:?}", err);
    assert!(err.to_string().contains("exit status: 3"), "got {}", err);
}

#[tokio::test]
async fn test_early_exit_reports_exit_status_when_streaming() {
    let items: Vec<Result<Bytes, SpeechError>> = (0..16)
        .map(|_| Ok(Bytes::from(vec![0u8; 128 * 1024])))
        .collect();
    let err = early_exit_player()
        .play_stream(Box::pin(stream::iter(items)))
        .await
        .err()
        .unwrap();

    assert!(err.to_string().contains("exit status: 3"), "got {}", err);
}

#[test]
fn test_resolve_rejects_non_executable_file() {
    use std::os::unix::fs::PermissionsExt;

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();

    let player = CommandPlayer::new(PlayerConfig {
        program: Some(file.path().to_path_buf()),
        args: vec![],
    });
    let err = player.resolve().err().unwrap();
    assert!(err.to_string().contains("not executable"), "got {}", err);
}
