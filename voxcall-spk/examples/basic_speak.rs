//! Basic speech example
//!
//! Expects a speech proxy at VOXCALL_BASE_URL (default http://localhost:3000)
//! and ffplay, mpv or mpg123 on PATH.

use voxcall_spk::{Speaker, VoxcallConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut config = VoxcallConfig::default();
    config.apply_env();

    let speaker = Speaker::from_config(config)?;
    println!("Capability: {:?}", speaker.capability());

    // Buffered: never fails, problems end up in the log
    speaker.speak("Hello, this is a buffered speech test.", None).await;

    // Streaming: request errors come back, playback can be awaited
    match speaker.speak_stream("And this one is streamed.", None).await {
        Ok(Some(handle)) => handle.wait().await?,
        Ok(None) => println!("Speech synthesis is not enabled"),
        Err(e) => eprintln!("Failed to start streaming speech: {}", e),
    }

    Ok(())
}
