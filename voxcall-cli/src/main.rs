// voxcall command line interface
// Speak text through a speech proxy endpoint and inspect the speech capability

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use voxcall_spk::{Speaker, VoxcallConfig};

#[derive(Parser)]
#[command(name = "voxcall")]
#[command(about = "Speak text through a speech synthesis endpoint", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the server hosting the speech endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Client API key (otherwise the server's key is used)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Preferred language code, e.g. "en-US"
    #[arg(long, global = true)]
    language: Option<String>,

    /// Whether the server has speech synthesis configured (true or false)
    #[arg(long, global = true, value_name = "BOOL")]
    server_configured: Option<bool>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak text
    Speak {
        /// Text to speak (truncated to the configured maximum)
        text: String,

        /// Voice id, overriding the stored default
        #[arg(long)]
        voice: Option<String>,

        /// Stream audio while it is being synthesized
        #[arg(long)]
        stream: bool,
    },

    /// Print whether speech synthesis may work, as JSON
    Capability,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let config = load_config(&cli)?;
    let speaker = Speaker::from_config(config)?;

    match cli.command {
        Commands::Speak { text, voice, stream } => {
            if stream {
                match speaker.speak_stream(&text, voice.as_deref()).await? {
                    Some(handle) => {
                        handle.wait().await?;
                        info!("Streaming playback finished");
                    }
                    None => info!("Nothing to speak (empty text or speech synthesis not enabled)"),
                }
            } else {
                speaker.speak(&text, voice.as_deref()).await;
            }
        }
        Commands::Capability => {
            println!("{}", serde_json::to_string_pretty(&speaker.capability())?);
        }
    }

    Ok(())
}

/// File, then environment, then command line flags
fn load_config(cli: &Cli) -> anyhow::Result<VoxcallConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            debug!("Loading configuration from {}", path.display());
            VoxcallConfig::from_file(path.clone())?
        }
        None => VoxcallConfig::default(),
    };

    config.apply_env();
    apply_overrides(cli, &mut config);

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut VoxcallConfig) {
    if let Some(ref url) = cli.base_url {
        config.speech.base_url = url.clone();
    }
    if let Some(ref key) = cli.api_key {
        config.settings.store.api_key = Some(key.clone());
    }
    if let Some(ref language) = cli.language {
        config.settings.preferences.preferred_language = Some(language.clone());
    }
    if let Some(enabled) = cli.server_configured {
        config.settings.server.voice_synthesis = enabled;
    }
}
