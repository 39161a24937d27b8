mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reelchat_logging::reel_info;

use platform::app::{run_chat, ChatMode};
use platform::config::{AppConfig, DEFAULT_CONFIG_PATH};
use platform::plexus::{run_plexus, PlexusOptions};

#[derive(Parser)]
#[command(name = "reelchat", version, about = "Chat front end for a short-video generation webhook")]
struct Cli {
    /// Config file (RON)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Webhook URL to try; repeat for fallbacks. Replaces the configured list.
    #[arg(long = "endpoint", global = true)]
    endpoints: Vec<String>,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat on stdin (default)
    Chat,
    /// Submit a single topic and wait for the result
    Send {
        /// Topic for the video
        topic: String,
    },
    /// Run the particle background in the terminal
    Plexus {
        #[arg(long, default_value_t = 80)]
        cols: u16,
        #[arg(long, default_value_t = 24)]
        rows: u16,
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let from_file = loaded.is_some();
    let config = loaded
        .unwrap_or_default()
        .with_overrides(cli.endpoints, cli.debug)
        .context("applying command-line overrides")?;
    platform::logging::initialize(config.log_destination, config.debug);
    if from_file {
        reel_info!("Loaded config from {}", cli.config.display());
    } else {
        reel_info!("No config at {}; using defaults", cli.config.display());
    }
    reel_info!(
        "reelchat starting; {} webhook endpoint(s) configured",
        config.endpoints.len()
    );

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            run_chat(config.dispatch_settings(), ChatMode::Interactive)?;
        }
        Command::Send { topic } => {
            let topic = topic.trim().to_string();
            if topic.is_empty() {
                bail!("topic must not be empty");
            }
            let summary = run_chat(config.dispatch_settings(), ChatMode::Once(topic))?;
            if summary.ended_with_error {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Plexus {
            cols,
            rows,
            frames,
            fps,
        } => run_plexus(PlexusOptions {
            cols,
            rows,
            frames,
            fps,
        })?,
    }
    Ok(ExitCode::SUCCESS)
}
