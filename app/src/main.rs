#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, IngestInput, IngestStrategy, InfoStrategy,
    InitStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "amie")]
#[command(about = "Amie, a French conversation partner that tracks your vocabulary")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk with Amie (default). Type /vocab, /chat or /exit at any time
    Chat {
        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Extract vocabulary from your lesson notes into the vocabulary list
    Ingest {
        /// Notes directory (defaults to the configured raw_dir)
        #[arg(short, long)]
        raw_dir: Option<PathBuf>,

        /// Re-extract every note even if a cached extraction exists
        #[arg(long)]
        refresh_cache: bool,
    },
    /// Show configuration and vocabulary statistics
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

/// Logs go to stderr so they never interleave with the conversation.
fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot install tracing subscriber: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat { model: None }) {
        Commands::Chat { model } => {
            init_tracing("warn")?;
            ChatStrategy.execute(ChatInput { model }).await
        }
        Commands::Ingest {
            raw_dir,
            refresh_cache,
        } => {
            init_tracing("info")?;
            IngestStrategy
                .execute(IngestInput {
                    raw_dir,
                    refresh_cache,
                })
                .await
        }
        Commands::Info => {
            init_tracing("warn")?;
            InfoStrategy.execute(()).await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
