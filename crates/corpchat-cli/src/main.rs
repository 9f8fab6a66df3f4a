mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "corpchat", about = "Terminal client for the Corpchat assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage conversation threads
    Threads {
        #[command(subcommand)]
        command: ThreadCommand,
    },
    /// Chat interactively on a thread
    Chat {
        /// Thread id to resume; a new thread is created when omitted
        #[arg(long)]
        thread: Option<String>,
    },
}

#[derive(Subcommand)]
enum ThreadCommand {
    /// List your threads
    List,
    /// Create a thread
    New { title: String },
    /// Rename a thread
    Rename { id: String, title: String },
    /// Delete a thread
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load();

    match cli.command {
        Command::Threads { command } => commands::threads(&config, command).await,
        Command::Chat { thread } => commands::chat(&config, thread).await,
    }
}
