//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tribuna_core::config::{Config, Delivery, paths};
use tribuna_core::conversation::Mode;

mod commands;

#[derive(Parser)]
#[command(name = "tribuna")]
#[command(version)]
#[command(about = "Chat terminal sobre programas electorales")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question to send
        #[arg(short, long)]
        prompt: String,

        /// Query mode (neutral, personal)
        #[arg(short, long)]
        mode: Option<String>,

        /// Use the batch endpoint instead of streaming
        #[arg(long)]
        batch: bool,

        /// Continue an existing backend thread by ID
        #[arg(long, value_name = "ID")]
        thread: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    let _log_guard = tribuna_core::logging::init(&paths::log_dir());

    // default to chat mode
    let Some(command) = cli.command else {
        return tribuna_tui::run_interactive_chat(&config).await;
    };

    match command {
        Commands::Ask {
            prompt,
            mode,
            batch,
            thread,
        } => {
            let mode = match mode.as_deref() {
                Some(value) => parse_mode(value)?,
                None => config.mode,
            };
            let delivery = if batch {
                Delivery::Batch
            } else {
                config.delivery
            };
            commands::ask::run(&config, &prompt, mode, delivery, thread.as_deref()).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
        },
    }
}

fn parse_mode(value: &str) -> Result<Mode> {
    match value {
        "neutral" => Ok(Mode::Neutral),
        "personal" => Ok(Mode::Personal),
        other => anyhow::bail!("Unknown mode '{other}' (expected: neutral, personal)"),
    }
}
