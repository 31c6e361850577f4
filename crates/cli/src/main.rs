//! toolloop CLI — the main entry point.
//!
//! Commands:
//! - `run`    : Send one message through the agent loop
//! - `history`: Print a stored conversation log
//! - `tools`  : List the built-in tools
//! - `config` : Show, validate or locate configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "toolloop",
    about = "toolloop: a tool-using agent loop for LLMs",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to ~/.toolloop/config.toml)
    #[arg(short, long, global = true, env = "TOOLLOOP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent on a single message
    Run {
        /// The message to send (read from stdin when omitted)
        #[arg(short, long)]
        message: Option<String>,

        /// Override the turn budget
        #[arg(long)]
        max_turns: Option<u32>,

        /// Append the conversation to this JSON-lines file
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print the messages stored in a JSON-lines history file
    History {
        /// History file (defaults to the configured store path)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// List the built-in tools
    Tools,

    /// Configuration commands (prints the default config when no action is given)
    Config {
        #[command(subcommand)]
        action: Option<commands::config_cmd::ConfigAction>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            message,
            max_turns,
            store,
        } => commands::run::run(config_path, message, max_turns, store).await?,
        Commands::History { store } => commands::history::run(config_path, store).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Config { action } => commands::config_cmd::run(config_path, action).await?,
    }

    Ok(())
}
