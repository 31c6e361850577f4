//! `toolloop run`: send one message through the agent loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use toolloop_agent::AgentLoop;
use toolloop_config::AppConfig;
use toolloop_core::{ExecutionContext, StopReason};
use toolloop_memory::InMemoryScratch;
use toolloop_providers::OpenAiCompatGateway;
use tracing::{info, warn};

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    max_turns: Option<u32>,
    store: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        warn_missing_key();
    }

    let message = match message {
        Some(m) => m,
        None => read_stdin().await?,
    };
    if message.trim().is_empty() {
        return Err("No message given. Pass -m/--message or pipe text on stdin.".into());
    }

    let store = super::open_store(&config, store)?;
    let gateway = Arc::new(OpenAiCompatGateway::from_config(&config));
    let tools = Arc::new(toolloop_tools::default_registry());
    let ctx = ExecutionContext::new(gateway, store, tools, Arc::new(InMemoryScratch::new()));

    let mut agent = AgentLoop::from_config(ctx, &config);
    if let Some(max) = max_turns {
        agent = agent.with_max_turns(max);
    }

    // Ctrl+C stops the run before the next model call.
    let cancel = CancellationToken::new();
    agent = agent.with_cancellation(cancel.clone());
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current step");
                cancel.cancel();
            }
        }
    });

    let result = agent.run(message).await;
    watcher.abort();
    let outcome = result?;

    match outcome.stop_reason {
        StopReason::FinalAnswer => {}
        StopReason::NaturalStop => warn!("Model stopped without an answer"),
        StopReason::TurnBudgetExceeded => {
            warn!(turns = outcome.turns, "Turn budget exhausted before a final answer")
        }
        StopReason::Cancelled => warn!("Run cancelled"),
    }

    if let Some(content) = outcome.content {
        println!("{content}");
    }

    Ok(())
}

async fn read_stdin() -> Result<String, Box<dyn std::error::Error>> {
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

fn warn_missing_key() {
    eprintln!();
    eprintln!("  WARNING: No API key configured.");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    TOOLLOOP_API_KEY=sk-...   (preferred)");
    eprintln!("    OPENAI_API_KEY=sk-...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Continuing without a key (fine for local endpoints such as Ollama).");
    eprintln!();
}
