//! Subcommand implementations and the wiring they share.

pub mod config_cmd;
pub mod history;
pub mod run;
pub mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolloop_config::AppConfig;
use toolloop_core::MessageStore;
use toolloop_memory::{FileStore, InMemoryStore};

/// Load configuration from an explicit file, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => AppConfig::load()?,
    };
    Ok(config)
}

/// Pick the message store: an explicit file wins over the configured backend.
pub fn open_store(
    config: &AppConfig,
    explicit: Option<PathBuf>,
) -> Result<Arc<dyn MessageStore>, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(Arc::new(FileStore::open(path)?));
    }

    match (config.store.backend.as_str(), config.store.path.as_deref()) {
        ("file", Some(path)) => Ok(Arc::new(FileStore::open(path)?)),
        _ => Ok(Arc::new(InMemoryStore::new())),
    }
}

/// The history file `history` reads when no `--store` is given.
pub fn history_path(config: &AppConfig, explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| config.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(FileStore::default_path)
}
