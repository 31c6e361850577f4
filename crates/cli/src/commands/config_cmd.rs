//! `toolloop config`: configuration commands.

use clap::Subcommand;
use std::path::Path;
use toolloop_config::AppConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Default,
    /// Print the effective configuration (file + environment)
    Show,
    /// Check the configuration and report problems
    Validate,
    /// Print the default config file location
    Path,
}

pub async fn run(
    config_path: Option<&Path>,
    action: Option<ConfigAction>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action.unwrap_or(ConfigAction::Default) {
        ConfigAction::Default => print!("{}", AppConfig::default_toml()),
        ConfigAction::Show => show(config_path)?,
        ConfigAction::Validate => validate(config_path)?,
        ConfigAction::Path => println!("{}", AppConfig::config_dir().join("config.toml").display()),
    }
    Ok(())
}

fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    // Never echo the key.
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match super::load_config(config_path) {
        Ok(config) => {
            println!("Config OK");
            if !config.has_api_key() {
                println!("  warning: no API key set (TOOLLOOP_API_KEY or OPENAI_API_KEY)");
            }
            println!("  model:     {}", config.default_model);
            println!("  api_url:   {}", config.api_url);
            println!("  max_turns: {}", config.agent.max_turns);
            println!("  store:     {}", config.store.backend);
            Ok(())
        }
        Err(e) => {
            println!("Config error: {e}");
            Err(e)
        }
    }
}
