//! Configuration management command

use anyhow::Context;
use clap::Subcommand;
use ramorie_core::config::{mask_api_key, ClientSettings, ConfigStore};
use ramorie_core::error::{RamorieError, Result};
use std::io::Write;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the local configuration
    Show,

    /// Store the API key in ~/.ramorie/config.json
    SetKey {
        /// API key (if not provided, will prompt interactively)
        key: Option<String>,
    },

    /// Forget the locally active project
    ClearProject,
}

/// Handle configuration management command
pub async fn handle(action: ConfigAction) -> Result<()> {
    let store = ConfigStore::default_location().context("Failed to locate config file")?;

    match action {
        ConfigAction::Show => {
            let cfg = store
                .load()
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            let settings = ClientSettings::load().context("Failed to load client settings")?;

            println!("Config file:    {}", store.path().display());
            println!("API endpoint:   {}", settings.api_base_url);
            println!("Timeout:        {}s", settings.timeout_secs);
            match &cfg.api_key {
                Some(key) => println!("API key:        {}", mask_api_key(key)),
                None => println!("API key:        (not set)"),
            }
            println!(
                "Active project: {}",
                cfg.active_project_id.as_deref().unwrap_or("(none)")
            );
            Ok(())
        }
        ConfigAction::SetKey { key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    print!("Enter API key: ");
                    std::io::stdout().flush()?;
                    let mut input = String::new();
                    std::io::stdin()
                        .read_line(&mut input)
                        .context("Failed to read API key")?;
                    input
                }
            };

            let key = normalize_key(&key)?;
            store.update(|cfg| cfg.api_key = Some(key))?;
            println!("API key saved to {}", store.path().display());
            Ok(())
        }
        ConfigAction::ClearProject => {
            store.update(|cfg| cfg.active_project_id = None)?;
            println!("Active project cleared");
            Ok(())
        }
    }
}

fn normalize_key(raw: &str) -> Result<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(RamorieError::missing_argument("API key"));
    }
    Ok(key.to_string())
}
