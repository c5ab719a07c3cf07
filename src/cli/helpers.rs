//! Shared helper functions for CLI commands

use anyhow::Context;
use ramorie_core::{error::Result, ConfigStore, HttpBackend, ToolHandler};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Build a tool handler backed by the configured HTTP backend
pub fn build_tool_handler() -> Result<ToolHandler> {
    let store = ConfigStore::default_location().context("Failed to locate config file")?;
    debug!("Using config file {}", store.path().display());

    let backend =
        HttpBackend::from_config(&store).context("Failed to initialize backend client")?;
    debug!("Backend endpoint: {}", backend.base_url());

    Ok(ToolHandler::new(Arc::new(backend), store))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
