//! CLI command handlers
//!
//! Each subcommand is implemented in its own module and exposes a `handle`
//! entry point called from `main`.

pub mod config;
pub mod helpers;
pub mod mcp;
pub mod recall;
