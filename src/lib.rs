//! Ramorie - agent tool server for the Ramorie task and memory service
//!
//! Exposes projects, tasks, memories, focus and decisions held by the remote
//! Ramorie backend to AI agents over the Model Context Protocol.
//!
//! # Architecture
//!
//! - **Types**: Backend data shapes (Project, Task, Memory, ...)
//! - **Backend**: `Backend` trait and its reqwest implementation
//! - **Config**: Local `~/.ramorie/config.json` and client settings
//! - **MCP**: JSON-RPC stdio server, tool catalog, dispatcher and recall search
//!
//! # Example
//!
//! ```ignore
//! use ramorie_core::{ConfigStore, HttpBackend, McpServer, ToolHandler};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = ConfigStore::default_location()?;
//!     let backend = HttpBackend::from_config(&store)?;
//!     let server = McpServer::new(ToolHandler::new(Arc::new(backend), store));
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod mcp;
pub mod types;

// Re-export commonly used types
pub use backend::{Backend, HttpBackend};
pub use config::{ClientSettings, ConfigStore, LocalConfig};
pub use error::{RamorieError, Result};
pub use mcp::{McpServer, ToolHandler};
pub use types::{Annotation, Decision, Memory, Priority, Project, Task, UserFocus};
