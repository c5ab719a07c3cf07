//! Model Context Protocol (MCP) server implementation
//!
//! Provides a JSON-RPC 2.0 server over stdio that exposes the Ramorie task,
//! memory and decision operations to agents as a fixed catalog of tools.

pub mod args;
pub mod catalog;
pub mod export;
pub mod guide;
pub mod protocol;
pub mod recall;
pub mod server;
pub mod session;
pub mod tools;

pub use catalog::{Tool, ToolName};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult};
pub use server::McpServer;
pub use session::{Session, SessionState};
pub use tools::ToolHandler;
