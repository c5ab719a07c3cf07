//! Backend collaborator abstraction
//!
//! All project, task and memory state lives on the remote Ramorie service.
//! The tool dispatcher talks to it only through the [`Backend`] trait, so the
//! protocol layer can be exercised against an in-memory fake in tests.
//!
//! Implementations perform exactly one remote call per method, never retry,
//! and surface failures immediately.

pub mod http;

use crate::error::Result;
use crate::types::{Annotation, Decision, Memory, Project, Task, UserFocus};
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpBackend;

/// HTTP verb for the generic passthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub project_id: Option<String>,
    pub status: Option<String>,
    /// Free-text search handled server-side
    pub q: Option<String>,
}

/// Filters for listing memories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    pub project_id: Option<String>,
}

/// Payload for creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub priority: String,
}

/// Payload for recording a decision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDecision {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub area: Option<String>,
    pub context: Option<String>,
    pub consequences: Option<String>,
}

/// Filters for listing decisions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionQuery {
    pub status: Option<String>,
    pub area: Option<String>,
    pub limit: Option<usize>,
}

/// Scope for the stats report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsQuery {
    pub project_id: Option<String>,
}

/// Remote operations consumed by the tool dispatcher
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    // Projects
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, name: &str, description: &str) -> Result<Project>;
    async fn get_project(&self, id: &str) -> Result<Project>;
    async fn set_project_active(&self, id: &str) -> Result<()>;

    // Tasks
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>>;
    async fn create_task(&self, task: &NewTask) -> Result<Task>;
    async fn get_task(&self, id: &str) -> Result<Task>;
    async fn update_task(&self, id: &str, updates: &Value) -> Result<Task>;
    async fn start_task(&self, id: &str) -> Result<()>;
    async fn complete_task(&self, id: &str) -> Result<()>;
    async fn stop_task(&self, id: &str) -> Result<()>;
    async fn get_active_task(&self) -> Result<Option<Task>>;
    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation>;

    // Memories
    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory>;
    async fn list_memories(&self, query: &MemoryQuery) -> Result<Vec<Memory>>;
    async fn get_memory(&self, id: &str) -> Result<Memory>;

    // Focus
    async fn get_focus(&self) -> Result<UserFocus>;
    async fn set_focus(&self, pack_id: &str) -> Result<UserFocus>;
    async fn clear_focus(&self) -> Result<()>;

    // Decisions
    async fn create_decision(&self, decision: &NewDecision) -> Result<Decision>;
    async fn list_decisions(&self, query: &DecisionQuery) -> Result<Vec<Decision>>;

    // Reports
    /// Raw `/reports/stats` payload; its shape is owned by the backend
    async fn get_stats(&self, query: &StatsQuery) -> Result<Value>;
}
