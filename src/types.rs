//! Core data types mirrored from the Ramorie backend
//!
//! These are the shapes the remote service returns for projects, tasks,
//! memories, annotations, decisions and the user's focus. The agent tool
//! server never owns this state; it only deserializes, filters and re-emits it.
//! Fields the backend may omit carry `#[serde(default)]` so a sparse payload
//! still parses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Task status values used by the backend
pub mod status {
    pub const TODO: &str = "TODO";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const COMPLETED: &str = "COMPLETED";
}

/// A project container for tasks and memories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// A unit of tracked work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
    /// Array or object depending on backend revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case(status::COMPLETED)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status.eq_ignore_ascii_case(status::IN_PROGRESS)
    }
}

/// A knowledge item stored against a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub content: String,
    /// Either plain strings or tag objects carrying a `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    /// Set when the memory was auto-linked to the active task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_task_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    /// Case-insensitive tag membership over either tag encoding
    pub fn has_tag(&self, tag: &str) -> bool {
        let Some(Value::Array(tags)) = &self.tags else {
            return false;
        };
        let wanted = tag.to_lowercase();

        tags.iter().any(|t| {
            let name = match t {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                _ => None,
            };
            name.is_some_and(|n| n.to_lowercase() == wanted)
        })
    }

    pub fn has_linked_task(&self) -> bool {
        self.linked_task_id.is_some()
    }
}

/// A note attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// Architectural decision record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub adr_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// The user's active workspace as tracked by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFocus {
    #[serde(default)]
    pub active_context_pack_id: Option<String>,
    #[serde(default)]
    pub active_pack: Option<FocusPack>,
}

/// Context pack details embedded in a focus response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusPack {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub pack_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub contexts_count: u64,
    #[serde(default)]
    pub memories_count: u64,
    #[serde(default)]
    pub tasks_count: u64,
    #[serde(default)]
    pub contexts: Vec<FocusContextPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusContextPreview {
    pub id: String,
    pub name: String,
}

/// Task priority as accepted by `create_task`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Normalize free-form input; anything unrecognized becomes Medium
    pub fn normalize(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Priority::Medium)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "H" | "HIGH" => Some(Priority::High),
            "M" | "MEDIUM" => Some(Priority::Medium),
            "L" | "LOW" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Wire code sent to the backend
    pub fn code(&self) -> &'static str {
        match self {
            Priority::High => "H",
            Priority::Medium => "M",
            Priority::Low => "L",
        }
    }

    /// Ordering rank of a stored priority string (unknown = 0)
    pub fn rank(raw: &str) -> u8 {
        match Self::parse(raw) {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
