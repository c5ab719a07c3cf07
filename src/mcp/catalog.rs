//! Static tool catalog
//!
//! [`ToolName`] enumerates every tool exactly once. Descriptors here and
//! handlers in [`super::tools`] are both exhaustive matches over it, so a
//! tool cannot be advertised without being dispatchable or vice versa.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// Tool schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (e.g., "create_task")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// How often an agent is expected to reach for a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Essential,
    Common,
    Advanced,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Essential => "ESSENTIAL",
            Tier::Common => "COMMON",
            Tier::Advanced => "ADVANCED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetRamorieInfo,
    SetupAgent,
    ListProjects,
    SetActiveProject,
    ListTasks,
    CreateTask,
    GetTask,
    StartTask,
    CompleteTask,
    GetNextTasks,
    AddMemory,
    ListMemories,
    GetFocus,
    SetFocus,
    ClearFocus,
    AddTaskNote,
    UpdateProgress,
    SearchTasks,
    GetActiveTask,
    GetMemory,
    Recall,
    CreateDecision,
    ListDecisions,
    GetStats,
    CreateProject,
    GetCursorRules,
    ExportProject,
    StopTask,
}

impl ToolName {
    /// Catalog order
    pub const ALL: [ToolName; 28] = [
        ToolName::GetRamorieInfo,
        ToolName::SetupAgent,
        ToolName::ListProjects,
        ToolName::SetActiveProject,
        ToolName::ListTasks,
        ToolName::CreateTask,
        ToolName::GetTask,
        ToolName::StartTask,
        ToolName::CompleteTask,
        ToolName::GetNextTasks,
        ToolName::AddMemory,
        ToolName::ListMemories,
        ToolName::GetFocus,
        ToolName::SetFocus,
        ToolName::ClearFocus,
        ToolName::AddTaskNote,
        ToolName::UpdateProgress,
        ToolName::SearchTasks,
        ToolName::GetActiveTask,
        ToolName::GetMemory,
        ToolName::Recall,
        ToolName::CreateDecision,
        ToolName::ListDecisions,
        ToolName::GetStats,
        ToolName::CreateProject,
        ToolName::GetCursorRules,
        ToolName::ExportProject,
        ToolName::StopTask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetRamorieInfo => "get_ramorie_info",
            ToolName::SetupAgent => "setup_agent",
            ToolName::ListProjects => "list_projects",
            ToolName::SetActiveProject => "set_active_project",
            ToolName::ListTasks => "list_tasks",
            ToolName::CreateTask => "create_task",
            ToolName::GetTask => "get_task",
            ToolName::StartTask => "start_task",
            ToolName::CompleteTask => "complete_task",
            ToolName::GetNextTasks => "get_next_tasks",
            ToolName::AddMemory => "add_memory",
            ToolName::ListMemories => "list_memories",
            ToolName::GetFocus => "get_focus",
            ToolName::SetFocus => "set_focus",
            ToolName::ClearFocus => "clear_focus",
            ToolName::AddTaskNote => "add_task_note",
            ToolName::UpdateProgress => "update_progress",
            ToolName::SearchTasks => "search_tasks",
            ToolName::GetActiveTask => "get_active_task",
            ToolName::GetMemory => "get_memory",
            ToolName::Recall => "recall",
            ToolName::CreateDecision => "create_decision",
            ToolName::ListDecisions => "list_decisions",
            ToolName::GetStats => "get_stats",
            ToolName::CreateProject => "create_project",
            ToolName::GetCursorRules => "get_cursor_rules",
            ToolName::ExportProject => "export_project",
            ToolName::StopTask => "stop_task",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            ToolName::GetRamorieInfo
            | ToolName::SetupAgent
            | ToolName::ListProjects
            | ToolName::SetActiveProject
            | ToolName::ListTasks
            | ToolName::CreateTask
            | ToolName::GetTask
            | ToolName::StartTask
            | ToolName::CompleteTask
            | ToolName::GetNextTasks
            | ToolName::AddMemory
            | ToolName::ListMemories
            | ToolName::GetFocus
            | ToolName::SetFocus
            | ToolName::ClearFocus => Tier::Essential,

            ToolName::AddTaskNote
            | ToolName::UpdateProgress
            | ToolName::SearchTasks
            | ToolName::GetActiveTask
            | ToolName::GetMemory
            | ToolName::Recall
            | ToolName::CreateDecision
            | ToolName::ListDecisions
            | ToolName::GetStats => Tier::Common,

            ToolName::CreateProject
            | ToolName::GetCursorRules
            | ToolName::ExportProject
            | ToolName::StopTask => Tier::Advanced,
        }
    }

    /// Name to variant table, built once per handler
    pub fn lookup_table() -> HashMap<&'static str, ToolName> {
        Self::ALL.iter().map(|t| (t.as_str(), *t)).collect()
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

fn task_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "taskId": {"type": "string", "description": "Task ID"}
        },
        "required": ["taskId"]
    })
}

fn describe(tool: ToolName, text: &str) -> String {
    format!("{} | {}", tool.tier().label(), text)
}

/// Declarative descriptor for one tool
pub fn descriptor(tool: ToolName) -> Tool {
    let (description, input_schema) = match tool {
        ToolName::GetRamorieInfo => (
            "CALL THIS FIRST! Get information about Ramorie: what it is, how to use it, and agent guidelines.",
            empty_schema(),
        ),
        ToolName::SetupAgent => (
            "Initialize agent session. Returns current context, active project, pending tasks, and recommended actions.",
            empty_schema(),
        ),
        ToolName::ListProjects => (
            "List all projects. Check this to see available projects and which one is active.",
            empty_schema(),
        ),
        ToolName::SetActiveProject => (
            "Set the active project. All new tasks and memories will be created in this project.",
            json!({
                "type": "object",
                "properties": {
                    "projectName": {"type": "string", "description": "Project name or ID"}
                },
                "required": ["projectName"]
            }),
        ),
        ToolName::ListTasks => (
            "List tasks with filtering. Call before create_task to check for duplicates.",
            json!({
                "type": "object",
                "properties": {
                    "status": {"type": "string", "description": "Filter: TODO, IN_PROGRESS, COMPLETED"},
                    "project": {"type": "string", "description": "Project name or ID"},
                    "limit": {"type": "number", "description": "Max results"}
                }
            }),
        ),
        ToolName::CreateTask => (
            "Create a new task. Always check list_tasks first to avoid duplicates!",
            json!({
                "type": "object",
                "properties": {
                    "description": {"type": "string", "description": "Task description - clear and actionable"},
                    "priority": {"type": "string", "description": "Priority: H=High, M=Medium, L=Low"},
                    "project": {"type": "string", "description": "Project name or ID (uses active if not specified)"}
                },
                "required": ["description"]
            }),
        ),
        ToolName::GetTask => (
            "Get task details including notes and metadata.",
            task_id_schema(),
        ),
        ToolName::StartTask => (
            "Start working on a task. Sets status to IN_PROGRESS and enables memory auto-linking.",
            task_id_schema(),
        ),
        ToolName::CompleteTask => (
            "Mark task as completed. Use when work is finished.",
            task_id_schema(),
        ),
        ToolName::GetNextTasks => (
            "Get prioritized open tasks. Use at session start to see what needs attention.",
            json!({
                "type": "object",
                "properties": {
                    "count": {"type": "number", "description": "Number of tasks (default: 5)"},
                    "project": {"type": "string", "description": "Project name or ID"}
                }
            }),
        ),
        ToolName::AddMemory => (
            "Store important information to the knowledge base. Auto-links to the active task.",
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string", "description": "Memory content - be descriptive"},
                    "project": {"type": "string", "description": "Project name or ID"}
                },
                "required": ["content"]
            }),
        ),
        ToolName::ListMemories => (
            "List memories with optional filtering by project or term.",
            json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string", "description": "Project name or ID"},
                    "term": {"type": "string", "description": "Filter by keyword"},
                    "limit": {"type": "number", "description": "Max results"}
                }
            }),
        ),
        ToolName::GetFocus => (
            "Get the user's current focus (active workspace) and its context pack details.",
            empty_schema(),
        ),
        ToolName::SetFocus => (
            "Set the user's active focus (workspace). Switch to a different context pack.",
            json!({
                "type": "object",
                "properties": {
                    "packId": {"type": "string", "description": "Context pack ID to activate"}
                },
                "required": ["packId"]
            }),
        ),
        ToolName::ClearFocus => (
            "Clear the user's active focus. Deactivates the current context pack.",
            empty_schema(),
        ),
        ToolName::AddTaskNote => (
            "Add a note to a task. Use for progress updates or context.",
            json!({
                "type": "object",
                "properties": {
                    "taskId": {"type": "string", "description": "Task ID"},
                    "note": {"type": "string", "description": "Note text"}
                },
                "required": ["taskId", "note"]
            }),
        ),
        ToolName::UpdateProgress => (
            "Update task progress percentage (0-100).",
            json!({
                "type": "object",
                "properties": {
                    "taskId": {"type": "string", "description": "Task ID"},
                    "progress": {"type": "number", "description": "Percent complete, 0-100"}
                },
                "required": ["taskId", "progress"]
            }),
        ),
        ToolName::SearchTasks => (
            "Search tasks by keyword. Use to find specific tasks.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"},
                    "status": {"type": "string", "description": "Filter: TODO, IN_PROGRESS, COMPLETED"},
                    "project": {"type": "string", "description": "Project name or ID"},
                    "limit": {"type": "number", "description": "Max results"}
                },
                "required": ["query"]
            }),
        ),
        ToolName::GetActiveTask => (
            "Get the currently active task. Memories auto-link to this task.",
            empty_schema(),
        ),
        ToolName::GetMemory => (
            "Get memory details by ID.",
            json!({
                "type": "object",
                "properties": {
                    "memoryId": {"type": "string", "description": "Memory ID"}
                },
                "required": ["memoryId"]
            }),
        ),
        ToolName::Recall => (
            "Relevance-ranked memory search. Space-separated terms match ANY (OR), comma-separated terms must ALL match (AND). Supports project, tag and linked-task filters.",
            json!({
                "type": "object",
                "properties": {
                    "term": {
                        "type": "string",
                        "description": "Search terms. Space = OR (any match), comma = AND (all must match). Example: 'traefik docker' finds either, 'traefik,docker' finds both."
                    },
                    "project": {"type": "string", "description": "Filter by project name or ID"},
                    "tag": {"type": "string", "description": "Filter by tag name"},
                    "linked_task": {"type": "boolean", "description": "If true, only return memories linked to a task"},
                    "include_relations": {"type": "boolean", "description": "Include project, linked task and tags (default: true)"},
                    "limit": {"type": "number", "description": "Max results (default: 20)"},
                    "min_score": {"type": "number", "description": "Minimum relevance score (default: 0)"}
                },
                "required": ["term"]
            }),
        ),
        ToolName::CreateDecision => (
            "Record an architectural decision (ADR). Use for important technical choices.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Decision title"},
                    "description": {"type": "string", "description": "What was decided"},
                    "status": {"type": "string", "description": "draft, proposed, approved, deprecated"},
                    "area": {"type": "string", "description": "Frontend, Backend, Architecture, etc."},
                    "context": {"type": "string", "description": "Why this decision?"},
                    "consequences": {"type": "string", "description": "What are the impacts?"}
                },
                "required": ["title"]
            }),
        ),
        ToolName::ListDecisions => (
            "List architectural decisions. Review past decisions before making new ones.",
            json!({
                "type": "object",
                "properties": {
                    "status": {"type": "string", "description": "draft, proposed, approved, deprecated"},
                    "area": {"type": "string", "description": "Decision area"},
                    "limit": {"type": "number", "description": "Max results"}
                }
            }),
        ),
        ToolName::GetStats => (
            "Get task statistics and completion rates.",
            json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string", "description": "Project name or ID"}
                }
            }),
        ),
        ToolName::CreateProject => (
            "Create a new project. Check list_projects first - don't create duplicates!",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Project name - must be unique"},
                    "description": {"type": "string", "description": "Project description"}
                },
                "required": ["name"]
            }),
        ),
        ToolName::GetCursorRules => (
            "Get Cursor IDE rules for Ramorie. Returns markdown for a .cursorrules file.",
            json!({
                "type": "object",
                "properties": {
                    "format": {"type": "string", "description": "markdown (default) or json"}
                }
            }),
        ),
        ToolName::ExportProject => (
            "Export a project report in markdown format.",
            json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string", "description": "Project name or ID"},
                    "format": {"type": "string", "description": "Report format (default: markdown)"}
                },
                "required": ["project"]
            }),
        ),
        ToolName::StopTask => (
            "Pause a task. Clears the active task, keeps IN_PROGRESS status.",
            task_id_schema(),
        ),
    };

    Tool {
        name: tool.as_str().to_string(),
        description: describe(tool, description),
        input_schema,
    }
}

/// The full catalog in advertised order
pub fn catalog() -> Vec<Tool> {
    ToolName::ALL.iter().map(|t| descriptor(*t)).collect()
}
