//! MCP tool implementations
//!
//! [`ToolHandler`] owns the backend handle and the local config store and maps
//! each [`ToolName`] to one handler. Handlers validate their typed arguments,
//! perform a single unit of backend work and return a JSON value. Failures
//! come back as [`RamorieError`] and are encoded by the server as tool-level
//! errors.

use super::args::{
    self, AddMemoryArgs, AddTaskNoteArgs, CreateDecisionArgs, CreateProjectArgs, CreateTaskArgs,
    ExportProjectArgs, FormatArgs, ListDecisionsArgs, ListMemoriesArgs, ListTasksArgs,
    MemoryIdArgs, NextTasksArgs, ProjectArgs, RecallArgs, SearchTasksArgs, SetActiveProjectArgs,
    SetFocusArgs, TaskIdArgs, UpdateProgressArgs,
};
use super::catalog::{self, Tool, ToolName};
use super::{export, guide, recall};
use crate::backend::{
    Backend, DecisionQuery, MemoryQuery, NewDecision, NewTask, StatsQuery, TaskQuery,
};
use crate::config::ConfigStore;
use crate::error::{RamorieError, Result};
use crate::types::{status, FocusPack, Priority, Project, Task};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rank added to in-progress tasks when choosing what to work on next
const IN_PROGRESS_BOOST: u8 = 2;

/// Tool handler that dispatches to appropriate implementation
pub struct ToolHandler {
    backend: Arc<dyn Backend>,
    config: ConfigStore,
    lookup: HashMap<&'static str, ToolName>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(backend: Arc<dyn Backend>, config: ConfigStore) -> Self {
        Self {
            backend,
            config,
            lookup: ToolName::lookup_table(),
        }
    }

    /// Get list of all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        catalog::catalog()
    }

    pub fn resolve(&self, tool_name: &str) -> Option<ToolName> {
        self.lookup.get(tool_name).copied()
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_name: &str, params: &Map<String, Value>) -> Result<Value> {
        let Some(tool) = self.resolve(tool_name) else {
            warn!("Unknown tool: {}", tool_name);
            return Err(RamorieError::ToolNotImplemented(tool_name.to_string()));
        };

        debug!("Executing tool: {}", tool);
        self.dispatch(tool, params).await
    }

    async fn dispatch(&self, tool: ToolName, params: &Map<String, Value>) -> Result<Value> {
        match tool {
            ToolName::GetRamorieInfo => Ok(guide::ramorie_info()),
            ToolName::SetupAgent => Ok(self.setup_agent().await),
            ToolName::ListProjects => to_json(self.backend.list_projects().await?),
            ToolName::SetActiveProject => self.set_active_project(args::parse(params)?).await,
            ToolName::ListTasks => self.list_tasks(args::parse(params)?).await,
            ToolName::CreateTask => self.create_task(args::parse(params)?).await,
            ToolName::GetTask => {
                let a: TaskIdArgs = args::parse(params)?;
                to_json(self.backend.get_task(&a.task_id).await?)
            }
            ToolName::StartTask => {
                let a: TaskIdArgs = args::parse(params)?;
                self.backend.start_task(&a.task_id).await?;
                Ok(json!({
                    "ok": true,
                    "message": "Task started. Memories will now auto-link to this task."
                }))
            }
            ToolName::CompleteTask => {
                let a: TaskIdArgs = args::parse(params)?;
                self.backend.complete_task(&a.task_id).await?;
                Ok(json!({"ok": true}))
            }
            ToolName::StopTask => {
                let a: TaskIdArgs = args::parse(params)?;
                self.backend.stop_task(&a.task_id).await?;
                Ok(json!({"ok": true}))
            }
            ToolName::GetNextTasks => self.get_next_tasks(args::parse(params)?).await,
            ToolName::AddMemory => self.add_memory(args::parse(params)?).await,
            ToolName::ListMemories => self.list_memories(args::parse(params)?).await,
            ToolName::GetFocus => self.get_focus().await,
            ToolName::SetFocus => self.set_focus(args::parse(params)?).await,
            ToolName::ClearFocus => {
                self.backend.clear_focus().await?;
                Ok(json!({"ok": true, "message": "Focus cleared"}))
            }
            ToolName::AddTaskNote => {
                let a: AddTaskNoteArgs = args::parse(params)?;
                to_json(self.backend.create_annotation(&a.task_id, &a.note).await?)
            }
            ToolName::UpdateProgress => {
                let a: UpdateProgressArgs = args::parse(params)?;
                let updates = json!({"progress": a.progress});
                to_json(self.backend.update_task(&a.task_id, &updates).await?)
            }
            ToolName::SearchTasks => self.search_tasks(args::parse(params)?).await,
            ToolName::GetActiveTask => match self.backend.get_active_task().await? {
                Some(task) => to_json(task),
                None => Ok(json!({
                    "active_task": null,
                    "message": "No active task. Use start_task to begin working on a task."
                })),
            },
            ToolName::GetMemory => {
                let a: MemoryIdArgs = args::parse(params)?;
                to_json(self.backend.get_memory(&a.memory_id).await?)
            }
            ToolName::Recall => self.recall(args::parse(params)?).await,
            ToolName::CreateDecision => self.create_decision(args::parse(params)?).await,
            ToolName::ListDecisions => {
                let a: ListDecisionsArgs = args::parse(params)?;
                let query = DecisionQuery {
                    status: a.status,
                    area: a.area,
                    limit: a.limit,
                };
                to_json(self.backend.list_decisions(&query).await?)
            }
            ToolName::GetStats => self.get_stats(args::parse(params)?).await,
            ToolName::CreateProject => {
                let a: CreateProjectArgs = args::parse(params)?;
                to_json(self.backend.create_project(&a.name, &a.description).await?)
            }
            ToolName::GetCursorRules => {
                let a: FormatArgs = args::parse(params)?;
                guide::cursor_rules(&a.format)
            }
            ToolName::ExportProject => self.export_project(args::parse(params)?).await,
        }
    }

    // === Project resolution ===

    /// Resolve a project name or id prefix, falling back to the active project
    ///
    /// Order when no identifier is given: local `active_project_id`, then the
    /// backend's active project.
    pub async fn resolve_project_id(&self, identifier: Option<&str>) -> Result<String> {
        if let Some(identifier) = identifier.map(str::trim).filter(|s| !s.is_empty()) {
            let projects = self.backend.list_projects().await?;
            return find_project(&projects, identifier)
                .map(|p| p.id.to_string())
                .ok_or_else(|| RamorieError::NotFound("project".to_string()));
        }

        match self.config.load() {
            Ok(cfg) => {
                if let Some(id) = cfg.active_project_id {
                    return Ok(id);
                }
            }
            Err(e) => warn!("Failed to read local config: {}", e),
        }

        let projects = self.backend.list_projects().await?;
        projects
            .iter()
            .find(|p| p.is_active)
            .map(|p| p.id.to_string())
            .ok_or(RamorieError::NoActiveProject)
    }

    /// Resolve only when the caller named a project
    async fn project_filter(&self, project: Option<&str>) -> Result<Option<String>> {
        match project {
            Some(p) => self.resolve_project_id(Some(p)).await.map(Some),
            None => Ok(None),
        }
    }

    async fn set_active_project(&self, a: SetActiveProjectArgs) -> Result<Value> {
        let projects = self.backend.list_projects().await?;
        let project = find_project(&projects, &a.project_name)
            .ok_or_else(|| RamorieError::NotFound("project".to_string()))?;
        let id = project.id.to_string();

        self.backend.set_project_active(&id).await?;

        if let Err(e) = self
            .config
            .update(|cfg| cfg.active_project_id = Some(id.clone()))
        {
            warn!("Failed to persist active project: {}", e);
        }

        Ok(json!({"ok": true, "project_id": id, "name": project.name}))
    }

    // === Tasks ===

    async fn list_tasks(&self, a: ListTasksArgs) -> Result<Value> {
        let query = TaskQuery {
            project_id: self.project_filter(a.project.as_deref()).await?,
            status: a.status,
            q: None,
        };
        let tasks = truncate(self.backend.list_tasks(&query).await?, a.limit);
        to_json(tasks)
    }

    async fn create_task(&self, a: CreateTaskArgs) -> Result<Value> {
        let priority = Priority::normalize(a.priority.as_deref().unwrap_or_default());
        let project_id = self.resolve_project_id(a.project.as_deref()).await?;

        let task = NewTask {
            project_id,
            title: a.description,
            description: String::new(),
            priority: priority.code().to_string(),
        };
        to_json(self.backend.create_task(&task).await?)
    }

    async fn get_next_tasks(&self, a: NextTasksArgs) -> Result<Value> {
        let query = TaskQuery {
            project_id: self.project_filter(a.project.as_deref()).await?,
            ..TaskQuery::default()
        };
        let tasks = self.backend.list_tasks(&query).await?;
        to_json(next_tasks(tasks, a.count))
    }

    async fn search_tasks(&self, a: SearchTasksArgs) -> Result<Value> {
        let query = TaskQuery {
            project_id: self.project_filter(a.project.as_deref()).await?,
            status: a.status,
            q: Some(a.query),
        };
        let tasks = truncate(self.backend.list_tasks(&query).await?, a.limit);
        to_json(tasks)
    }

    // === Memories ===

    async fn add_memory(&self, a: AddMemoryArgs) -> Result<Value> {
        let project_id = self.resolve_project_id(a.project.as_deref()).await?;
        to_json(self.backend.create_memory(&project_id, &a.content).await?)
    }

    async fn list_memories(&self, a: ListMemoriesArgs) -> Result<Value> {
        let query = MemoryQuery {
            project_id: self.project_filter(a.project.as_deref()).await?,
        };
        let mut memories = self.backend.list_memories(&query).await?;

        if let Some(term) = a.term.map(|t| t.to_lowercase()) {
            memories.retain(|m| m.content.to_lowercase().contains(&term));
        }

        to_json(truncate(memories, a.limit))
    }

    async fn recall(&self, a: RecallArgs) -> Result<Value> {
        let query = recall::RecallQuery::new(a.term)?
            .tag(a.tag)
            .linked_task_only(a.linked_task)
            .include_relations(a.include_relations)
            .limit(a.limit)
            .min_score(a.min_score);

        // An unknown project widens the search instead of failing it
        let project_id = match a.project.as_deref() {
            Some(p) => match self.resolve_project_id(Some(p)).await {
                Ok(id) => Some(id),
                Err(e) => {
                    debug!("Ignoring recall project filter {:?}: {}", p, e);
                    None
                }
            },
            None => None,
        };

        let memories = self
            .backend
            .list_memories(&MemoryQuery { project_id })
            .await?;

        let outcome = recall::recall(&memories, &query);
        debug!(
            "recall {:?}: {} of {} candidates matched",
            outcome.term,
            outcome.total_found,
            memories.len()
        );
        to_json(outcome)
    }

    // === Focus ===

    async fn get_focus(&self) -> Result<Value> {
        let focus = self.backend.get_focus().await?;
        match focus.active_pack {
            None => Ok(json!({
                "active_context_pack_id": null,
                "active_pack": null,
                "message": "No active focus set. Use set_focus to activate a context pack."
            })),
            Some(pack) => Ok(json!({
                "active_context_pack_id": focus.active_context_pack_id,
                "active_pack": pack,
            })),
        }
    }

    async fn set_focus(&self, a: SetFocusArgs) -> Result<Value> {
        let focus = self.backend.set_focus(&a.pack_id).await?;

        let mut result = json!({"ok": true, "message": "Focus updated successfully"});
        if let Some(pack) = &focus.active_pack {
            result["active_pack"] = pack_summary(pack);
        }
        Ok(result)
    }

    // === Decisions and reports ===

    async fn create_decision(&self, a: CreateDecisionArgs) -> Result<Value> {
        let decision = NewDecision {
            title: a.title,
            description: a.description,
            status: a.status,
            area: a.area,
            context: a.context,
            consequences: a.consequences,
        };
        to_json(self.backend.create_decision(&decision).await?)
    }

    async fn get_stats(&self, a: ProjectArgs) -> Result<Value> {
        let query = StatsQuery {
            project_id: self.project_filter(a.project.as_deref()).await?,
        };
        self.backend.get_stats(&query).await
    }

    async fn export_project(&self, a: ExportProjectArgs) -> Result<Value> {
        let project_id = self.resolve_project_id(Some(&a.project)).await?;
        let project = self.backend.get_project(&project_id).await?;

        let query = TaskQuery {
            project_id: Some(project_id),
            ..TaskQuery::default()
        };
        let tasks = self.backend.list_tasks(&query).await?;
        let markdown = export::render_markdown(&project, &tasks)?;

        Ok(json!({
            "project": project.name,
            "format": a.format,
            "markdown": markdown,
        }))
    }

    // === Onboarding ===

    /// Aggregate session context; every backend call here is best-effort
    async fn setup_agent(&self) -> Value {
        let mut result = json!({
            "status": "ready",
            "message": "Ramorie agent session initialized",
            "version": env!("CARGO_PKG_VERSION"),
        });

        let active_project_id = match self.config.load() {
            Ok(cfg) => cfg.active_project_id,
            Err(e) => {
                warn!("Failed to read local config: {}", e);
                None
            }
        };
        if let Some(id) = &active_project_id {
            result["active_project_id"] = json!(id);
        }

        match self.backend.get_focus().await {
            Ok(focus) => {
                if let Some(pack) = &focus.active_pack {
                    let mut summary = pack_summary(pack);
                    summary["pack_id"] = json!(focus.active_context_pack_id);
                    result["active_focus"] = summary;
                }
            }
            Err(e) => debug!("setup_agent: focus unavailable: {}", e),
        }

        match self.backend.list_projects().await {
            Ok(projects) => {
                if let Some(p) = projects.iter().find(|p| p.is_active) {
                    result["active_project"] = json!({"id": p.id, "name": p.name});
                }
                result["projects_count"] = json!(projects.len());
            }
            Err(e) => debug!("setup_agent: projects unavailable: {}", e),
        }

        match self.backend.get_active_task().await {
            Ok(Some(task)) => {
                result["active_task"] =
                    json!({"id": task.id, "title": task.title, "status": task.status});
            }
            Ok(None) => {}
            Err(e) => debug!("setup_agent: active task unavailable: {}", e),
        }

        if let Some(id) = active_project_id {
            let query = TaskQuery {
                project_id: Some(id),
                status: Some(status::TODO.to_string()),
                q: None,
            };
            match self.backend.list_tasks(&query).await {
                Ok(tasks) => result["pending_tasks_count"] = json!(tasks.len()),
                Err(e) => debug!("setup_agent: tasks unavailable: {}", e),
            }
        }

        match self.backend.get_stats(&StatsQuery::default()).await {
            Ok(stats) if stats.is_object() => result["stats"] = stats,
            Ok(_) => {}
            Err(e) => debug!("setup_agent: stats unavailable: {}", e),
        }

        let mut next_steps = Vec::new();
        if result.get("active_focus").is_none() {
            next_steps.push("Set an active focus: set_focus (for workspace context)");
        }
        if result.get("active_project").is_none() {
            next_steps.push("Set an active project: set_active_project");
        }
        if result.get("active_task").is_none() {
            next_steps.push("Start a task for memory auto-linking: start_task");
        }
        if next_steps.is_empty() {
            next_steps.push("Ready to work! Use get_next_tasks to see priorities");
        }
        result["next_steps"] = json!(next_steps);

        result
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn truncate<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Exact name match or id prefix
fn find_project<'a>(projects: &'a [Project], identifier: &str) -> Option<&'a Project> {
    projects
        .iter()
        .find(|p| p.name == identifier || p.id.to_string().starts_with(identifier))
}

fn pack_summary(pack: &FocusPack) -> Value {
    json!({
        "id": pack.id,
        "name": pack.name,
        "contexts_count": pack.contexts_count,
        "memories_count": pack.memories_count,
        "tasks_count": pack.tasks_count,
    })
}

fn next_rank(task: &Task) -> u8 {
    let boost = if task.is_in_progress() {
        IN_PROGRESS_BOOST
    } else {
        0
    };
    Priority::rank(&task.priority) + boost
}

/// Open tasks ordered by priority (in-progress boosted), oldest first on ties
pub fn next_tasks(mut tasks: Vec<Task>, count: usize) -> Vec<Task> {
    tasks.retain(|t| !t.is_completed());
    tasks.sort_by(|a, b| {
        next_rank(b)
            .cmp(&next_rank(a))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    tasks.truncate(count);
    tasks
}
