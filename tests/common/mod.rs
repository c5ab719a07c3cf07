//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ramorie_core::backend::{
    Backend, DecisionQuery, MemoryQuery, NewDecision, NewTask, StatsQuery, TaskQuery,
};
use ramorie_core::types::{
    status, Annotation, Decision, FocusPack, Memory, Project, Task, UserFocus,
};
use ramorie_core::{ConfigStore, McpServer, RamorieError, Result, ToolHandler};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// In-memory state behind [`FakeBackend`]
#[derive(Default)]
pub struct FakeState {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub memories: Vec<Memory>,
    pub decisions: Vec<Decision>,
    pub focus: UserFocus,
    pub active_task: Option<Uuid>,
}

/// Backend double that keeps everything in memory
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the state; never held across an await
    pub fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().expect("fake backend state poisoned");
        f(&mut state)
    }

    pub fn add_project(&self, name: &str, is_active: bool) -> Project {
        let project = project(name, is_active);
        self.with_state(|s| s.projects.push(project.clone()));
        project
    }

    pub fn add_task(
        &self,
        project: &Project,
        title: &str,
        status: &str,
        priority: &str,
        age_mins: i64,
    ) -> Task {
        let mut task = task(title, status, priority, Utc::now() - Duration::minutes(age_mins));
        task.project_id = Some(project.id);
        self.with_state(|s| s.tasks.push(task.clone()));
        task
    }

    pub fn add_memory(&self, project: &Project, content: &str) -> Memory {
        let mut memory = memory(content);
        memory.project_id = Some(project.id);
        memory.project = Some(project.clone());
        self.with_state(|s| s.memories.push(memory.clone()));
        memory
    }

    pub fn push_memory(&self, memory: Memory) {
        self.with_state(|s| s.memories.push(memory));
    }
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn not_found(what: &str) -> RamorieError {
    RamorieError::NotFound(what.to_string())
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.with_state(|s| s.projects.clone()))
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let mut project = project(name, false);
        project.description = description.to_string();
        self.with_state(|s| s.projects.push(project.clone()));
        Ok(project)
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.with_state(|s| s.projects.iter().find(|p| p.id.to_string() == id).cloned())
            .ok_or_else(|| not_found("project"))
    }

    async fn set_project_active(&self, id: &str) -> Result<()> {
        self.with_state(|s| -> Result<()> {
            if !s.projects.iter().any(|p| p.id.to_string() == id) {
                return Err(not_found("project"));
            }
            for p in &mut s.projects {
                p.is_active = p.id.to_string() == id;
            }
            Ok(())
        })
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        Ok(self.with_state(|s| {
            s.tasks
                .iter()
                .filter(|t| match &query.project_id {
                    Some(pid) => t.project_id.is_some_and(|id| id.to_string() == *pid),
                    None => true,
                })
                .filter(|t| query.status.as_deref().map_or(true, |st| t.status == st))
                .filter(|t| {
                    query
                        .q
                        .as_deref()
                        .map_or(true, |q| t.title.to_lowercase().contains(&q.to_lowercase()))
                })
                .cloned()
                .collect()
        }))
    }

    async fn create_task(&self, new: &NewTask) -> Result<Task> {
        let mut task = task(&new.title, status::TODO, &new.priority, Utc::now());
        task.description = new.description.clone();
        task.project_id = parse_id(&new.project_id);
        self.with_state(|s| s.tasks.push(task.clone()));
        Ok(task)
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.with_state(|s| s.tasks.iter().find(|t| t.id.to_string() == id).cloned())
            .ok_or_else(|| not_found("task"))
    }

    async fn update_task(&self, id: &str, updates: &Value) -> Result<Task> {
        self.with_state(|s| -> Result<Task> {
            let task = s
                .tasks
                .iter_mut()
                .find(|t| t.id.to_string() == id)
                .ok_or_else(|| not_found("task"))?;
            if let Some(progress) = updates.get("progress").and_then(Value::as_i64) {
                task.progress = Some(progress);
            }
            task.updated_at = Utc::now();
            Ok(task.clone())
        })
    }

    async fn start_task(&self, id: &str) -> Result<()> {
        self.set_status(id, status::IN_PROGRESS, true)
    }

    async fn complete_task(&self, id: &str) -> Result<()> {
        self.set_status(id, status::COMPLETED, false)
    }

    async fn stop_task(&self, id: &str) -> Result<()> {
        self.set_status(id, status::TODO, false)
    }

    async fn get_active_task(&self) -> Result<Option<Task>> {
        Ok(self.with_state(|s| {
            s.active_task
                .and_then(|id| s.tasks.iter().find(|t| t.id == id).cloned())
        }))
    }

    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation> {
        self.with_state(|s| -> Result<Annotation> {
            let task = s
                .tasks
                .iter_mut()
                .find(|t| t.id.to_string() == task_id)
                .ok_or_else(|| not_found("task"))?;
            let annotation = Annotation {
                id: Uuid::new_v4(),
                task_id: Some(task.id),
                content: content.to_string(),
                created_at: Utc::now(),
            };
            task.annotations.push(annotation.clone());
            Ok(annotation)
        })
    }

    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory> {
        let mut memory = memory(content);
        memory.project_id = parse_id(project_id);
        self.with_state(|s| {
            memory.linked_task_id = s.active_task;
            s.memories.push(memory.clone());
        });
        Ok(memory)
    }

    async fn list_memories(&self, query: &MemoryQuery) -> Result<Vec<Memory>> {
        Ok(self.with_state(|s| {
            s.memories
                .iter()
                .filter(|m| match &query.project_id {
                    Some(pid) => m.project_id.is_some_and(|id| id.to_string() == *pid),
                    None => true,
                })
                .cloned()
                .collect()
        }))
    }

    async fn get_memory(&self, id: &str) -> Result<Memory> {
        self.with_state(|s| s.memories.iter().find(|m| m.id.to_string() == id).cloned())
            .ok_or_else(|| not_found("memory"))
    }

    async fn get_focus(&self) -> Result<UserFocus> {
        Ok(self.with_state(|s| s.focus.clone()))
    }

    async fn set_focus(&self, pack_id: &str) -> Result<UserFocus> {
        let focus = UserFocus {
            active_context_pack_id: Some(pack_id.to_string()),
            active_pack: Some(FocusPack {
                id: pack_id.to_string(),
                name: "Release prep".to_string(),
                description: None,
                pack_type: "project".to_string(),
                status: "published".to_string(),
                contexts_count: 2,
                memories_count: 5,
                tasks_count: 3,
                contexts: vec![],
            }),
        };
        self.with_state(|s| s.focus = focus.clone());
        Ok(focus)
    }

    async fn clear_focus(&self) -> Result<()> {
        self.with_state(|s| s.focus = UserFocus::default());
        Ok(())
    }

    async fn create_decision(&self, new: &NewDecision) -> Result<Decision> {
        self.with_state(|s| -> Result<Decision> {
            let decision = Decision {
                id: Uuid::new_v4().to_string(),
                project_id: None,
                adr_number: format!("ADR-{:03}", s.decisions.len() + 1),
                title: new.title.clone(),
                description: new.description.clone().unwrap_or_default(),
                status: new.status.clone().unwrap_or_else(|| "draft".to_string()),
                area: new.area.clone().unwrap_or_default(),
                context: new.context.clone(),
                consequences: new.consequences.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            s.decisions.push(decision.clone());
            Ok(decision)
        })
    }

    async fn list_decisions(&self, query: &DecisionQuery) -> Result<Vec<Decision>> {
        Ok(self.with_state(|s| {
            let mut decisions: Vec<Decision> = s
                .decisions
                .iter()
                .filter(|d| query.status.as_deref().map_or(true, |st| d.status == st))
                .filter(|d| query.area.as_deref().map_or(true, |a| d.area == a))
                .cloned()
                .collect();
            if let Some(limit) = query.limit {
                decisions.truncate(limit);
            }
            decisions
        }))
    }

    async fn get_stats(&self, query: &StatsQuery) -> Result<Value> {
        Ok(self.with_state(|s| {
            json!({
                "project_id": query.project_id,
                "total_tasks": s.tasks.len(),
                "total_memories": s.memories.len(),
            })
        }))
    }
}

impl FakeBackend {
    fn set_status(&self, id: &str, new_status: &str, activate: bool) -> Result<()> {
        self.with_state(|s| -> Result<()> {
            let task = s
                .tasks
                .iter_mut()
                .find(|t| t.id.to_string() == id)
                .ok_or_else(|| not_found("task"))?;
            task.status = new_status.to_string();
            let task_id = task.id;
            if activate {
                s.active_task = Some(task_id);
            } else if s.active_task == Some(task_id) {
                s.active_task = None;
            }
            Ok(())
        })
    }
}

pub fn project(name: &str, is_active: bool) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        configuration: None,
        is_active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn task(title: &str, status: &str, priority: &str, created_at: DateTime<Utc>) -> Task {
    Task {
        id: Uuid::new_v4(),
        project_id: None,
        title: title.to_string(),
        description: String::new(),
        status: status.to_string(),
        priority: priority.to_string(),
        progress: None,
        tags: None,
        annotations: vec![],
        project: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn memory(content: &str) -> Memory {
    Memory {
        id: Uuid::new_v4(),
        project_id: None,
        content: content.to_string(),
        tags: None,
        project: None,
        linked_task_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Server wired to a [`FakeBackend`] and a throwaway config file
///
/// `handler` shares the backend and config with the server's own handler so
/// direct tool calls and protocol frames observe the same state.
pub struct TestServer {
    pub backend: Arc<FakeBackend>,
    pub config: ConfigStore,
    pub handler: ToolHandler,
    pub server: McpServer,
    _dir: TempDir,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_backend(FakeBackend::new())
    }

    pub fn with_backend(backend: FakeBackend) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = ConfigStore::at(dir.path().join(".ramorie").join("config.json"));
        let backend = Arc::new(backend);
        let server = McpServer::new(ToolHandler::new(backend.clone(), config.clone()));
        let handler = ToolHandler::new(backend.clone(), config.clone());

        Self {
            backend,
            config,
            handler,
            server,
            _dir: dir,
        }
    }

    /// Feed `lines` through the serve loop and parse every response frame
    pub async fn exchange(&self, lines: &[String]) -> Vec<Value> {
        let mut input = lines.join("\n");
        input.push('\n');

        let mut output = Vec::new();
        self.server
            .serve(input.as_bytes(), &mut output)
            .await
            .expect("serve loop failed");

        String::from_utf8(output)
            .expect("output is not UTF-8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("response frame is not JSON"))
            .collect()
    }

    /// Call one tool directly, bypassing the protocol layer
    pub async fn call(&self, tool: &str, arguments: Value) -> Result<Value> {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.handler.execute(tool, &arguments).await
    }
}

pub fn request(id: i64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

pub fn notification(method: &str) -> String {
    json!({"jsonrpc": "2.0", "method": method}).to_string()
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({"name": name, "arguments": arguments}))
}

/// `initialize` followed by `notifications/initialized`
pub fn handshake() -> Vec<String> {
    vec![
        request(0, "initialize", json!({"protocolVersion": "2025-11-25"})),
        notification("notifications/initialized"),
    ]
}
