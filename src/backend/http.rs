//! reqwest-backed implementation of [`Backend`]

use super::{
    Backend, DecisionQuery, MemoryQuery, Method, NewDecision, NewTask, StatsQuery, TaskQuery,
};
use crate::config::{ClientSettings, ConfigStore};
use crate::error::{RamorieError, Result};
use crate::types::{Annotation, Decision, Memory, Project, Task, UserFocus};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Client for the Ramorie REST API
pub struct HttpBackend {
    base_url: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

/// Task lists come back bare or wrapped depending on the endpoint revision
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskList {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MemoryList {
    Wrapped { memories: Vec<Memory> },
    Bare(Vec<Memory>),
}

#[derive(Deserialize)]
struct DecisionList {
    #[serde(default)]
    decisions: Vec<Decision>,
}

#[derive(Deserialize)]
struct ActiveTaskResponse {
    active_task: Option<Task>,
}

#[derive(Deserialize)]
struct SetFocusResponse {
    focus: UserFocus,
}

impl HttpBackend {
    /// Create a client with explicit settings
    pub fn new(settings: &ClientSettings, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(SecretString::from),
            client,
        })
    }

    /// Create a client from environment settings and the stored API key
    pub fn from_config(store: &ConfigStore) -> Result<Self> {
        let settings = ClientSettings::load()?;
        let api_key = store.load()?.api_key;
        if api_key.is_none() {
            debug!("No API key configured; requests will be unauthenticated");
        }
        Self::new(&settings, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Assemble a request; unset or blank query values are left out
    fn build(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, Option<&str>)],
        body: Option<&Value>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{:?} {}", method, url);

        let mut req = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        let pairs = query_pairs(query);
        if !pairs.is_empty() {
            req = req.query(&pairs);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key.expose_secret());
        }
        req
    }

    /// Issue a request and return the raw body, mapping error statuses to [`RamorieError::Api`]
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, Option<&str>)],
        body: Option<&Value>,
    ) -> Result<String> {
        let resp = self.build(method, endpoint, query, body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.as_u16() >= 400 {
            return Err(RamorieError::Api(format!(
                "API request failed with status {}: {}",
                status.as_u16(),
                text
            )));
        }

        Ok(text)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, Option<&str>)],
        body: Option<&Value>,
    ) -> Result<T> {
        let text = self.send(method, endpoint, query, body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn query_pairs<'a>(params: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, &'a str)> {
    params
        .iter()
        .filter_map(|(k, v)| v.map(str::trim).filter(|v| !v.is_empty()).map(|v| (*k, v)))
        .collect()
}

fn is_empty_body(text: &str) -> bool {
    matches!(text.trim(), "" | "{}" | "null")
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.fetch(Method::Get, "/projects", &[], None).await
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let body = json!({"name": name, "description": description});
        self.fetch(Method::Post, "/projects", &[], Some(&body)).await
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.fetch(Method::Get, &format!("/projects/{}", id), &[], None).await
    }

    async fn set_project_active(&self, id: &str) -> Result<()> {
        self.send(Method::Post, &format!("/projects/{}/use", id), &[], None)
            .await
            .map(|_| ())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let params = [
            ("project_id", query.project_id.as_deref()),
            ("status", query.status.as_deref()),
            ("q", query.q.as_deref()),
        ];
        let list: TaskList = self.fetch(Method::Get, "/tasks", &params, None).await?;
        Ok(match list {
            TaskList::Wrapped { tasks } => tasks,
            TaskList::Bare(tasks) => tasks,
        })
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let body = json!({
            "project_id": task.project_id,
            "title": task.title,
            "description": task.description,
            "priority": task.priority,
        });
        self.fetch(Method::Post, "/tasks", &[], Some(&body)).await
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.fetch(Method::Get, &format!("/tasks/{}", id), &[], None).await
    }

    async fn update_task(&self, id: &str, updates: &Value) -> Result<Task> {
        self.fetch(Method::Put, &format!("/tasks/{}", id), &[], Some(updates))
            .await
    }

    async fn start_task(&self, id: &str) -> Result<()> {
        self.send(Method::Post, &format!("/tasks/{}/start", id), &[], None)
            .await
            .map(|_| ())
    }

    async fn complete_task(&self, id: &str) -> Result<()> {
        self.send(Method::Post, &format!("/tasks/{}/done", id), &[], None)
            .await
            .map(|_| ())
    }

    async fn stop_task(&self, id: &str) -> Result<()> {
        self.send(Method::Post, &format!("/tasks/{}/stop", id), &[], None)
            .await
            .map(|_| ())
    }

    async fn get_active_task(&self) -> Result<Option<Task>> {
        let text = self.send(Method::Get, "/tasks/active", &[], None).await?;
        if is_empty_body(&text) {
            return Ok(None);
        }
        let resp: ActiveTaskResponse = serde_json::from_str(&text)?;
        Ok(resp.active_task)
    }

    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation> {
        let body = json!({"content": content});
        self.fetch(
            Method::Post,
            &format!("/tasks/{}/annotations", task_id),
            &[],
            Some(&body),
        )
        .await
    }

    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory> {
        let body = json!({"project_id": project_id, "content": content});
        self.fetch(Method::Post, "/memories", &[], Some(&body)).await
    }

    async fn list_memories(&self, query: &MemoryQuery) -> Result<Vec<Memory>> {
        let params = [("project_id", query.project_id.as_deref())];
        let list: MemoryList = self.fetch(Method::Get, "/memories", &params, None).await?;
        Ok(match list {
            MemoryList::Wrapped { memories } => memories,
            MemoryList::Bare(memories) => memories,
        })
    }

    async fn get_memory(&self, id: &str) -> Result<Memory> {
        self.fetch(Method::Get, &format!("/memories/{}", id), &[], None)
            .await
    }

    async fn get_focus(&self) -> Result<UserFocus> {
        self.fetch(Method::Get, "/me/focus", &[], None).await
    }

    async fn set_focus(&self, pack_id: &str) -> Result<UserFocus> {
        let body = json!({"context_pack_id": pack_id});
        let resp: SetFocusResponse = self.fetch(Method::Post, "/me/focus", &[], Some(&body)).await?;
        Ok(resp.focus)
    }

    async fn clear_focus(&self) -> Result<()> {
        self.send(Method::Delete, "/me/focus", &[], None).await.map(|_| ())
    }

    async fn create_decision(&self, decision: &NewDecision) -> Result<Decision> {
        let mut body = serde_json::Map::new();
        body.insert("title".to_string(), json!(decision.title));
        for (key, value) in [
            ("description", &decision.description),
            ("status", &decision.status),
            ("area", &decision.area),
            ("context", &decision.context),
            ("consequences", &decision.consequences),
        ] {
            if let Some(v) = value {
                body.insert(key.to_string(), json!(v));
            }
        }
        self.fetch(Method::Post, "/decisions", &[], Some(&Value::Object(body)))
            .await
    }

    async fn list_decisions(&self, query: &DecisionQuery) -> Result<Vec<Decision>> {
        let limit = query.limit.filter(|l| *l > 0).map(|l| l.to_string());
        let params = [
            ("status", query.status.as_deref()),
            ("area", query.area.as_deref()),
            ("limit", limit.as_deref()),
        ];
        let list: DecisionList = self.fetch(Method::Get, "/decisions", &params, None).await?;
        Ok(list.decisions)
    }

    async fn get_stats(&self, query: &StatsQuery) -> Result<Value> {
        let params = [("project_id", query.project_id.as_deref())];
        let text = self.send(Method::Get, "/reports/stats", &params, None).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        let settings = ClientSettings {
            api_base_url: "http://localhost:8080/v1".to_string(),
            timeout_secs: 5,
        };
        HttpBackend::new(&settings, None).unwrap()
    }

    fn url(
        backend: &HttpBackend,
        endpoint: &str,
        query: &[(&str, Option<&str>)],
    ) -> String {
        backend
            .build(Method::Get, endpoint, query, None)
            .build()
            .unwrap()
            .url()
            .to_string()
    }

    #[test]
    fn test_query_skips_unset_and_blank_values() {
        let b = backend();
        assert_eq!(
            url(&b, "/tasks", &[("status", None)]),
            "http://localhost:8080/v1/tasks"
        );
        assert_eq!(
            url(&b, "/tasks", &[("project_id", Some("abc")), ("status", Some(" "))]),
            "http://localhost:8080/v1/tasks?project_id=abc"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let b = backend();
        assert_eq!(
            url(&b, "/tasks", &[("q", Some("fix bug&deploy"))]),
            "http://localhost:8080/v1/tasks?q=fix+bug%26deploy"
        );
    }

    #[test]
    fn test_bearer_header_only_with_key() {
        let settings = ClientSettings {
            api_base_url: "http://localhost:8080/v1".to_string(),
            timeout_secs: 5,
        };
        let keyed = HttpBackend::new(&settings, Some("sk-test".to_string())).unwrap();
        let req = keyed
            .build(Method::Get, "/projects", &[], None)
            .build()
            .unwrap();
        assert_eq!(
            req.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer sk-test"
        );

        let anonymous = backend()
            .build(Method::Get, "/projects", &[], None)
            .build()
            .unwrap();
        assert!(anonymous.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_task_list_shapes() {
        let wrapped: TaskList = serde_json::from_str(r#"{"tasks": [], "total": 0}"#).unwrap();
        assert!(matches!(wrapped, TaskList::Wrapped { .. }));

        let bare: TaskList = serde_json::from_str("[]").unwrap();
        assert!(matches!(bare, TaskList::Bare(_)));
    }

    #[test]
    fn test_memory_list_shapes() {
        let wrapped: MemoryList =
            serde_json::from_str(r#"{"memories": [], "total": 0, "limit": 20, "offset": 0}"#)
                .unwrap();
        assert!(matches!(wrapped, MemoryList::Wrapped { .. }));
    }

    #[test]
    fn test_empty_body_detection() {
        assert!(is_empty_body(""));
        assert!(is_empty_body(" null "));
        assert!(is_empty_body("{}"));
        assert!(!is_empty_body(r#"{"active_task": null}"#));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = ClientSettings {
            api_base_url: "http://localhost:8080/v1/".to_string(),
            timeout_secs: 5,
        };
        let backend = HttpBackend::new(&settings, None).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080/v1");
    }
}
