//! Typed tool arguments
//!
//! Agents send loosely typed argument bags: numbers arrive as floats or
//! strings, strings carry stray whitespace, optional flags are omitted.
//! [`ArgBag`] applies those coercions once and each tool's record is built
//! from it through [`FromArgs`] before the handler runs.

use crate::error::{RamorieError, Result};
use serde_json::{Map, Value};

/// Read-only view over a `tools/call` argument object
#[derive(Debug, Clone, Copy)]
pub struct ArgBag<'a> {
    args: &'a Map<String, Value>,
}

impl<'a> ArgBag<'a> {
    pub fn new(args: &'a Map<String, Value>) -> Self {
        Self { args }
    }

    /// Trimmed string; blank counts as absent
    pub fn str(&self, name: &str) -> Option<String> {
        let raw = match self.args.get(name)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!raw.is_empty()).then_some(raw)
    }

    pub fn require_str(&self, name: &str) -> Result<String> {
        self.str(name)
            .ok_or_else(|| RamorieError::missing_argument(name))
    }

    /// Integer, truncating floats and parsing numeric strings
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.args.get(name)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
            }
            _ => None,
        }
    }

    pub fn require_int(&self, name: &str) -> Result<i64> {
        self.int(name)
            .ok_or_else(|| RamorieError::missing_argument(name))
    }

    /// Positive count, or `None` when absent or not positive
    pub fn positive(&self, name: &str) -> Option<usize> {
        self.int(name)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn opt_flag(&self, name: &str) -> Option<bool> {
        match self.args.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            _ => None,
        }
    }

    /// Boolean defaulting to `false`
    pub fn flag(&self, name: &str) -> bool {
        self.opt_flag(name).unwrap_or(false)
    }
}

/// Build a typed argument record, failing with a descriptive message
pub trait FromArgs: Sized {
    fn from_args(args: &ArgBag<'_>) -> Result<Self>;
}

/// Parse an argument object into `T`
pub fn parse<T: FromArgs>(args: &Map<String, Value>) -> Result<T> {
    T::from_args(&ArgBag::new(args))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskIdArgs {
    pub task_id: String,
}

impl FromArgs for TaskIdArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            task_id: args.require_str("taskId")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetActiveProjectArgs {
    pub project_name: String,
}

impl FromArgs for SetActiveProjectArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            project_name: args.require_str("projectName")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListTasksArgs {
    pub status: Option<String>,
    pub project: Option<String>,
    pub limit: Option<usize>,
}

impl FromArgs for ListTasksArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            status: args.str("status"),
            project: args.str("project"),
            limit: args.positive("limit"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskArgs {
    pub description: String,
    pub priority: Option<String>,
    pub project: Option<String>,
}

impl FromArgs for CreateTaskArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            description: args.require_str("description")?,
            priority: args.str("priority"),
            project: args.str("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextTasksArgs {
    pub count: usize,
    pub project: Option<String>,
}

impl NextTasksArgs {
    pub const DEFAULT_COUNT: usize = 5;
}

impl FromArgs for NextTasksArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            count: args.positive("count").unwrap_or(Self::DEFAULT_COUNT),
            project: args.str("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddMemoryArgs {
    pub content: String,
    pub project: Option<String>,
}

impl FromArgs for AddMemoryArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            content: args.require_str("content")?,
            project: args.str("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListMemoriesArgs {
    pub project: Option<String>,
    pub term: Option<String>,
    pub limit: Option<usize>,
}

impl FromArgs for ListMemoriesArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            project: args.str("project"),
            term: args.str("term"),
            limit: args.positive("limit"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetFocusArgs {
    pub pack_id: String,
}

impl FromArgs for SetFocusArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            pack_id: args.require_str("packId")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddTaskNoteArgs {
    pub task_id: String,
    pub note: String,
}

impl FromArgs for AddTaskNoteArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            task_id: args.require_str("taskId")?,
            note: args.require_str("note")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProgressArgs {
    pub task_id: String,
    pub progress: u8,
}

impl FromArgs for UpdateProgressArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        let task_id = args.require_str("taskId")?;
        let progress = args.require_int("progress")?;
        if !(0..=100).contains(&progress) {
            return Err(RamorieError::Validation(
                "progress must be between 0 and 100".to_string(),
            ));
        }
        Ok(Self {
            task_id,
            progress: progress as u8,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTasksArgs {
    pub query: String,
    pub status: Option<String>,
    pub project: Option<String>,
    pub limit: Option<usize>,
}

impl FromArgs for SearchTasksArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            query: args.require_str("query")?,
            status: args.str("status"),
            project: args.str("project"),
            limit: args.positive("limit"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryIdArgs {
    pub memory_id: String,
}

impl FromArgs for MemoryIdArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            memory_id: args.require_str("memoryId")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecallArgs {
    pub term: String,
    pub project: Option<String>,
    pub tag: Option<String>,
    pub linked_task: bool,
    pub include_relations: bool,
    pub limit: usize,
    pub min_score: i64,
}

impl RecallArgs {
    pub const DEFAULT_LIMIT: usize = 20;
}

impl FromArgs for RecallArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            term: args.require_str("term")?,
            project: args.str("project"),
            tag: args.str("tag"),
            linked_task: args.flag("linked_task"),
            include_relations: args.opt_flag("include_relations").unwrap_or(true),
            limit: args.positive("limit").unwrap_or(Self::DEFAULT_LIMIT),
            min_score: args.int("min_score").unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDecisionArgs {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub area: Option<String>,
    pub context: Option<String>,
    pub consequences: Option<String>,
}

impl FromArgs for CreateDecisionArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            title: args.require_str("title")?,
            description: args.str("description"),
            status: args.str("status"),
            area: args.str("area"),
            context: args.str("context"),
            consequences: args.str("consequences"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListDecisionsArgs {
    pub status: Option<String>,
    pub area: Option<String>,
    pub limit: Option<usize>,
}

impl FromArgs for ListDecisionsArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            status: args.str("status"),
            area: args.str("area"),
            limit: args.positive("limit"),
        })
    }
}

/// Arguments for tools whose only input is an optional project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectArgs {
    pub project: Option<String>,
}

impl FromArgs for ProjectArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            project: args.str("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProjectArgs {
    pub name: String,
    pub description: String,
}

impl FromArgs for CreateProjectArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            name: args.require_str("name")?,
            description: args.str("description").unwrap_or_default(),
        })
    }
}

pub const DEFAULT_FORMAT: &str = "markdown";

#[derive(Debug, Clone, PartialEq)]
pub struct FormatArgs {
    pub format: String,
}

impl FromArgs for FormatArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            format: args.str("format").unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportProjectArgs {
    pub project: String,
    pub format: String,
}

impl FromArgs for ExportProjectArgs {
    fn from_args(args: &ArgBag<'_>) -> Result<Self> {
        Ok(Self {
            project: args.require_str("project")?,
            format: args.str("format").unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        })
    }
}
