//! One-shot recall from the command line
//!
//! Goes through the same tool dispatcher as the MCP `recall` tool so both
//! surfaces rank identically.

use super::helpers::{build_tool_handler, print_json};
use ramorie_core::error::Result;
use ramorie_core::mcp::ToolName;
use serde_json::{json, Map, Value};

pub struct RecallOptions {
    pub term: String,
    pub project: Option<String>,
    pub tag: Option<String>,
    pub linked_task: bool,
    pub limit: usize,
    pub min_score: i64,
}

impl RecallOptions {
    fn into_arguments(self) -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("term".to_string(), json!(self.term));
        if let Some(project) = self.project {
            args.insert("project".to_string(), json!(project));
        }
        if let Some(tag) = self.tag {
            args.insert("tag".to_string(), json!(tag));
        }
        args.insert("linked_task".to_string(), json!(self.linked_task));
        args.insert("limit".to_string(), json!(self.limit));
        args.insert("min_score".to_string(), json!(self.min_score));
        args
    }
}

/// Handle recall command
pub async fn handle(options: RecallOptions) -> Result<()> {
    let handler = build_tool_handler()?;
    let result = handler
        .execute(ToolName::Recall.as_str(), &options.into_arguments())
        .await?;
    print_json(&result)
}
