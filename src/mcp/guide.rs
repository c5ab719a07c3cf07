//! Static self-description served to agents
//!
//! Tool groupings are derived from [`ToolName::tier`] so the guide can never
//! advertise a tool the catalog lacks.

use super::catalog::{Tier, ToolName};
use crate::error::Result;
use serde_json::{json, Map, Value};
use std::fmt::{self, Write};

const TIERS: [Tier; 3] = [Tier::Essential, Tier::Common, Tier::Advanced];

const QUICKSTART: &[&str] = &[
    "1. setup_agent -> get current context and recommendations",
    "2. get_focus -> check your current active workspace",
    "3. list_projects -> see available projects",
    "4. set_active_project -> set your working project",
    "5. get_next_tasks -> see prioritized open tasks",
    "6. start_task -> begin working (enables memory auto-link)",
    "7. add_memory -> store important discoveries",
    "8. complete_task -> mark work as done",
];

const CORE_RULES: &[&str] = &[
    "Always check list_tasks before creating new tasks",
    "Use add_memory to persist important information",
    "Start a task before adding memories so they auto-link",
    "Use get_focus to check the current workspace context",
    "Record architectural decisions with create_decision",
    "Never delete anything without explicit user approval",
    "Never create duplicate projects",
];

fn tools_in(tier: Tier) -> Vec<&'static str> {
    ToolName::ALL
        .iter()
        .filter(|t| t.tier() == tier)
        .map(|t| t.as_str())
        .collect()
}

fn tier_hint(tier: Tier) -> &'static str {
    match tier {
        Tier::Essential => "Core functionality - use these regularly",
        Tier::Common => "Frequently used - call when needed",
        Tier::Advanced => "Specialized - only for specific scenarios",
    }
}

/// Payload of `get_ramorie_info`
pub fn ramorie_info() -> Value {
    let mut by_tier = Map::new();
    let mut guide = Map::new();
    for tier in TIERS {
        by_tier.insert(tier.label().to_string(), json!(tools_in(tier)));
        guide.insert(tier.label().to_string(), json!(tier_hint(tier)));
    }

    json!({
        "name": "Ramorie",
        "version": env!("CARGO_PKG_VERSION"),
        "tagline": "AI Agent Memory & Task Management System",
        "description": "Ramorie is a persistent memory and task management system for AI agents. \
                        It preserves context across sessions, tracks tasks and stores knowledge.",
        "tool_count": ToolName::ALL.len(),
        "tool_priority_guide": guide,
        "quickstart": QUICKSTART,
        "core_rules": CORE_RULES,
        "tools_by_tier": by_tier,
    })
}

/// Markdown suitable for a `.cursorrules` file
pub fn cursor_rules_markdown() -> Result<String> {
    let mut out = String::new();
    write_cursor_rules(&mut out)?;
    Ok(out)
}

fn write_cursor_rules(out: &mut String) -> fmt::Result {
    writeln!(out, "# Ramorie MCP Usage Rules\n")?;
    writeln!(out, "## Core Principle")?;
    writeln!(out, "**\"If it matters later, it belongs in Ramorie.\"**\n")?;

    writeln!(out, "## Session Workflow\n\n### Start of Session")?;
    writeln!(out, "1. `setup_agent` - Get current context")?;
    writeln!(out, "2. `get_focus` - Check active workspace")?;
    writeln!(out, "3. `list_projects` - Check available projects")?;
    writeln!(out, "4. `get_next_tasks` - See what needs attention\n")?;

    writeln!(out, "### During Work")?;
    writeln!(out, "1. `start_task` - Begin working (enables memory auto-link)")?;
    writeln!(out, "2. `add_memory` - Store important discoveries")?;
    writeln!(out, "3. `add_task_note` - Add progress notes")?;
    writeln!(out, "4. `complete_task` - Mark as done\n")?;

    writeln!(out, "### Key Rules")?;
    for rule in CORE_RULES {
        writeln!(out, "- {}", rule)?;
    }

    write!(out, "\n## Available Tools ({} total)\n", ToolName::ALL.len())?;
    for tier in TIERS {
        let tools = tools_in(tier);
        write!(
            out,
            "\n### {} ({})\n- {}\n",
            tier.label(),
            tools.len(),
            tools.join(", ")
        )?;
    }
    Ok(())
}

/// Payload of `get_cursor_rules`
pub fn cursor_rules(format: &str) -> Result<Value> {
    Ok(json!({
        "format": format,
        "rules": cursor_rules_markdown()?,
        "usage": "Add this to your .cursorrules file",
    }))
}
