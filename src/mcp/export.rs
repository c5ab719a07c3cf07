//! Markdown project report for `export_project`

use crate::error::Result;
use crate::types::{Project, Task};
use std::fmt::{self, Write};

/// Task counts by lifecycle bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn tally(tasks: &[Task]) -> Self {
        tasks.iter().fold(
            Self {
                total: tasks.len(),
                ..Self::default()
            },
            |mut acc, task| {
                if task.is_completed() {
                    acc.completed += 1;
                } else if task.is_in_progress() {
                    acc.in_progress += 1;
                } else {
                    acc.pending += 1;
                }
                acc
            },
        )
    }
}

fn marker(task: &Task) -> &'static str {
    if task.is_completed() {
        "[x]"
    } else if task.is_in_progress() {
        "[~]"
    } else {
        "[ ]"
    }
}

/// Render the report: heading, description, statistics, task list
pub fn render_markdown(project: &Project, tasks: &[Task]) -> Result<String> {
    let mut out = String::new();
    write_report(&mut out, project, tasks)?;
    Ok(out)
}

fn write_report(out: &mut String, project: &Project, tasks: &[Task]) -> fmt::Result {
    writeln!(out, "# {}\n", project.name)?;
    if !project.description.trim().is_empty() {
        writeln!(out, "{}\n", project.description.trim())?;
    }

    let stats = TaskStats::tally(tasks);
    writeln!(out, "## Statistics\n")?;
    writeln!(out, "- **Total:** {}", stats.total)?;
    writeln!(out, "- **Completed:** {}", stats.completed)?;
    writeln!(out, "- **In Progress:** {}", stats.in_progress)?;
    writeln!(out, "- **Pending:** {}\n", stats.pending)?;

    writeln!(out, "## Tasks\n")?;
    for task in tasks {
        let priority = if task.priority.is_empty() {
            "-"
        } else {
            task.priority.as_str()
        };
        writeln!(out, "- {} **{}** [{}]", marker(task), task.title, priority)?;
    }
    Ok(())
}
