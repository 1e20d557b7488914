//! Output formatting for the board, as markdown or JSON.

use crate::client::BoardColumn;
use crate::types::Task;
use serde_json::{Value, json};

/// Output format for board listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Format a single task as a markdown list item.
pub fn format_task_markdown(task: &Task) -> String {
    format!("- `#{}` {}\n", task.id, task.description)
}

/// Format the board as markdown, one section per column.
pub fn format_board_markdown(columns: &[BoardColumn]) -> String {
    let mut md = String::new();

    for column in columns {
        md.push_str(&format!("## {} ({})\n", column.title, column.tasks.len()));
        if column.tasks.is_empty() {
            md.push_str("_empty_\n");
        }
        for task in &column.tasks {
            md.push_str(&format_task_markdown(task));
        }
        md.push('\n');
    }

    md
}

/// Format the board as JSON: `[{id, title, tasks}]`, the reorder payload shape.
pub fn format_board_json(columns: &[BoardColumn]) -> Value {
    Value::Array(
        columns
            .iter()
            .map(|c| {
                json!({
                    "id": c.status,
                    "title": c.title,
                    "tasks": c.tasks,
                })
            })
            .collect(),
    )
}

/// Render the board in the requested format.
pub fn format_board(columns: &[BoardColumn], format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => format_board_markdown(columns),
        OutputFormat::Json => serde_json::to_string_pretty(&format_board_json(columns))
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
    }
}
