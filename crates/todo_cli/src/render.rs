//! Terminal rendering of tasks and progress

use colored::Colorize;
use std::fmt::Write;
use task_manager::{CompletionStats, Priority, Task};

const BAR_WIDTH: usize = 20;

/// One block per visible task, numbered by its position in `all`.
pub fn task_list(visible: &[Task], all: &[Task]) -> String {
    let mut out = String::new();
    for task in visible {
        let position = all
            .iter()
            .position(|t| t.id == task.id)
            .map(|p| p + 1)
            .unwrap_or_default();
        let check = if task.completed { "[x]" } else { "[ ]" };
        let title = if task.completed {
            task.text.dimmed().strikethrough()
        } else {
            task.text.bold()
        };
        let priority = match task.priority {
            Priority::High => task.priority.to_string().red(),
            Priority::Medium => task.priority.to_string().yellow(),
            Priority::Low => task.priority.to_string().normal(),
        };

        let _ = writeln!(out, "{:>3}. {} {}", position, check, title);
        let due = task
            .due_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "none".to_string());
        let _ = writeln!(out, "       {} • {} • Due: {}", task.category, priority, due);
        for subtask in &task.subtasks {
            let _ = writeln!(out, "         - {}", subtask);
        }
    }
    out
}

pub fn progress(stats: &CompletionStats) -> String {
    let filled = ((stats.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {}/{} completed ({:.0}%)",
        "#".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled).dimmed(),
        stats.completed,
        stats.total,
        stats.percentage
    )
}
