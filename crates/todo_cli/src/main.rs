use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use task_manager::{
    parse_due_date, Category, EditDraft, FileTaskStorage, Priority, SortCriterion, TaskId,
    TaskListManager, TaskManagerConfig, View,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage a local to-do list")]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/todo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the lists are stored in
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Name of the list to work on
    #[arg(long, global = true)]
    list: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title
        text: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, short, default_value = "work")]
        category: Category,
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },
    /// Attach a subtask to the task at a position
    Subtask { position: usize, text: String },
    /// Delete the task at a position
    Delete { position: usize },
    /// Mark the task at a position done, or not done
    Toggle { position: usize },
    /// Change fields of the task at a position
    Edit {
        position: usize,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, short)]
        category: Option<Category>,
        #[arg(long, short)]
        priority: Option<Priority>,
        /// Due date, YYYY-MM-DD. An empty value clears it.
        #[arg(long)]
        due: Option<String>,
    },
    /// Remove every completed task
    ClearCompleted,
    /// Copy the task at a position to the end of the list
    Duplicate { position: usize },
    /// Reorder the list: none, due-date or priority
    Sort { criterion: SortCriterion },
    /// Show tasks
    List {
        /// all, completed, pending, work, personal or urgent
        #[arg(long, short, default_value = "all")]
        view: View,
        /// Case-insensitive title search
        #[arg(long, short, default_value = "")]
        search: String,
    },
    /// Show completion progress
    Stats,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = TaskManagerConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(list) = cli.list {
        config.list_key = list;
    }
    tracing::debug!(data_dir = %config.data_dir.display(), list = %config.list_key, "using task list");

    let storage = FileTaskStorage::new(&config.data_dir);
    let manager = TaskListManager::with_config(storage, &config)
        .await
        .context("Failed to open task list")?;

    run(&manager, cli.command).await
}

async fn run(manager: &TaskListManager<FileTaskStorage>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            text,
            due,
            category,
            priority,
        } => {
            let due_date = parse_due_date(&due)?;
            match manager.create(text, category, priority, due_date).await {
                Some(id) => {
                    let position = manager.position_of(id).await.unwrap_or_default() + 1;
                    println!("{}", format!("Added task {}", position).green());
                }
                None => println!("{}", "Nothing added: a title and a due date are required".yellow()),
            }
        }
        Commands::Subtask { position, text } => {
            let id = resolve(manager, position).await?;
            if manager.add_subtask(id, &text).await? {
                println!("{}", format!("Added subtask to task {}", position).green());
            } else {
                println!("{}", "Nothing added: subtask text is blank".yellow());
            }
        }
        Commands::Delete { position } => {
            let id = resolve(manager, position).await?;
            let removed = manager.delete(id).await?;
            println!("{}", format!("Deleted \"{}\"", removed.text).green());
        }
        Commands::Toggle { position } => {
            let id = resolve(manager, position).await?;
            let state = if manager.toggle_complete(id).await? {
                "done"
            } else {
                "pending"
            };
            println!("{}", format!("Task {} is {}", position, state).green());
        }
        Commands::Edit {
            position,
            text,
            category,
            priority,
            due,
        } => {
            let id = resolve(manager, position).await?;
            let mut draft = manager.begin_edit(id).await?;
            if let Some(text) = text {
                draft.text = text;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            if let Some(due) = due {
                set_due_date(&mut draft, &due)?;
            }
            manager.update_draft(draft).await?;
            manager.commit_edit().await?;
            println!("{}", format!("Updated task {}", position).green());
        }
        Commands::ClearCompleted => {
            let removed = manager.clear_completed().await;
            println!("{}", format!("Removed {} completed task(s)", removed).green());
        }
        Commands::Duplicate { position } => {
            let id = resolve(manager, position).await?;
            let copy = manager.duplicate(id).await?;
            let new_position = manager.position_of(copy).await.unwrap_or_default() + 1;
            println!("{}", format!("Copied task {} to {}", position, new_position).green());
        }
        Commands::Sort { criterion } => {
            manager.sort_by(criterion).await;
            let tasks = manager.tasks().await;
            print!("{}", render::task_list(&tasks, &tasks));
        }
        Commands::List { view, search } => {
            manager.set_view(view).await;
            manager.set_search_query(search).await;
            let visible = manager.visible().await;
            if visible.is_empty() {
                println!("{}", "No tasks".dimmed());
            } else {
                print!("{}", render::task_list(&visible, &manager.tasks().await));
            }
            println!("{}", render::progress(&manager.completion_stats().await));
        }
        Commands::Stats => {
            println!("{}", render::progress(&manager.completion_stats().await));
        }
    }

    Ok(())
}

/// Replace the draft's due date. Blank input clears it.
fn set_due_date(draft: &mut EditDraft, due: &str) -> anyhow::Result<()> {
    draft.due_date = parse_due_date(due)?;
    Ok(())
}

/// Translate a 1-based position as printed by `list` into a task id.
async fn resolve(manager: &TaskListManager<FileTaskStorage>, position: usize) -> anyhow::Result<TaskId> {
    let index = position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("positions start at 1"))?;
    Ok(manager.id_at(index).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> EditDraft {
        EditDraft {
            text: "Report".to_string(),
            category: Category::Work,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 5),
        }
    }

    #[test]
    fn test_edit_accepts_empty_due() {
        let cli = Cli::try_parse_from(["todo", "edit", "1", "--due", ""]).unwrap();
        match cli.command {
            Commands::Edit { due, .. } => assert_eq!(due.as_deref(), Some("")),
            _ => panic!("expected the edit command"),
        }
    }

    #[test]
    fn test_set_due_date() {
        let mut d = draft();
        set_due_date(&mut d, "2024-02-01").unwrap();
        assert_eq!(d.due_date, NaiveDate::from_ymd_opt(2024, 2, 1));

        set_due_date(&mut d, "").unwrap();
        assert_eq!(d.due_date, None);

        let mut d = draft();
        assert!(set_due_date(&mut d, "tomorrow").is_err());
        assert_eq!(d.due_date, NaiveDate::from_ymd_opt(2024, 1, 5));
    }
}
