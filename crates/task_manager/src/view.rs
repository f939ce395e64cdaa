//! Derived views: filtering, sorting and completion statistics

use crate::error::TaskError;
use crate::structs::{Category, Task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named filter predicate over the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    All,
    Completed,
    Pending,
    Work,
    Personal,
    Urgent,
}

impl View {
    /// The category this view selects, if it is a category view.
    pub fn category(&self) -> Option<Category> {
        match self {
            View::Work => Some(Category::Work),
            View::Personal => Some(Category::Personal),
            View::Urgent => Some(Category::Urgent),
            View::All | View::Completed | View::Pending => None,
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(category) => write!(f, "{}", category),
            None => f.write_str(match self {
                View::Completed => "Completed",
                View::Pending => "Pending",
                _ => "All",
            }),
        }
    }
}

impl FromStr for View {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(View::All),
            "completed" => Ok(View::Completed),
            "pending" => Ok(View::Pending),
            "work" => Ok(View::Work),
            "personal" => Ok(View::Personal),
            "urgent" => Ok(View::Urgent),
            other => Err(TaskError::InvalidValue(format!("unknown view '{}'", other))),
        }
    }
}

/// Sort key selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortCriterion {
    None,
    DueDate,
    Priority,
}

impl Default for SortCriterion {
    fn default() -> Self {
        Self::None
    }
}

impl FromStr for SortCriterion {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "none" => Ok(SortCriterion::None),
            "duedate" => Ok(SortCriterion::DueDate),
            "priority" => Ok(SortCriterion::Priority),
            _ => Err(TaskError::InvalidValue(format!("unknown sort criterion '{}'", s))),
        }
    }
}

/// Which views the search query narrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Search applies only under Work/Personal/Urgent; All, Completed and
    /// Pending ignore it.
    CategoryViews,
    /// Search applies under every view.
    AllViews,
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::CategoryViews
    }
}

/// Presentation-side selections: active view, search text and last sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub view: View,
    pub search_query: String,
    pub sort: SortCriterion,
}

/// Tasks visible under `view`, in collection order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    view: View,
    query: &str,
    scope: SearchScope,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| {
            let in_view = match view {
                View::All => true,
                View::Completed => task.completed,
                View::Pending => !task.completed,
                _ => view.category() == Some(task.category),
            };
            let searched = match scope {
                SearchScope::CategoryViews => view.category().is_some(),
                SearchScope::AllViews => true,
            };
            in_view && (!searched || task.matches(query))
        })
        .collect()
}

/// Reorder `tasks` in place. `slice::sort_by_key` is stable, so ties keep
/// their previous relative order. Tasks without a due date sort last.
pub fn sort_tasks(tasks: &mut [Task], criterion: SortCriterion) {
    match criterion {
        SortCriterion::None => {}
        SortCriterion::DueDate => {
            tasks.sort_by_key(|task| (task.due_date.is_none(), task.due_date))
        }
        SortCriterion::Priority => tasks.sort_by_key(|task| task.priority),
    }
}

/// Completion summary of a task list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    /// 0 when the list is empty
    pub percentage: f64,
}

pub fn completion_stats(tasks: &[Task]) -> CompletionStats {
    let completed = tasks.iter().filter(|task| task.completed).count();
    let total = tasks.len();
    let percentage = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };
    CompletionStats {
        completed,
        total,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Priority;
    use chrono::NaiveDate;

    fn task(text: &str, category: Category, priority: Priority, due: (i32, u32, u32)) -> Task {
        let due = NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap();
        Task::new(text.to_string(), category, priority, due)
    }

    fn texts(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_sort_by_due_date_is_stable() {
        let mut tasks = vec![
            task("c", Category::Work, Priority::Low, (2024, 3, 1)),
            task("a", Category::Work, Priority::Low, (2024, 1, 1)),
            task("d", Category::Work, Priority::Low, (2024, 3, 1)),
            task("b", Category::Work, Priority::Low, (2024, 1, 1)),
        ];
        sort_tasks(&mut tasks, SortCriterion::DueDate);
        let order: Vec<_> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        assert!(tasks.windows(2).all(|w| w[0].due_date <= w[1].due_date));
    }

    #[test]
    fn test_sort_by_due_date_puts_undated_last() {
        let mut tasks = vec![
            task("undated1", Category::Work, Priority::Low, (2024, 1, 1)),
            task("late", Category::Work, Priority::Low, (2024, 6, 1)),
            task("undated2", Category::Work, Priority::Low, (2024, 1, 1)),
            task("early", Category::Work, Priority::Low, (2024, 2, 1)),
        ];
        tasks[0].due_date = None;
        tasks[2].due_date = None;

        sort_tasks(&mut tasks, SortCriterion::DueDate);
        let order: Vec<_> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["early", "late", "undated1", "undated2"]);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut tasks = vec![
            task("low1", Category::Work, Priority::Low, (2024, 1, 1)),
            task("high1", Category::Work, Priority::High, (2024, 1, 1)),
            task("med", Category::Work, Priority::Medium, (2024, 1, 1)),
            task("high2", Category::Work, Priority::High, (2024, 1, 1)),
            task("low2", Category::Work, Priority::Low, (2024, 1, 1)),
        ];
        sort_tasks(&mut tasks, SortCriterion::Priority);
        let order: Vec<_> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["high1", "high2", "med", "low1", "low2"]);
    }

    #[test]
    fn test_sort_none_keeps_order() {
        let mut tasks = vec![
            task("b", Category::Work, Priority::Low, (2024, 5, 1)),
            task("a", Category::Work, Priority::High, (2024, 1, 1)),
        ];
        sort_tasks(&mut tasks, SortCriterion::None);
        assert_eq!(tasks[0].text, "b");
    }

    #[test]
    fn test_completed_view_ignores_search() {
        let mut tasks = vec![
            task("A", Category::Work, Priority::High, (2024, 1, 5)),
            task("B", Category::Work, Priority::Low, (2024, 1, 1)),
        ];
        tasks[1].completed = true;

        for query in ["", "zzz", "a"] {
            let shown = filter_tasks(&tasks, View::Completed, query, SearchScope::CategoryViews);
            assert_eq!(texts(&shown), vec!["B".to_string()]);
        }
        let pending = filter_tasks(&tasks, View::Pending, "zzz", SearchScope::CategoryViews);
        assert_eq!(texts(&pending), vec!["A".to_string()]);
        let all = filter_tasks(&tasks, View::All, "zzz", SearchScope::CategoryViews);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_category_view_applies_search() {
        let tasks = vec![
            task("Quarterly Report", Category::Work, Priority::High, (2024, 1, 5)),
            task("Standup", Category::Work, Priority::Low, (2024, 1, 1)),
            task("Report taxes", Category::Personal, Priority::Low, (2024, 1, 1)),
        ];
        let shown = filter_tasks(&tasks, View::Work, "report", SearchScope::CategoryViews);
        assert_eq!(texts(&shown), vec!["Quarterly Report".to_string()]);

        let shown = filter_tasks(&tasks, View::Work, "", SearchScope::CategoryViews);
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn test_all_views_scope_searches_everywhere() {
        let tasks = vec![
            task("Quarterly Report", Category::Work, Priority::High, (2024, 1, 5)),
            task("Standup", Category::Work, Priority::Low, (2024, 1, 1)),
        ];
        let shown = filter_tasks(&tasks, View::All, "stand", SearchScope::AllViews);
        assert_eq!(texts(&shown), vec!["Standup".to_string()]);
    }

    #[test]
    fn test_completion_stats() {
        let empty = completion_stats(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.percentage, 0.0);
        assert!(!empty.percentage.is_nan());

        let mut tasks = vec![
            task("a", Category::Work, Priority::High, (2024, 1, 5)),
            task("b", Category::Work, Priority::High, (2024, 1, 5)),
            task("c", Category::Work, Priority::High, (2024, 1, 5)),
            task("d", Category::Work, Priority::High, (2024, 1, 5)),
        ];
        tasks[0].completed = true;
        let stats = completion_stats(&tasks);
        assert_eq!((stats.completed, stats.total), (1, 4));
        assert_eq!(stats.percentage, 25.0);
    }

    #[test]
    fn test_parse_view_and_criterion() {
        assert_eq!("Pending".parse::<View>().unwrap(), View::Pending);
        assert_eq!("Due Date".parse::<SortCriterion>().unwrap(), SortCriterion::DueDate);
        assert_eq!("due-date".parse::<SortCriterion>().unwrap(), SortCriterion::DueDate);
        assert!("size".parse::<SortCriterion>().is_err());
        assert_eq!(View::Urgent.to_string(), "Urgent");
    }
}
