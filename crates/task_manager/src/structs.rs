//! Task data structures

use crate::error::TaskError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a task, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item.
///
/// Serialized with camelCase keys so that lists written by older front ends
/// (`date`/`time` for the creation stamp, no `id`) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Records without an id get a fresh one on load
    #[serde(default)]
    pub id: TaskId,

    /// Task title
    pub text: String,

    pub category: Category,

    pub priority: Priority,

    #[serde(default)]
    pub completed: bool,

    /// Local date the task was created
    #[serde(alias = "date")]
    pub created_date: NaiveDate,

    /// Local time the task was created, second precision
    #[serde(alias = "time", with = "clock_time")]
    pub created_time: NaiveTime,

    /// Required at creation; an edit may clear it, stored as `""`
    #[serde(default, with = "optional_date")]
    pub due_date: Option<NaiveDate>,

    /// Plain text notes, in insertion order
    #[serde(default)]
    pub subtasks: Vec<String>,
}

impl Task {
    /// Create a task stamped with the current local time.
    pub fn new(text: String, category: Category, priority: Priority, due_date: NaiveDate) -> Self {
        Self::with_created_at(text, category, priority, due_date, Local::now().naive_local())
    }

    /// Create a task with an explicit creation stamp.
    pub fn with_created_at(
        text: String,
        category: Category,
        priority: Priority,
        due_date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self {
        // Sub-second precision would not survive the persisted time format
        let created_time = created_at.time().with_nanosecond(0).unwrap_or(created_at.time());
        Self {
            id: TaskId::new(),
            text,
            category,
            priority,
            completed: false,
            created_date: created_at.date(),
            created_time,
            due_date: Some(due_date),
            subtasks: Vec::new(),
        }
    }

    /// Copy of this task under a new id. Subtasks are cloned, not shared.
    pub fn duplicate(&self) -> Self {
        Self {
            id: TaskId::new(),
            ..self.clone()
        }
    }

    /// Whether the title contains `query`, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        self.text.to_lowercase().contains(&query.to_lowercase())
    }

    /// Current editable fields.
    pub fn draft(&self) -> EditDraft {
        EditDraft {
            text: self.text.clone(),
            category: self.category,
            priority: self.priority,
            due_date: self.due_date,
        }
    }

    /// Overwrite the editable fields. No validation is applied.
    pub fn apply(&mut self, draft: EditDraft) {
        self.text = draft.text;
        self.category = draft.category;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
    }
}

/// Pending values of an in-progress edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDraft {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, with = "optional_date")]
    pub due_date: Option<NaiveDate>,
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Urgent,
}

impl Default for Category {
    fn default() -> Self {
        Self::Work
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Urgent => "Urgent",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "urgent" => Ok(Category::Urgent),
            other => Err(TaskError::InvalidValue(format!("unknown category '{}'", other))),
        }
    }
}

/// Task priority. Variant order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(name)
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(TaskError::InvalidValue(format!("unknown priority '{}'", other))),
        }
    }
}

/// Parse a `YYYY-MM-DD` due date. Blank input means "no date".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, TaskError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| TaskError::InvalidValue(format!("bad date '{}': {}", input, e)))
}

/// Due date as `YYYY-MM-DD`, or `""` when there is none. `null` and a
/// missing key also read as no date.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, FORMAT)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("bad due date '{}': {}", raw, e)))
    }
}

/// Creation time as `HH:MM:SS`; also reads 12-hour `h:mm:ss AM` stamps.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";
    const LEGACY_FORMATS: [&str; 3] = ["%I:%M:%S %p", "%H:%M:%S%.f", "%H:%M"];

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        std::iter::once(FORMAT)
            .chain(LEGACY_FORMATS)
            .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| D::Error::custom(format!("unrecognized time '{}'", raw)))
    }
}
