//! Value types handled by the ledger and returned by the API.

use std::fmt;

use serde::{Deserialize, Serialize};
use todo_rules::{priority_change, PatchDraft, TodoDraft};

pub use todo_rules::{Limits, Priority, Tally as ListStats};

/// Chain-native account reference (G-/C- strkey, 0x address, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Identity(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(raw: &str) -> Self {
        Identity::new(raw)
    }
}

/// Handle of one list. Allocated from an `AUTOINCREMENT` row id, so a
/// re-created list never reuses an old handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListRef(pub i64);

impl fmt::Display for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: u64,
    pub updated_at: u64,
    pub completed_at: Option<u64>,
    pub due_date: Option<u64>,
}

/// Input of `create_todo`. `priority` is the raw code so out-of-range values
/// reach validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: u32,
    #[serde(default)]
    pub due_date: Option<u64>,
}

impl NewTodo {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Self {
        NewTodo {
            title: title.into(),
            description: description.into(),
            priority: priority.code(),
            due_date: None,
        }
    }

    pub fn due(mut self, due_date: u64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub(crate) fn draft(&self) -> TodoDraft {
        TodoDraft {
            title_len: byte_len(&self.title),
            description_len: byte_len(&self.description),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

/// Partial update. `None` leaves a field as it is; `description:
/// Some(String::new())` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub due_date: Option<u64>,
}

impl TodoPatch {
    /// Decode the positional convention used by EVM clients: an empty string
    /// leaves a text field unchanged, [`todo_rules::PRIORITY_UNCHANGED`]
    /// leaves the priority, and a zero due date leaves the due date.
    pub fn from_sentinels(title: &str, description: &str, priority: u32, due_date: u64) -> Self {
        TodoPatch {
            title: non_empty(title),
            description: non_empty(description),
            priority: priority_change(priority),
            due_date: (due_date != 0).then_some(due_date),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority.code());
        self
    }

    pub fn due_date(mut self, due_date: u64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == TodoPatch::default()
    }

    pub(crate) fn draft(&self) -> PatchDraft {
        PatchDraft {
            title_len: self.title.as_deref().map(byte_len),
            description_len: self.description.as_deref().map(byte_len),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_users: u64,
    pub total_todos: u64,
    pub total_completed_todos: u64,
}

fn non_empty(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn byte_len(s: &str) -> u32 {
    u32::try_from(s.len()).unwrap_or(u32::MAX)
}
