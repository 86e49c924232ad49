//! # Types
//!
//! Shared data structures used across all modules of the todo registry.
//!
//! ## Design decisions
//!
//! ### Lists live inside the registry
//!
//! A list instance is a [`ListMeta`] entry plus one [`Todo`] entry per live
//! todo, all keyed by a list reference (`u64`) that the registry allocates from
//! a counter. A re-created list therefore never shares a reference, or a todo
//! key, with the one it replaced.
//!
//! ### Todo lifecycle
//!
//! ```text
//! Created ──► Active ◄──► Completed
//!               └──────┬──────┘
//!                      ▼
//!                   Deleted
//! ```
//!
//! `Deleted` is terminal: the entry is removed and its id is never handed out
//! again by the owning list.

use soroban_sdk::{contracttype, Address, String, Vec};

/// Priority of a todo. Entry points take the raw `u32` code so an unknown
/// value is rejected with `Error::InvalidPriority` rather than a host error.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl From<todo_rules::Priority> for Priority {
    fn from(p: todo_rules::Priority) -> Self {
        match p {
            todo_rules::Priority::Low => Priority::Low,
            todo_rules::Priority::Medium => Priority::Medium,
            todo_rules::Priority::High => Priority::High,
        }
    }
}

impl From<Priority> for todo_rules::Priority {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Low => todo_rules::Priority::Low,
            Priority::Medium => todo_rules::Priority::Medium,
            Priority::High => todo_rules::Priority::High,
        }
    }
}

/// A single todo record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Todo {
    /// Unique within the owning list; never reused.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    /// Ledger timestamp of creation.
    pub created_at: u64,
    /// Ledger timestamp of the last successful mutation.
    pub updated_at: u64,
    /// Set while `completed` is true.
    pub completed_at: Option<u64>,
    pub due_date: Option<u64>,
}

/// Partial update for [`Todo`]. `None` leaves a field unchanged.
///
/// `description: Some("")` clears the description.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw priority code, validated like on creation.
    pub priority: Option<u32>,
    pub due_date: Option<u64>,
}

/// Per-instance state of one list.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListMeta {
    pub owner: Address,
    /// Id the next created todo receives. Starts at 1.
    pub next_id: u64,
    /// Live todo ids in insertion order.
    pub todo_ids: Vec<u64>,
}

/// Counts over one list.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TodoStats {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub high_priority_pending: u32,
}

impl From<todo_rules::Tally> for TodoStats {
    fn from(t: todo_rules::Tally) -> Self {
        TodoStats {
            total: t.total,
            completed: t.completed,
            pending: t.pending,
            high_priority_pending: t.high_priority_pending,
        }
    }
}

/// Counts across every registered list.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregateStats {
    pub total_users: u32,
    pub total_todos: u64,
    pub total_completed_todos: u64,
}

/// Running todo counters, kept in step with every list mutation.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    pub todos: u64,
    pub completed: u64,
}

/// Deployment-wide bounds, mirrored from [`todo_rules::Limits`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListLimits {
    pub max_title_length: u32,
    pub max_description_length: u32,
    pub max_todos_per_list: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        todo_rules::Limits::default().into()
    }
}

impl From<todo_rules::Limits> for ListLimits {
    fn from(l: todo_rules::Limits) -> Self {
        ListLimits {
            max_title_length: l.max_title_length,
            max_description_length: l.max_description_length,
            max_todos_per_list: l.max_todos_per_list,
        }
    }
}

impl From<&ListLimits> for todo_rules::Limits {
    fn from(l: &ListLimits) -> Self {
        todo_rules::Limits {
            max_title_length: l.max_title_length,
            max_description_length: l.max_description_length,
            max_todos_per_list: l.max_todos_per_list,
        }
    }
}
