//! Event types shared by the local ledger and the contract indexer.
//!
//! The topic symbols match what `contracts/todo_registry/src/events.rs`
//! publishes, so a list created on chain and one created locally end up as
//! the same `event_type` in the `events` table.
//!
//! | Topic      | Kind                    |
//! |------------|-------------------------|
//! | `list_new` | `list_created`          |
//! | `list_del` | `list_deleted`          |
//! | `todo_new` | `todo_created`          |
//! | `todo_upd` | `todo_updated`          |
//! | `todo_tgl` | `todo_completion_toggled` |
//! | `todo_del` | `todo_deleted`          |
//! | `admin`    | `admin_changed`         |
//! | `limits`   | `limits_changed`        |

use serde::{Deserialize, Serialize};

use crate::model::{Identity, ListRef, Priority};

/// All recognised event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ListCreated,
    ListDeleted,
    TodoCreated,
    TodoUpdated,
    TodoCompletionToggled,
    TodoDeleted,
    AdminChanged,
    LimitsChanged,
    /// An event from the contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "list_new" => Self::ListCreated,
            "list_del" => Self::ListDeleted,
            "todo_new" => Self::TodoCreated,
            "todo_upd" => Self::TodoUpdated,
            "todo_tgl" => Self::TodoCompletionToggled,
            "todo_del" => Self::TodoDeleted,
            "admin" => Self::AdminChanged,
            "limits" => Self::LimitsChanged,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListCreated => "list_created",
            Self::ListDeleted => "list_deleted",
            Self::TodoCreated => "todo_created",
            Self::TodoUpdated => "todo_updated",
            Self::TodoCompletionToggled => "todo_completion_toggled",
            Self::TodoDeleted => "todo_deleted",
            Self::AdminChanged => "admin_changed",
            Self::LimitsChanged => "limits_changed",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the second topic of this event is the list owner.
    pub fn has_owner_topic(&self) -> bool {
        !matches!(
            self,
            Self::AdminChanged | Self::LimitsChanged | Self::Unknown
        )
    }
}

/// An event raised by a local ledger operation. Serialized as the `detail`
/// column, so its field names follow the contract's event structs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TodoEvent {
    ListCreated {
        owner: Identity,
        list_ref: ListRef,
    },
    ListDeleted {
        owner: Identity,
        list_ref: ListRef,
    },
    TodoCreated {
        owner: Identity,
        list_ref: ListRef,
        id: u64,
        title: String,
        priority: Priority,
    },
    TodoUpdated {
        owner: Identity,
        list_ref: ListRef,
        id: u64,
        title: String,
        priority: Priority,
    },
    TodoCompletionToggled {
        owner: Identity,
        list_ref: ListRef,
        id: u64,
        completed: bool,
    },
    TodoDeleted {
        owner: Identity,
        list_ref: ListRef,
        id: u64,
    },
}

impl TodoEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ListCreated { .. } => EventKind::ListCreated,
            Self::ListDeleted { .. } => EventKind::ListDeleted,
            Self::TodoCreated { .. } => EventKind::TodoCreated,
            Self::TodoUpdated { .. } => EventKind::TodoUpdated,
            Self::TodoCompletionToggled { .. } => EventKind::TodoCompletionToggled,
            Self::TodoDeleted { .. } => EventKind::TodoDeleted,
        }
    }

    pub fn owner(&self) -> &Identity {
        match self {
            Self::ListCreated { owner, .. }
            | Self::ListDeleted { owner, .. }
            | Self::TodoCreated { owner, .. }
            | Self::TodoUpdated { owner, .. }
            | Self::TodoCompletionToggled { owner, .. }
            | Self::TodoDeleted { owner, .. } => owner,
        }
    }

    pub fn list_ref(&self) -> ListRef {
        match self {
            Self::ListCreated { list_ref, .. }
            | Self::ListDeleted { list_ref, .. }
            | Self::TodoCreated { list_ref, .. }
            | Self::TodoUpdated { list_ref, .. }
            | Self::TodoCompletionToggled { list_ref, .. }
            | Self::TodoDeleted { list_ref, .. } => *list_ref,
        }
    }

    pub fn todo_id(&self) -> Option<u64> {
        match self {
            Self::ListCreated { .. } | Self::ListDeleted { .. } => None,
            Self::TodoCreated { id, .. }
            | Self::TodoUpdated { id, .. }
            | Self::TodoCompletionToggled { id, .. }
            | Self::TodoDeleted { id, .. } => Some(*id),
        }
    }

    /// Flatten into a row for the `events` table.
    pub fn into_row(self, timestamp: u64) -> serde_json::Result<NewEvent> {
        Ok(NewEvent {
            event_id: None,
            event_type: self.kind().as_str().to_string(),
            owner: Some(self.owner().to_string()),
            list_ref: Some(self.list_ref().0),
            todo_id: self.todo_id().map(|id| id as i64),
            detail: Some(serde_json::to_string(&self)?),
            ledger: None,
            timestamp: timestamp as i64,
            contract_id: None,
            tx_hash: None,
        })
    }
}

/// A decoded event, ready to be stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// RPC event id; `None` for local events.
    pub event_id: Option<String>,
    pub event_type: String,
    pub owner: Option<String>,
    pub list_ref: Option<i64>,
    pub todo_id: Option<i64>,
    /// Event payload as JSON text.
    pub detail: Option<String>,
    pub ledger: Option<i64>,
    pub timestamp: i64,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: Option<String>,
    pub event_type: String,
    pub owner: Option<String>,
    pub list_ref: Option<i64>,
    pub todo_id: Option<i64>,
    pub detail: Option<String>,
    pub ledger: Option<i64>,
    pub timestamp: i64,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
