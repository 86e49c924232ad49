//! Off-chain registry and todo lists on SQLite.
//!
//! Every operation runs in one database transaction: all checks read state
//! inside the transaction, and the state change plus its event row are
//! committed together. A rejected call returns before anything is written,
//! and the dropped transaction rolls back.
//!
//! | Operation           | Caller must own the list | Event                     |
//! |---------------------|--------------------------|---------------------------|
//! | `create_list`       | –                        | `list_created`            |
//! | `delete_list`       | –                        | `list_deleted`            |
//! | `create_todo`       | yes                      | `todo_created`            |
//! | `update_todo`       | yes                      | `todo_updated`            |
//! | `toggle_completion` | yes                      | `todo_completion_toggled` |
//! | `delete_todo`       | yes                      | `todo_deleted`            |
//!
//! Reads are open to everyone.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db;
use crate::errors::{LedgerError, Result};
use crate::events::TodoEvent;
use crate::model::{
    AggregateStats, Identity, Limits, ListRef, ListStats, NewTodo, Priority, Todo, TodoPatch,
};

/// Source of "now" in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Owner → list mapping and owner enumeration.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Allocate a fresh list for `caller`.
    async fn create_list(&self, caller: &Identity) -> Result<ListRef>;

    /// Drop the caller's list together with all of its todos.
    async fn delete_list(&self, caller: &Identity) -> Result<()>;

    async fn get_list(&self, owner: &Identity) -> Result<Option<ListRef>>;

    async fn get_owner_count(&self) -> Result<u64>;

    /// Owners in the order their lists were created. An `offset` past the
    /// end or a zero `limit` yields an empty page.
    async fn list_owners(&self, offset: u64, limit: u64) -> Result<Vec<Identity>>;

    async fn get_aggregate_stats(&self) -> Result<AggregateStats>;
}

/// Todo operations on one list.
#[async_trait]
pub trait TodoList: Send + Sync {
    async fn create_todo(&self, caller: &Identity, list: ListRef, todo: NewTodo) -> Result<u64>;

    async fn update_todo(
        &self,
        caller: &Identity,
        list: ListRef,
        id: u64,
        patch: TodoPatch,
    ) -> Result<()>;

    /// Returns the new completion state.
    async fn toggle_completion(&self, caller: &Identity, list: ListRef, id: u64) -> Result<bool>;

    async fn delete_todo(&self, caller: &Identity, list: ListRef, id: u64) -> Result<()>;

    async fn get_todo(&self, list: ListRef, id: u64) -> Result<Todo>;

    /// Todos in creation order.
    async fn get_all_todos(&self, list: ListRef) -> Result<Vec<Todo>>;

    async fn get_stats(&self, list: ListRef) -> Result<ListStats>;
}

#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
    limits: Limits,
    clock: Arc<dyn Clock>,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool, limits: Limits) -> Self {
        SqliteLedger {
            pool,
            limits,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────
// Rows
// ─────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ListRow {
    owner: String,
    next_id: i64,
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: String,
    priority: i64,
    completed: bool,
    created_at: i64,
    updated_at: i64,
    completed_at: Option<i64>,
    due_date: Option<i64>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = LedgerError;

    fn try_from(row: TodoRow) -> Result<Self> {
        let priority = u32::try_from(row.priority)
            .ok()
            .and_then(|code| Priority::from_code(code).ok())
            .ok_or_else(|| {
                sqlx::Error::Decode(format!("invalid priority code {}", row.priority).into())
            })?;
        Ok(Todo {
            id: row.id as u64,
            title: row.title,
            description: row.description,
            priority,
            completed: row.completed,
            created_at: row.created_at as u64,
            updated_at: row.updated_at as u64,
            completed_at: row.completed_at.map(|t| t as u64),
            due_date: row.due_date.map(|t| t as u64),
        })
    }
}

const TODO_COLUMNS: &str =
    "id, title, description, priority, completed, created_at, updated_at, completed_at, due_date";

// ─────────────────────────────────────────────────────────
// Transaction-scoped helpers
// ─────────────────────────────────────────────────────────

/// Load a list and check that `caller` owns it. A missing list is reported
/// before a foreign one.
async fn owned_list(
    conn: &mut SqliteConnection,
    caller: &Identity,
    list: ListRef,
) -> Result<ListRow> {
    let row: ListRow = sqlx::query_as("SELECT owner, next_id FROM lists WHERE list_ref = ?1")
        .bind(list.0)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(LedgerError::NotFound)?;
    if row.owner != caller.as_str() {
        return Err(LedgerError::Unauthorized);
    }
    Ok(row)
}

async fn list_exists(conn: &mut SqliteConnection, list: ListRef) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT list_ref FROM lists WHERE list_ref = ?1")
        .bind(list.0)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn load_todo(conn: &mut SqliteConnection, list: ListRef, id: u64) -> Result<Todo> {
    let id = i64::try_from(id).map_err(|_| LedgerError::NotFound)?;
    let row: TodoRow = sqlx::query_as(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE list_ref = ?1 AND id = ?2"
    ))
    .bind(list.0)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(LedgerError::NotFound)?;
    row.try_into()
}

async fn load_todos(conn: &mut SqliteConnection, list: ListRef) -> Result<Vec<Todo>> {
    let rows: Vec<TodoRow> = sqlx::query_as(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE list_ref = ?1 ORDER BY id ASC"
    ))
    .bind(list.0)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Todo::try_from).collect()
}

async fn record_event(conn: &mut SqliteConnection, event: TodoEvent, now: u64) -> Result<()> {
    let row = event.into_row(now)?;
    db::insert_event(&mut *conn, &row).await?;
    Ok(())
}

fn require_identity(caller: &Identity) -> Result<()> {
    if caller.is_empty() {
        return Err(LedgerError::Unauthorized);
    }
    Ok(())
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Due dates are stored as SQLite integers; anything past `i64::MAX` is
/// rejected rather than rewritten.
fn stored_due_date(due_date: Option<u64>) -> Result<Option<i64>> {
    due_date
        .map(|due| i64::try_from(due).map_err(|_| LedgerError::DueDateOutOfRange))
        .transpose()
}

// ─────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────

#[async_trait]
impl Registry for SqliteLedger {
    async fn create_list(&self, caller: &Identity) -> Result<ListRef> {
        require_identity(caller)?;
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT list_ref FROM owners WHERE owner = ?1")
                .bind(caller.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(LedgerError::AlreadyExists);
        }

        let list_ref =
            sqlx::query("INSERT INTO lists (owner, next_id, created_at) VALUES (?1, 1, ?2)")
                .bind(caller.as_str())
                .bind(now as i64)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
        let list_ref = ListRef(list_ref);

        sqlx::query("INSERT INTO owners (owner, list_ref) VALUES (?1, ?2)")
            .bind(caller.as_str())
            .bind(list_ref.0)
            .execute(&mut *tx)
            .await?;

        record_event(
            &mut tx,
            TodoEvent::ListCreated {
                owner: caller.clone(),
                list_ref,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, %list_ref, "list created");
        Ok(list_ref)
    }

    async fn delete_list(&self, caller: &Identity) -> Result<()> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let list_ref: i64 = sqlx::query_scalar("SELECT list_ref FROM owners WHERE owner = ?1")
            .bind(caller.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LedgerError::NotFound)?;
        let list_ref = ListRef(list_ref);

        let reclaimed = sqlx::query("DELETE FROM todos WHERE list_ref = ?1")
            .bind(list_ref.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM owners WHERE owner = ?1")
            .bind(caller.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM lists WHERE list_ref = ?1")
            .bind(list_ref.0)
            .execute(&mut *tx)
            .await?;

        record_event(
            &mut tx,
            TodoEvent::ListDeleted {
                owner: caller.clone(),
                list_ref,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, %list_ref, reclaimed, "list deleted");
        Ok(())
    }

    async fn get_list(&self, owner: &Identity) -> Result<Option<ListRef>> {
        let found: Option<i64> = sqlx::query_scalar("SELECT list_ref FROM owners WHERE owner = ?1")
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.map(ListRef))
    }

    async fn get_owner_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn list_owners(&self, offset: u64, limit: u64) -> Result<Vec<Identity>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let owners: Vec<String> =
            sqlx::query_scalar("SELECT owner FROM owners ORDER BY seq ASC LIMIT ?1 OFFSET ?2")
                .bind(clamp_i64(limit))
                .bind(clamp_i64(offset))
                .fetch_all(&self.pool)
                .await?;
        debug!(offset, limit, returned = owners.len(), "owners page");
        Ok(owners.into_iter().map(Identity::new).collect())
    }

    async fn get_aggregate_stats(&self) -> Result<AggregateStats> {
        let (users, todos, completed): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM owners),
                   COUNT(t.id),
                   COALESCE(SUM(t.completed), 0)
            FROM   todos t
            JOIN   owners o ON o.list_ref = t.list_ref
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(AggregateStats {
            total_users: users as u64,
            total_todos: todos as u64,
            total_completed_todos: completed as u64,
        })
    }
}

// ─────────────────────────────────────────────────────────
// Todo lists
// ─────────────────────────────────────────────────────────

#[async_trait]
impl TodoList for SqliteLedger {
    async fn create_todo(&self, caller: &Identity, list: ListRef, todo: NewTodo) -> Result<u64> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let row = owned_list(&mut tx, caller, list).await?;
        let priority = self.limits.check_draft(&todo.draft(), now)?;
        let due_date = stored_due_date(todo.due_date)?;

        let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE list_ref = ?1")
            .bind(list.0)
            .fetch_one(&mut *tx)
            .await?;
        self.limits
            .check_capacity(u32::try_from(live).unwrap_or(u32::MAX))?;

        let id = row.next_id;
        sqlx::query("UPDATE lists SET next_id = next_id + 1 WHERE list_ref = ?1")
            .bind(list.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO todos
                (list_ref, id, title, description, priority, completed,
                 created_at, updated_at, completed_at, due_date)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6, NULL, ?7)
            "#,
        )
        .bind(list.0)
        .bind(id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(priority.code() as i64)
        .bind(now as i64)
        .bind(due_date)
        .execute(&mut *tx)
        .await?;

        record_event(
            &mut tx,
            TodoEvent::TodoCreated {
                owner: caller.clone(),
                list_ref: list,
                id: id as u64,
                title: todo.title,
                priority,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, list_ref = %list, id, "todo created");
        Ok(id as u64)
    }

    async fn update_todo(
        &self,
        caller: &Identity,
        list: ListRef,
        id: u64,
        patch: TodoPatch,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        owned_list(&mut tx, caller, list).await?;
        let mut todo = load_todo(&mut tx, list, id).await?;
        let priority = self.limits.check_patch(&patch.draft(), now)?;

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(priority) = priority {
            todo.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = Some(due_date);
        }
        todo.updated_at = now;
        let due_date = stored_due_date(todo.due_date)?;

        sqlx::query(
            r#"
            UPDATE todos
            SET    title = ?1, description = ?2, priority = ?3, due_date = ?4, updated_at = ?5
            WHERE  list_ref = ?6 AND id = ?7
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.code() as i64)
        .bind(due_date)
        .bind(now as i64)
        .bind(list.0)
        .bind(todo.id as i64)
        .execute(&mut *tx)
        .await?;

        record_event(
            &mut tx,
            TodoEvent::TodoUpdated {
                owner: caller.clone(),
                list_ref: list,
                id,
                title: todo.title,
                priority: todo.priority,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, list_ref = %list, id, "todo updated");
        Ok(())
    }

    async fn toggle_completion(&self, caller: &Identity, list: ListRef, id: u64) -> Result<bool> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        owned_list(&mut tx, caller, list).await?;
        let todo = load_todo(&mut tx, list, id).await?;
        let completed = !todo.completed;
        let completed_at = completed.then_some(now as i64);

        sqlx::query(
            r#"
            UPDATE todos
            SET    completed = ?1, completed_at = ?2, updated_at = ?3
            WHERE  list_ref = ?4 AND id = ?5
            "#,
        )
        .bind(completed)
        .bind(completed_at)
        .bind(now as i64)
        .bind(list.0)
        .bind(todo.id as i64)
        .execute(&mut *tx)
        .await?;

        record_event(
            &mut tx,
            TodoEvent::TodoCompletionToggled {
                owner: caller.clone(),
                list_ref: list,
                id,
                completed,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, list_ref = %list, id, completed, "todo toggled");
        Ok(completed)
    }

    async fn delete_todo(&self, caller: &Identity, list: ListRef, id: u64) -> Result<()> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        owned_list(&mut tx, caller, list).await?;
        let todo = load_todo(&mut tx, list, id).await?;

        sqlx::query("DELETE FROM todos WHERE list_ref = ?1 AND id = ?2")
            .bind(list.0)
            .bind(todo.id as i64)
            .execute(&mut *tx)
            .await?;

        record_event(
            &mut tx,
            TodoEvent::TodoDeleted {
                owner: caller.clone(),
                list_ref: list,
                id,
            },
            now,
        )
        .await?;
        tx.commit().await?;

        info!(owner = %caller, list_ref = %list, id, "todo deleted");
        Ok(())
    }

    async fn get_todo(&self, list: ListRef, id: u64) -> Result<Todo> {
        let mut conn = self.pool.acquire().await?;
        load_todo(&mut conn, list, id).await
    }

    async fn get_all_todos(&self, list: ListRef) -> Result<Vec<Todo>> {
        let mut tx = self.pool.begin().await?;
        if !list_exists(&mut tx, list).await? {
            return Err(LedgerError::NotFound);
        }
        let todos = load_todos(&mut tx, list).await?;
        tx.commit().await?;
        Ok(todos)
    }

    async fn get_stats(&self, list: ListRef) -> Result<ListStats> {
        let todos = self.get_all_todos(list).await?;
        Ok(todos.iter().map(|t| (t.completed, t.priority)).collect())
    }
}
