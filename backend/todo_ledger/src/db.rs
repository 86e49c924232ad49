//! Database layer — pool setup, migrations, cursor management and the event log.
//!
//! Ledger state queries live next to the operations in [`crate::ledger`];
//! this module owns everything both the ledger and the indexer touch.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, NewEvent};

/// Establish a SQLite connection pool and run pending migrations.
///
/// The pool holds a single connection. SQLite admits one writer at a time,
/// and one connection means every ledger transaction runs strictly after the
/// previous one. It also keeps `sqlite::memory:` databases alive for the
/// lifetime of the pool.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Store one event. Takes any executor so ledger operations can write their
/// event inside their own transaction.
///
/// Returns the number of rows inserted: `0` when an event with the same
/// RPC `event_id` is already stored.
pub async fn insert_event<'e, E>(executor: E, ev: &NewEvent) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows_affected = sqlx::query(
        r#"
        INSERT OR IGNORE INTO events
            (event_id, event_type, owner, list_ref, todo_id, detail,
             ledger, timestamp, contract_id, tx_hash)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&ev.event_id)
    .bind(&ev.event_type)
    .bind(&ev.owner)
    .bind(ev.list_ref)
    .bind(ev.todo_id)
    .bind(&ev.detail)
    .bind(ev.ledger)
    .bind(ev.timestamp)
    .bind(&ev.contract_id)
    .bind(&ev.tx_hash)
    .execute(executor)
    .await?
    .rows_affected();
    Ok(rows_affected)
}

/// Persist a batch of decoded contract events in one transaction. Events
/// whose RPC id is already stored are silently ignored, which makes
/// re-polling a ledger range harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[NewEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        count += insert_event(&mut *tx, ev).await? as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events concerning one owner, oldest first.
pub async fn get_events_for_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, owner, list_ref, todo_id, detail,
               ledger, timestamp, contract_id, tx_hash, created_at
        FROM   events
        WHERE  owner = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, oldest first.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, owner, list_ref, todo_id, detail,
               ledger, timestamp, contract_id, tx_hash, created_at
        FROM   events
        ORDER  BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
