//! Axum REST API handlers. Read-only: mutations go through the ledger traits
//! or the contract.
//!
//! | Route                            | Body                                    |
//! |----------------------------------|-----------------------------------------|
//! | `GET /health`                    | status and crate version                |
//! | `GET /events`                    | every stored event                      |
//! | `GET /owners/:owner/events`      | events concerning one owner             |
//! | `GET /owners?offset&limit`       | page of owners in creation order        |
//! | `GET /owners/:owner/list`        | the owner's list ref, or `null`         |
//! | `GET /stats`                     | aggregate counters                      |
//! | `GET /limits`                    | limits this ledger enforces             |
//! | `GET /lists/:list_ref/todos`     | all todos of a list                     |
//! | `GET /lists/:list_ref/todos/:id` | one todo                                |
//! | `GET /lists/:list_ref/stats`     | per-list counters                       |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::db;
use crate::errors::LedgerError;
use crate::events::EventRecord;
use crate::ledger::{Registry, SqliteLedger, TodoList};
use crate::model::{Identity, ListRef, Todo};

/// Page size used when `/owners` is called without `limit`.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub ledger: SqliteLedger,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/owners", get(list_owners))
        .route("/owners/:owner/events", get(get_owner_events))
        .route("/owners/:owner/list", get(get_owner_list))
        .route("/stats", get(get_aggregate_stats))
        .route("/limits", get(get_limits))
        .route("/lists/:list_ref/todos", get(get_all_todos))
        .route("/lists/:list_ref/todos/:id", get(get_todo))
        .route("/lists/:list_ref/stats", get(get_list_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub owner: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct OwnersResponse {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub owners: Vec<Identity>,
}

#[derive(Serialize)]
pub struct OwnerListResponse {
    pub owner: Identity,
    pub list_ref: Option<ListRef>,
}

#[derive(Serialize)]
pub struct TodosResponse {
    pub list_ref: ListRef,
    pub count: usize,
    pub todos: Vec<Todo>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

fn ok<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

fn failure(e: LedgerError) -> Response {
    let status = match e {
        LedgerError::NotFound => StatusCode::NOT_FOUND,
        _ if e.is_rejection() => StatusCode::BAD_REQUEST,
        _ => {
            error!("API request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => ok(AllEventsResponse {
            count: events.len(),
            events,
        }),
        Err(e) => failure(e),
    }
}

/// `GET /owners/:owner/events`
pub async fn get_owner_events(
    State(state): State<Arc<ApiState>>,
    Path(owner): Path<String>,
) -> Response {
    match db::get_events_for_owner(&state.pool, &owner).await {
        Ok(events) => ok(EventsResponse {
            owner,
            count: events.len(),
            events,
        }),
        Err(e) => failure(e),
    }
}

/// `GET /owners?offset=&limit=`
pub async fn list_owners(
    State(state): State<Arc<ApiState>>,
    Query(page): Query<PageQuery>,
) -> Response {
    let offset = page.offset.unwrap_or(0);
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let total = match state.ledger.get_owner_count().await {
        Ok(total) => total,
        Err(e) => return failure(e),
    };
    match state.ledger.list_owners(offset, limit).await {
        Ok(owners) => ok(OwnersResponse {
            total,
            offset,
            limit,
            owners,
        }),
        Err(e) => failure(e),
    }
}

/// `GET /owners/:owner/list`
pub async fn get_owner_list(
    State(state): State<Arc<ApiState>>,
    Path(owner): Path<String>,
) -> Response {
    let owner = Identity::new(owner);
    match state.ledger.get_list(&owner).await {
        Ok(list_ref) => ok(OwnerListResponse { owner, list_ref }),
        Err(e) => failure(e),
    }
}

/// `GET /stats`
pub async fn get_aggregate_stats(State(state): State<Arc<ApiState>>) -> Response {
    match state.ledger.get_aggregate_stats().await {
        Ok(stats) => ok(stats),
        Err(e) => failure(e),
    }
}

/// `GET /limits`
pub async fn get_limits(State(state): State<Arc<ApiState>>) -> Response {
    ok(state.ledger.limits())
}

/// `GET /lists/:list_ref/todos`
pub async fn get_all_todos(
    State(state): State<Arc<ApiState>>,
    Path(list_ref): Path<i64>,
) -> Response {
    let list_ref = ListRef(list_ref);
    match state.ledger.get_all_todos(list_ref).await {
        Ok(todos) => ok(TodosResponse {
            list_ref,
            count: todos.len(),
            todos,
        }),
        Err(e) => failure(e),
    }
}

/// `GET /lists/:list_ref/todos/:id`
pub async fn get_todo(
    State(state): State<Arc<ApiState>>,
    Path((list_ref, id)): Path<(i64, u64)>,
) -> Response {
    match state.ledger.get_todo(ListRef(list_ref), id).await {
        Ok(todo) => ok(todo),
        Err(e) => failure(e),
    }
}

/// `GET /lists/:list_ref/stats`
pub async fn get_list_stats(
    State(state): State<Arc<ApiState>>,
    Path(list_ref): Path<i64>,
) -> Response {
    match state.ledger.get_stats(ListRef(list_ref)).await {
        Ok(stats) => ok(stats),
        Err(e) => failure(e),
    }
}
