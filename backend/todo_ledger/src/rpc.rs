//! Soroban RPC client — polls `getEvents` and decodes registry events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and values arrive
//! as JSON-rendered `ScVal`s (`{"symbol":"todo_new"}`, `{"address":"G..."}`,
//! `{"map":[{"key":…,"val":…}]}`). Plain JSON objects and bare strings are
//! accepted as well.
//!
//! ## Retries
//!
//! Network failures, HTTP 429 and soft JSON-RPC errors are retried with a
//! doubling delay capped at [`MAX_BACKOFF_SECS`]. Only malformed-request and
//! unknown-method errors are returned to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{LedgerError, Result};
use crate::events::{EventKind, NewEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topic list, JSON-rendered
    #[serde(default, rename = "topicJson", alias = "topic")]
    pub topic: Vec<Value>,
    /// Event data, JSON-rendered
    #[serde(default, rename = "valueJson", alias = "value")]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch up to `limit` events of `contract_id`, either from `start_ledger`
/// (inclusive) or, when given, from the `cursor` of a previous page.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                backoff = sleep_and_grow(backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            backoff = sleep_and_grow(backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            // Invalid request / unknown method will not fix themselves.
            if err.code == -32600 || err.code == -32601 {
                return Err(LedgerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            backoff = sleep_and_grow(backoff).await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| LedgerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

async fn sleep_and_grow(backoff: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(backoff)).await;
    next_backoff(backoff)
}

fn next_backoff(backoff: u64) -> u64 {
    (backoff * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into rows for the `events` table. Events from
/// failed contract calls are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<NewEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<NewEvent> {
    let kind = EventKind::from_topic(&scalar(raw.topic.first()?)?);

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let owner = if kind.has_owner_topic() {
        raw.topic
            .get(1)
            .and_then(scalar)
            .or_else(|| field(&raw.value, "owner").and_then(scalar))
    } else {
        None
    };
    let list_ref = field(&raw.value, "list_ref")
        .and_then(scalar)
        .and_then(|s| s.parse().ok());
    let todo_id = field(&raw.value, "id")
        .and_then(scalar)
        .and_then(|s| s.parse().ok());

    Some(NewEvent {
        event_id: raw.id.clone(),
        event_type: kind.as_str().to_string(),
        owner,
        list_ref,
        todo_id,
        detail: (!raw.value.is_null()).then(|| raw.value.to_string()),
        ledger: raw.ledger.map(|l| l as i64),
        timestamp,
        contract_id: Some(
            raw.contract_id
                .clone()
                .unwrap_or_else(|| contract_id.to_string()),
        ),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Render a scalar `ScVal` as a string: `{"symbol":"x"}`, `{"u64":"5"}`,
/// `{"address":"G…"}`, a bare JSON string/number/bool, or the older
/// `{"type":…,"value":…}` shape.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                return scalar(inner);
            }
            if map.len() == 1 {
                return map.values().next().and_then(scalar);
            }
            None
        }
        _ => None,
    }
}

/// Look up a named field of a contract struct. Handles the `ScMap` rendering
/// (`{"map":[{"key":{"symbol":"owner"},"val":…}]}`) and plain objects.
fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    if let Some(entries) = value.get("map").and_then(Value::as_array) {
        return entries.iter().find_map(|entry| {
            let key = entry.get("key").and_then(scalar)?;
            (key == name).then(|| entry.get("val")).flatten()
        });
    }
    value.get(name)
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
