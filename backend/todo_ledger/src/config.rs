//! Application configuration loaded from environment variables.

use std::str::FromStr;

use todo_rules::{
    Limits, DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_MAX_TITLE_LENGTH, DEFAULT_MAX_TODOS_PER_LIST,
};

use crate::errors::{LedgerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g. https://soroban-testnet.stellar.org)
    pub rpc_url: String,
    /// The registry contract address (Strkey format). The indexer only runs
    /// when this is set.
    pub contract_id: Option<String>,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) to poll the RPC for new events
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved
    pub start_ledger: u32,
    /// Bounds applied by the local ledger
    pub limits: Limits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let limits = Limits {
            max_title_length: parse_or(&lookup, "MAX_TITLE_LENGTH", DEFAULT_MAX_TITLE_LENGTH)?,
            max_description_length: parse_or(
                &lookup,
                "MAX_DESCRIPTION_LENGTH",
                DEFAULT_MAX_DESCRIPTION_LENGTH,
            )?,
            max_todos_per_list: parse_or(
                &lookup,
                "MAX_TODOS_PER_LIST",
                DEFAULT_MAX_TODOS_PER_LIST,
            )?,
        };
        limits
            .validate()
            .map_err(|e| LedgerError::Config(format!("Invalid limits: {e}")))?;

        Ok(Config {
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://soroban-testnet.stellar.org".to_string()),
            contract_id: lookup("CONTRACT_ID").filter(|id| !id.trim().is_empty()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./todo_ledger.db".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or(&lookup, "START_LEDGER", 0)?,
            limits,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LedgerError::Config(format!("Invalid {key}"))),
        None => Ok(default),
    }
}
