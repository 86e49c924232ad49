//! Off-chain todo list registry.
//!
//! [`ledger::SqliteLedger`] implements the same registry and list operations
//! as the Soroban contract in `contracts/todo_registry`, validated by the
//! shared `todo_rules` crate and serialized through SQLite transactions.
//! [`indexer`] mirrors the contract's events into the same `events` table the
//! local ledger writes to, and [`api`] serves both over a read-only REST API.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod indexer;
pub mod ledger;
pub mod model;
pub mod rpc;
