//! Todo ledger — entry point.
//!
//! Opens the SQLite ledger, optionally starts the background indexer that
//! mirrors the registry contract's events, and serves the REST API until
//! Ctrl-C.

use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_ledger::api::{self, ApiState};
use todo_ledger::config::Config;
use todo_ledger::db;
use todo_ledger::indexer::{self, IndexerState};
use todo_ledger::ledger::SqliteLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    info!(limits = ?config.limits, "Configuration loaded");

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;
    let ledger = SqliteLedger::new(pool.clone(), config.limits);
    let shutdown = CancellationToken::new();

    // ─── Background indexer ───────────────────────────────
    let indexer_task = match config.contract_id.clone() {
        Some(contract_id) => {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?;
            let state = Arc::new(IndexerState {
                pool: pool.clone(),
                config: config.clone(),
                client,
                contract_id,
            });
            Some(tokio::spawn(indexer::run(state, shutdown.clone())))
        }
        None => {
            info!("CONTRACT_ID not set; indexer disabled");
            None
        }
    };

    // ─── REST API ─────────────────────────────────────────
    let app = api::router(Arc::new(ApiState { pool, ledger }));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    if let Some(task) = indexer_task {
        task.await?;
    }
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    info!("Shutdown requested");
    shutdown.cancel();
}
