//! TaskDost server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (TOML + env overrides)
//!   3. Init logger at configured level
//!   4. Open the SQLite store (creates schema)
//!   5. Build the LLM provider (or run template-only)
//!   6. Serve HTTP until ctrl-c

use std::sync::Arc;

use tracing::{info, warn};

use taskdost::agent::{ChatAgent, ChatService};
use taskdost::error::AppError;
use taskdost::http::{self, AppState};
use taskdost::llm::providers;
use taskdost::store::SqliteStore;
use taskdost::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.server.log_level)?;

    info!(
        bind = %config.server.bind,
        db_path = %config.database.path.display(),
        provider = %config.llm.provider,
        "config loaded"
    );

    let store = Arc::new(SqliteStore::open(&config.database.path)?);
    info!("database ready");

    let provider = providers::build(&config.llm, config.hf_token.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    let agent = ChatAgent::new(provider);
    match agent.mode() {
        "rule_based" => warn!("no llm provider configured; using template responses"),
        mode => info!(%mode, "llm provider ready"),
    }

    let state = AppState {
        store: store.clone(),
        chat: ChatService::new(store, agent),
        history_limit: config.chat.history_limit,
    };

    http::serve(&config.server.bind, state).await
}
