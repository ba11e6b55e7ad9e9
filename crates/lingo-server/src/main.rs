//! # lingo-server
//!
//! REST backend for the Lingo translated-messaging application.
//!
//! This binary provides:
//! - **Account management**: login, admin user creation/deletion, password
//!   changes, with a bootstrap admin seeded on first run
//! - **Message persistence**: append, transactional full-thread replace,
//!   and grouped per-counterparty retrieval over one normalized table
//! - **Task persistence**: transactional replace-on-write checklists
//! - **Health probe** for client connection tests

mod api;
mod config;
mod error;

use std::sync::{Arc, Mutex};

use tracing::info;
use tracing_subscriber::EnvFilter;

use lingo_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lingo_server=debug")),
        )
        .init();

    info!("Starting Lingo server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        http_addr = %config.http_addr,
        db_path = %config.db_path.display(),
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Open the database and seed the bootstrap admin
    // -----------------------------------------------------------------------
    let db = Database::open_at(&config.db_path)?;
    if db.seed_admin(&config.admin_password)? {
        info!("admin account created (username: admin)");
    }

    let http_addr = config.http_addr;
    let app_state = AppState {
        db: Arc::new(Mutex::new(db)),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
