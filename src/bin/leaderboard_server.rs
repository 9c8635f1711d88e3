//! Leaderboard Server - HTTP runtime
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin leaderboard_server
//! ```
//!
//! ## Environment Variables
//!
//! - LEADERBOARD_DB_PATH - SQLite database path (default: data/leaderboard.db)
//! - LEADERBOARD_BIND_ADDR - Listen address (default: 0.0.0.0:3000)
//! - LEADERBOARD_BUSY_TIMEOUT_MS - SQLite busy timeout (default: 5000)
//! - LEADERBOARD_CLOCK - `local` or `utc` (default: local)
//! - RUST_LOG - Logging level (optional, default: info)

use leaderboard::api::{router, AppState};
use leaderboard::config::ServerConfig;
use leaderboard::SqliteRecordStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ServerConfig::from_env()?;

    log::info!("🚀 Starting Leaderboard Server");
    log::info!("   Database: {}", config.db_path);
    log::info!("   Bind address: {}", config.bind_addr);
    log::info!("   Busy timeout: {}ms", config.busy_timeout.as_millis());
    log::info!("   Clock: {:?}", config.clock);

    let store = Arc::new(SqliteRecordStore::new(&config.db_path, config.busy_timeout)?);
    let clock = config.clock;
    let app = router(AppState::new(store, move || clock.now()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("✅ Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("👋 Leaderboard Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
