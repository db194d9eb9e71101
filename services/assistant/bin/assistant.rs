//! Main Entrypoint for the Teacher Assistant
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Opening the database and running migrations.
//! 3. Seeding configured groups.
//! 4. Running the console conversation on stdin/stdout until end of input
//!    or Ctrl+C.

use anyhow::Context;
use teacher_assistant::{config::Config, console, db::Db, state::AppState};
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;

/// Listens for the `Ctrl+C` signal to shut down.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    // Logs go to stderr so they never interleave with the conversation.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!("Configuration loaded. Opening database...");

    // --- 3. Initialize Database ---
    let db = Db::connect(&config.database_url, config.max_connections).await?;
    db.run_migrations().await?;
    info!(
        database_url = %config.database_url,
        "Database ready and migrations are up-to-date."
    );

    // --- 4. Shared State ---
    let state = AppState::new(db, config);
    state.seed_groups().await?;
    let stored = state.db.count_grades().await?;
    info!(grades = stored, policy = ?state.config.credential_policy, "Assistant ready");

    // --- 5. Run Console ---
    tokio::select! {
        result = console::run(&state, BufReader::new(stdin()), stdout()) => result?,
        _ = shutdown_signal() => {}
    }

    info!("Assistant has shut down.");
    Ok(())
}
