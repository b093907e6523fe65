use std::sync::Arc;

use anyhow::Result;
use pe_engine::notify::notify_best_effort;
use tracing_subscriber::EnvFilter;

mod scheduler;
mod services;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting PE buyer bot...");

    let app_state = Arc::new(AppState::new()?);
    tracing::info!("AppState initialized");

    notify_best_effort(app_state.notifier.as_ref(), "✅ FYERS PE BUY BOT STARTED").await;

    let every = tokio::time::Duration::from_secs(app_state.schedule_secs);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };
    scheduler::run(app_state.orchestrator.clone(), every, shutdown).await;

    tracing::info!("Bot stopped");
    Ok(())
}
