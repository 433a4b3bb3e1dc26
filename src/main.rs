use std::sync::Arc;

use tern::config::Config;
use tern::server::{self, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    match &cfg.files_directory {
        Some(dir) => tracing::info!("Serving files from {}", dir.display()),
        None => tracing::info!("No files directory configured, /files answers 404"),
    }

    let state = Arc::new(ServerState::new(cfg));

    tokio::select! {
        res = server::listener::run(state) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
