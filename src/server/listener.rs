use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::ServerState;

/// Pause after a failed accept, so persistent failures such as running out
/// of file descriptors do not spin the loop.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until the task is dropped.
pub async fn run(state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&state.config().listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, state).await
}

/// Accepts connections on an already bound listener, one task per connection.
///
/// A failed accept or a failed connection is logged and never stops the loop.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!(error = %e, "Failed to accept connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, state);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
