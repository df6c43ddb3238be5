// Server loop module
// Accepts connections until the shutdown signal fires

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::{accept_connection, ServerKind};
use crate::config;
use crate::logger;

/// Accept loop shared by the public and admin servers
///
/// Returns once `shutdown` flips or its sender is dropped. Connections
/// already being served keep running on their local tasks.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    kind: ServerKind,
    mut shutdown: watch::Receiver<bool>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, kind);
                    }
                    Err(e) => {
                        logger::log_error(&format!(
                            "Failed to accept connection on {} server: {e}",
                            kind.name()
                        ));
                    }
                }
            }

            _ = shutdown.changed() => {
                logger::log_info(&format!("{} server stopped accepting connections", kind.name()));
                break;
            }
        }
    }
}
