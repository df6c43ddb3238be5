// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C elsewhere) stop both servers.

use tokio::sync::watch;

use crate::logger;

/// Wait for a termination signal, then wake every server loop
#[cfg(unix)]
pub async fn wait_for_shutdown(shutdown: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                // Keep the sender alive so the servers keep running
                std::future::pending::<()>().await;
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => logger::log_info("SIGTERM received, shutting down"),
        _ = sigint.recv() => logger::log_info("SIGINT received, shutting down"),
    }
    shutdown.send_replace(true);
}

/// Non-unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown(shutdown: watch::Sender<bool>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            logger::log_info("Ctrl+C received, shutting down");
            shutdown.send_replace(true);
        }
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
