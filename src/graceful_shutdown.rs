use tracing::warn;

/// Resolves once the process receives Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to listen for SIGTERM");

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to listen for Ctrl+C");
                warn!("Ctrl+C received, shutting down...");
            }
            _ = sigterm.recv() => {
                warn!("SIGTERM received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        warn!("Ctrl+C received, shutting down...");
    }
}
