use tokio::signal;
use tracing::info;

/// Resolves on Ctrl+C or SIGTERM; passed to `axum::serve` for graceful shutdown.
#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("🛑 Ctrl+C received"),
        () = terminate => info!("🛑 SIGTERM received"),
    }

    info!("⏳ Finishing in-flight generations before exit...");
}
