use tokio::sync::broadcast;

/// Receiver that fires once on Ctrl-C.
pub async fn create_shutdown_channel() -> broadcast::Receiver<()> {
    let (shutdown_sender, shutdown_receiver): (broadcast::Sender<()>, broadcast::Receiver<()>) =
        broadcast::channel::<()>(100);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("signal received, starting graceful shutdown");
        let _ = shutdown_sender.send(());
    });
    shutdown_receiver
}
