use crate::core::models::FsEvent;
use crate::infrastructure::registry::ClientRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Drains the watcher intake and fans every event out to all subscribers.
/// Each event is fully delivered before the next one is pulled, so every
/// subscriber sees the watcher's order. Returns when the intake closes.
pub async fn run_broadcast_loop(mut events: mpsc::Receiver<FsEvent>, registry: Arc<ClientRegistry>) {
    while let Some(event) = events.recv().await {
        tracing::info!("Filesystem event: {} {:?}", event.kind, event.path);
        let delivered = registry.broadcast(&event).await;
        tracing::debug!(delivered, "Event fanned out");
    }

    tracing::info!("Watcher intake closed, broadcast loop stopped");
}

pub fn start_broadcast_loop(
    events: mpsc::Receiver<FsEvent>,
    registry: Arc<ClientRegistry>,
) -> JoinHandle<()> {
    tokio::spawn(run_broadcast_loop(events, registry))
}
