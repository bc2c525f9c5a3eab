use crate::components::storage::StorageActorHandle;
use crate::components::ComponentManager;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Wait for a termination signal, then unwind the daemon in order
///
/// Components go down first so their background tasks stop touching storage.
/// The storage actor follows, and the oneshot then releases the main task.
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    component_manager: Arc<ComponentManager>,
    storage_handle: StorageActorHandle,
) {
    wait_for_signal().await;

    if let Err(e) = component_manager.shutdown_all().await {
        error!("Component shutdown reported an error: {:?}", e);
    } else {
        info!("All components stopped");
    }

    // Storage goes last so late reminder markers still get through
    if let Err(e) = storage_handle.shutdown().await {
        error!("Storage actor shutdown reported an error: {:?}", e);
    } else {
        info!("Storage actor stopped");
    }

    let _ = shutdown_send.send(());
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() {
    // SIGTERM is what service managers send on stop, SIGINT is Ctrl+C
    let mut sigterm =
        signal(SignalKind::terminate()).expect("Failed to create SIGTERM signal handler");
    let mut sigint =
        signal(SignalKind::interrupt()).expect("Failed to create SIGINT signal handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down");
        }
        _ = sigint.recv() => {
            info!("SIGINT received, shutting down");
        }
    }
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
async fn wait_for_signal() {
    let mut ctrlc = ctrl_c().expect("Failed to create Ctrl+C signal handler");
    let mut ctrlbreak = ctrl_break().expect("Failed to create Ctrl+Break signal handler");

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Ctrl+C received, shutting down");
        }
        _ = ctrlbreak.recv() => {
            info!("Ctrl+Break received, shutting down");
        }
    }
}
