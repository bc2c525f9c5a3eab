use crate::components::events::status::EventStatus;
use crate::components::events::{EventStore, SharedEventStore, ViewSnapshot};
use crate::components::reminders::DispatchReport;
use crate::components::storage::{StorageActor, StorageActorHandle};
use crate::components::{ComponentManager, EventTracker, Reminders};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Spawn the storage actor and return its handle
pub async fn open_storage(config: Arc<RwLock<Config>>) -> StorageActorHandle {
    let (mut storage_actor, storage_handle) = {
        let config_read = config.read().await;
        StorageActor::new(&config_read)
    };

    // Spawn storage actor task
    tokio::spawn(async move {
        storage_actor.run().await;
    });

    storage_handle
}

/// Initialize and run the reminder daemon until a shutdown signal arrives
pub async fn start_app(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    info!("Starting muistutin daemon");

    let storage_handle = open_storage(Arc::clone(&config)).await;

    // Load the event collection once; components share it
    let store: SharedEventStore = Arc::new(RwLock::new(
        EventStore::load(storage_handle.clone()).await,
    ));
    {
        let store_read = store.read().await;
        info!("Loaded {} events", store_read.count());
    }

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register enabled components
    {
        let config_read = config.read().await;
        if config_read.is_component_enabled("events") {
            component_manager.register(EventTracker::new());
        }
        if config_read.is_component_enabled("reminders") {
            component_manager.register(Reminders::new());
        }
    }

    let component_manager = Arc::new(component_manager);

    if let Err(e) = component_manager
        .init_all(
            Arc::clone(&config),
            storage_handle.clone(),
            Arc::clone(&store),
        )
        .await
    {
        error!("Failed to initialize components: {:?}", e);
    }

    // Log status summaries from the view synchronizer
    if let Some(tracker) = component_manager
        .get_component_by_name("events")
        .and_then(|c| c.as_any().downcast_ref::<EventTracker>())
    {
        if let Some(snapshot_rx) = tracker.subscribe().await {
            tokio::spawn(async move {
                watch_snapshots(snapshot_rx).await;
            });
        }
    }

    // Log dispatch outcomes from the reminder scheduler
    if let Some(reminders) = component_manager
        .get_component_by_name("reminders")
        .and_then(|c| c.as_any().downcast_ref::<Reminders>())
    {
        if let Some(reports_rx) = reminders.take_reports().await {
            tokio::spawn(async move {
                watch_reports(reports_rx).await;
            });
        }
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    let shutdown_storage = storage_handle.clone();
    let shutdown_components = Arc::clone(&component_manager);

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_storage).await;
    });

    info!("Daemon running, press Ctrl+C to stop");

    // Wait for the shutdown signal
    if shutdown_recv.await.is_ok() {
        info!("Shutdown complete");
    }
    Ok(())
}

/// Log a one-line summary whenever the status buckets change
async fn watch_snapshots(mut snapshot_rx: watch::Receiver<ViewSnapshot>) {
    let mut last_counts: Option<[usize; 4]> = None;
    loop {
        if snapshot_rx.changed().await.is_err() {
            break;
        }
        let snapshot = snapshot_rx.borrow_and_update().clone();
        let mut counts = [0usize; 4];
        for view in &snapshot.views {
            if let Some(index) = EventStatus::DISPLAY_ORDER
                .iter()
                .position(|s| *s == view.status)
            {
                counts[index] += 1;
            }
        }
        if last_counts != Some(counts) {
            info!(
                "Events: {} today, {} upcoming, {} future, {} past",
                counts[0], counts[1], counts[2], counts[3]
            );
            last_counts = Some(counts);
        }
    }
}

/// Log reminder dispatch outcomes
async fn watch_reports(mut reports_rx: mpsc::UnboundedReceiver<DispatchReport>) {
    while let Some(report) = reports_rx.recv().await {
        match &report.outcome {
            Ok(()) => info!("Reminder sent for '{}'", report.title),
            Err(e) => error!("Reminder for '{}' failed: {}", report.title, e),
        }
    }
}
