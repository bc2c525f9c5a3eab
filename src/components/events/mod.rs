pub mod categories;
pub mod countdown;
pub mod model;
pub mod status;
pub mod store;
pub mod view;

pub use model::{EventInput, EventRecord};
pub use status::EventStatus;
pub use store::EventStore;
pub use view::{EventView, SharedEventStore, SyncHandle, ViewSnapshot};

use crate::components::storage::StorageActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use crate::utils::time::resolve_timezone;
use async_trait::async_trait;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::time::Duration;

/// Everything needed to (re)start the view synchronizer
struct SyncParams {
    store: SharedEventStore,
    tz: Tz,
    window_days: i64,
    tick: Duration,
}

/// Event tracking component
///
/// Owns the view synchronizer lifecycle so the ticker can be paused while
/// nothing is watching and resumed with a fresh recompute.
#[derive(Default)]
pub struct EventTracker {
    sync: RwLock<Option<SyncHandle>>,
    params: RwLock<Option<SyncParams>>,
}

impl EventTracker {
    /// Create a new event tracking component
    pub fn new() -> Self {
        Self {
            sync: RwLock::new(None),
            params: RwLock::new(None),
        }
    }

    /// Subscribe to display snapshots, if the synchronizer is running
    pub async fn subscribe(&self) -> Option<watch::Receiver<ViewSnapshot>> {
        let sync_lock = self.sync.read().await;
        sync_lock.as_ref().map(|handle| handle.subscribe())
    }

    /// Ask for an immediate recompute after a store mutation
    #[allow(dead_code)]
    pub async fn notify_mutation(&self) {
        let sync_lock = self.sync.read().await;
        if let Some(handle) = &*sync_lock {
            handle.notify_mutation();
        }
    }

    /// Stop the ticker without tearing the component down
    #[allow(dead_code)]
    pub async fn pause(&self) {
        let sync_lock = self.sync.read().await;
        if let Some(handle) = &*sync_lock {
            handle.stop();
        }
    }

    /// Restart the ticker after a pause; recomputes immediately
    #[allow(dead_code)]
    pub async fn resume(&self) {
        let mut sync_lock = self.sync.write().await;
        let stopped = sync_lock.as_ref().map(|h| h.is_stopped()).unwrap_or(false);
        if !stopped {
            return;
        }
        let params_lock = self.params.read().await;
        if let Some(params) = &*params_lock {
            *sync_lock = Some(SyncHandle::start(
                params.store.clone(),
                params.tz,
                params.window_days,
                params.tick,
            ));
        }
    }
}

#[async_trait]
impl super::Component for EventTracker {
    fn name(&self) -> &'static str {
        "events"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        _storage: StorageActorHandle,
        store: SharedEventStore,
    ) -> AppResult<()> {
        let (tz, window_days, tick) = {
            let config = config.read().await;
            (
                resolve_timezone(&config.timezone)?,
                config.upcoming_window_days,
                // interval() cannot take a zero period
                Duration::from_secs(config.tick_interval_secs.max(1)),
            )
        };

        let params = SyncParams {
            store: store.clone(),
            tz,
            window_days,
            tick,
        };

        let mut sync_lock = self.sync.write().await;
        if sync_lock.is_none() {
            *sync_lock = Some(SyncHandle::start(store, tz, window_days, tick));
        }
        *self.params.write().await = Some(params);

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        let sync_lock = self.sync.read().await;
        if let Some(handle) = &*sync_lock {
            handle.stop();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
