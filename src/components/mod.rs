use crate::components::events::SharedEventStore;
use crate::components::storage::StorageActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

pub mod events;
pub mod reminders;
pub mod storage;

pub use events::EventTracker;
pub use reminders::Reminders;

/// A long-lived part of the daemon with a managed lifecycle
///
/// Components get the shared config, the storage handle and the shared event
/// collection at init, and release whatever they started at shutdown.
#[async_trait]
pub trait Component: Send + Sync + Any {
    /// Stable name used for lookup and the enable map
    fn name(&self) -> &'static str;

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        storage: StorageActorHandle,
        store: SharedEventStore,
    ) -> AppResult<()>;

    async fn shutdown(&self) -> AppResult<()>;

    /// Downcasting hook so the daemon can reach component-specific handles
    fn as_any(&self) -> &dyn Any;
}

/// Holds the registered components and drives them through their lifecycle
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    config: Arc<RwLock<Config>>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("component_count", &self.components.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ComponentManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    /// Get the configuration
    #[allow(dead_code)]
    pub fn get_config(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    pub fn register<T: Component + 'static>(&mut self, component: T) {
        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Initialize components in registration order
    ///
    /// A component that fails to come up does not stop the rest; the failure
    /// is logged and the daemon runs with whatever did start.
    pub async fn init_all(
        &self,
        config: Arc<RwLock<Config>>,
        storage: StorageActorHandle,
        store: SharedEventStore,
    ) -> AppResult<()> {
        for component in &self.components {
            info!("Initializing component: {}", component.name());

            if let Err(e) = component
                .init(config.clone(), storage.clone(), store.clone())
                .await
            {
                error!("Component {} failed to initialize: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    /// Shut components down in registration order, continuing past failures
    pub async fn shutdown_all(&self) -> AppResult<()> {
        for component in &self.components {
            info!("Shutting down component: {}", component.name());

            if let Err(e) = component.shutdown().await {
                error!("Component {} failed to shut down: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }
}
