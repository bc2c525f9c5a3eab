mod common;

use async_trait::async_trait;
use common::memory_storage;
use muistutin::components::events::{EventInput, EventStore, SharedEventStore};
use muistutin::components::storage::StorageActorHandle;
use muistutin::components::{Component, ComponentManager, EventTracker};
use muistutin::config::Config;
use muistutin::error::AppResult;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Smoke test to verify the default config values
#[tokio::test]
async fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.upcoming_window_days, 7);
    assert_eq!(config.tick_interval_secs, 1);
    assert_eq!(config.reminder_time, "09:00");
    assert_eq!(config.storage_backend, "memory");
    assert!(config.is_component_enabled("events"));
    assert!(config.is_component_enabled("reminders"));
    assert!(!config.is_component_enabled("unknown"));
    assert!(!config.email_configured());
}

/// Email settings count as configured only when all four are present
#[tokio::test]
async fn test_email_configuration_detection() {
    let mut config = Config::default();
    config.email_api_url = Some("https://api.example.com/send".to_string());
    config.email_api_key = Some("key".to_string());
    config.email_from = Some("muistutin@example.com".to_string());
    assert!(!config.email_configured());

    config.email_to = Some("me@example.com".to_string());
    assert!(config.email_configured());
}

/// An empty storage handle degrades writes without breaking the store
#[tokio::test]
async fn test_store_survives_missing_storage() {
    let storage = StorageActorHandle::empty();
    assert!(storage.shutdown().await.is_ok());

    // Mutations still succeed in memory even though persistence fails
    let mut store = EventStore::new(StorageActorHandle::empty());
    let record = store
        .add(EventInput {
            title: "Offline note".to_string(),
            date: "2026-09-01".to_string(),
            ..EventInput::default()
        })
        .await
        .unwrap();
    assert_eq!(store.count(), 1);
    assert!(store.get_by_id(&record.id).is_some());
}

/// Components initialize in registration order
#[tokio::test]
async fn test_component_manager_initializes_in_registration_order() {
    struct Recorder {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Component for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(
            &self,
            _config: Arc<RwLock<Config>>,
            _storage: StorageActorHandle,
            _store: SharedEventStore,
        ) -> AppResult<()> {
            self.order.lock().await.push(self.name);
            Ok(())
        }

        async fn shutdown(&self) -> AppResult<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    let config = Arc::new(RwLock::new(Config::default()));
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut manager = ComponentManager::new(Arc::clone(&config));
    manager.register(Recorder {
        name: "first",
        order: Arc::clone(&order),
    });
    manager.register(Recorder {
        name: "second",
        order: Arc::clone(&order),
    });

    let storage = memory_storage();
    let store: SharedEventStore = Arc::new(RwLock::new(EventStore::new(storage.clone())));

    manager.init_all(config, storage, store).await.unwrap();

    assert_eq!(*order.lock().await, vec!["first", "second"]);
    assert!(manager.get_component_by_name("second").is_some());
    assert!(manager.get_component_by_name("third").is_none());

    manager.shutdown_all().await.unwrap();
}

/// The events component starts its synchronizer from config
#[tokio::test]
async fn test_event_tracker_component_lifecycle() {
    let config = Arc::new(RwLock::new(Config::default()));
    let storage = memory_storage();
    let store: SharedEventStore = Arc::new(RwLock::new(EventStore::load(storage.clone()).await));

    let tracker = EventTracker::new();
    tracker
        .init(Arc::clone(&config), storage, Arc::clone(&store))
        .await
        .unwrap();

    // A subscription is available once init ran
    assert!(tracker.subscribe().await.is_some());

    tracker.shutdown().await.unwrap();
}

/// The synchronizer can be paused and resumed, and pokes trigger a rebuild
#[tokio::test]
async fn test_event_tracker_pause_resume_and_mutation_poke() {
    use tokio::time::{timeout, Duration};

    let config = Arc::new(RwLock::new(Config::default()));
    let storage = memory_storage();
    let store: SharedEventStore = Arc::new(RwLock::new(EventStore::load(storage.clone()).await));

    let tracker = EventTracker::new();
    tracker
        .init(Arc::clone(&config), storage, Arc::clone(&store))
        .await
        .unwrap();

    tracker.pause().await;
    tracker.resume().await;
    let mut snapshot_rx = tracker.subscribe().await.expect("synchronizer restarted");

    store
        .write()
        .await
        .add(EventInput {
            title: "Poked in".to_string(),
            date: "2026-12-24".to_string(),
            ..EventInput::default()
        })
        .await
        .unwrap();
    tracker.notify_mutation().await;

    // Ticks only refresh countdowns, so the new event shows up in the
    // snapshot exactly when the mutation poke forced a rebuild
    let saw_event = async {
        loop {
            snapshot_rx.changed().await.unwrap();
            if !snapshot_rx.borrow_and_update().views.is_empty() {
                break;
            }
        }
    };
    timeout(Duration::from_secs(5), saw_event)
        .await
        .expect("rebuild after mutation poke");

    tracker.shutdown().await.unwrap();
}
