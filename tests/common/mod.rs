use muistutin::components::storage::{StorageActor, StorageActorHandle};
use muistutin::config::Config;

/// Spawn a memory-backed storage actor for tests
pub fn memory_storage() -> StorageActorHandle {
    let config = Config::default();
    let (mut actor, handle) = StorageActor::new(&config);
    tokio::spawn(async move {
        actor.run().await;
    });
    handle
}
