mod actor;

pub use actor::keys;
pub use actor::{StorageActor, StorageActorHandle};
