use crate::config::Config;
use crate::error::{persistence_error, AppResult};
use redis::{aio::ConnectionManager, AsyncCommands, Client as RedisClient};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Keys this application writes to the key-value store
pub mod keys {
    /// Prefix shared by every key the application owns
    pub const NAMESPACE: &str = "muistutin:";
    /// Serialized array of event records
    pub const EVENTS: &str = "muistutin:events";
    /// Serialized array of category records
    pub const CATEGORIES: &str = "muistutin:categories";
    /// Prefix for per-event reminder markers; event id and day are appended
    pub const REMINDER_SENT_PREFIX: &str = "muistutin:reminded:";
}

/// Where the actor keeps its values
enum StorageBackend {
    /// Durable Redis-backed storage
    Redis(RedisClient),
    /// Process-local map, used by tests and `STORAGE_BACKEND=memory`
    Memory(HashMap<String, String>),
}

/// The storage actor that processes key-value commands
pub struct StorageActor {
    backend: StorageBackend,
    redis_conn: Option<ConnectionManager>,
    command_rx: mpsc::Receiver<StorageCommand>,
}

/// Commands that can be sent to the storage actor
pub enum StorageCommand {
    Get(String, mpsc::Sender<AppResult<Option<String>>>),
    Set(String, String, mpsc::Sender<AppResult<()>>),
    Clear(mpsc::Sender<AppResult<()>>),
    Shutdown,
}

/// Handle for communicating with the storage actor
#[derive(Clone)]
pub struct StorageActorHandle {
    command_tx: mpsc::Sender<StorageCommand>,
}

impl StorageActorHandle {
    /// Create a new empty handle for initialization purposes
    ///
    /// Every operation through an empty handle fails with a storage error;
    /// callers that tolerate persistence failures keep working in memory.
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    /// Read the value stored under a key, if any
    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(StorageCommand::Get(key.to_string(), response_tx))
            .await
            .map_err(|e| persistence_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| persistence_error("Response channel closed"))?
    }

    /// Write a value under a key
    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(StorageCommand::Set(
                key.to_string(),
                value.to_string(),
                response_tx,
            ))
            .await
            .map_err(|e| persistence_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| persistence_error("Response channel closed"))?
    }

    /// Remove every key owned by the application
    pub async fn clear(&self) -> AppResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(StorageCommand::Clear(response_tx))
            .await
            .map_err(|e| persistence_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| persistence_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(StorageCommand::Shutdown).await;
        Ok(())
    }
}

impl StorageActor {
    /// Create a new actor and return its handle
    pub fn new(config: &Config) -> (Self, StorageActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let backend = match config.storage_backend.as_str() {
            "memory" => StorageBackend::Memory(HashMap::new()),
            "redis" => Self::redis_backend(&config.redis_url),
            other => {
                warn!("Unknown storage backend '{}', falling back to redis", other);
                Self::redis_backend(&config.redis_url)
            }
        };

        let actor = Self {
            backend,
            redis_conn: None,
            command_rx,
        };

        let handle = StorageActorHandle { command_tx };

        (actor, handle)
    }

    fn redis_backend(redis_url: &str) -> StorageBackend {
        // Connection setup is deferred; a bad URL surfaces on first use
        let client = RedisClient::open(redis_url).unwrap_or_else(|_| {
            warn!("Invalid Redis URL '{}', using default", redis_url);
            RedisClient::open("redis://127.0.0.1:6379").expect("default Redis URL is valid")
        });
        StorageBackend::Redis(client)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Storage actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                StorageCommand::Get(key, response_tx) => {
                    let result = self.get_value(&key).await;
                    let _ = response_tx.send(result).await;
                }
                StorageCommand::Set(key, value, response_tx) => {
                    let result = self.set_value(&key, value).await;
                    let _ = response_tx.send(result).await;
                }
                StorageCommand::Clear(response_tx) => {
                    let result = self.clear_values().await;
                    let _ = response_tx.send(result).await;
                }
                StorageCommand::Shutdown => {
                    info!("Storage actor shutting down");
                    break;
                }
            }
        }

        info!("Storage actor shut down");
    }

    /// Get a live Redis connection, connecting lazily on first use
    async fn redis_connection(&mut self) -> AppResult<ConnectionManager> {
        if let Some(conn) = &self.redis_conn {
            return Ok(conn.clone());
        }

        let client = match &self.backend {
            StorageBackend::Redis(client) => client.clone(),
            StorageBackend::Memory(_) => {
                return Err(persistence_error("Memory backend has no Redis connection"))
            }
        };

        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| persistence_error(&format!("Failed to connect to Redis: {}", e)))?;

        self.redis_conn = Some(conn.clone());
        Ok(conn)
    }

    /// Read a value from the backend
    async fn get_value(&mut self, key: &str) -> AppResult<Option<String>> {
        match &self.backend {
            StorageBackend::Memory(map) => Ok(map.get(key).cloned()),
            StorageBackend::Redis(_) => {
                let mut conn = self.redis_connection().await?;
                let value: Option<String> = conn
                    .get(key)
                    .await
                    .map_err(|e| persistence_error(&format!("Failed to read '{}': {}", key, e)))?;
                Ok(value)
            }
        }
    }

    /// Write a value to the backend
    async fn set_value(&mut self, key: &str, value: String) -> AppResult<()> {
        match &mut self.backend {
            StorageBackend::Memory(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            StorageBackend::Redis(_) => {
                let mut conn = self.redis_connection().await?;
                let _: () = conn
                    .set(key, value)
                    .await
                    .map_err(|e| persistence_error(&format!("Failed to write '{}': {}", key, e)))?;
                Ok(())
            }
        }
    }

    /// Remove every key under the application namespace
    async fn clear_values(&mut self) -> AppResult<()> {
        match &mut self.backend {
            StorageBackend::Memory(map) => {
                map.clear();
                Ok(())
            }
            StorageBackend::Redis(_) => {
                let mut conn = self.redis_connection().await?;
                let pattern = format!("{}*", keys::NAMESPACE);
                let owned: Vec<String> = redis::cmd("KEYS")
                    .arg(&pattern)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| persistence_error(&format!("Failed to list keys: {}", e)))?;

                if !owned.is_empty() {
                    let _: () = conn.del(owned).await.map_err(|e| {
                        persistence_error(&format!("Failed to clear storage: {}", e))
                    })?;
                }
                Ok(())
            }
        }
    }
}
