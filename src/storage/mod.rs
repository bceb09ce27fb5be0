//! Document storage for orders, notification settings and the delivery log.
//!
//! Each entity is a single JSON document (a list or an object) behind the
//! [`DocumentStore`] trait:
//!
//! - `JsonFileStore`: one pretty-printed JSON file per entity (default)
//! - `MemoryStore`: process-local storage, lost on restart
//!
//! Mutations go through a [`StoreHandle`], which serializes every
//! read-modify-write cycle for its entity so concurrent requests cannot
//! overwrite each other's changes.
//!
//! Use [`create_stores`] to build the stores selected by configuration.

mod file_backend;
mod memory_backend;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::StorageConfig;
use crate::notification::{LogEntry, NotificationSettings};
use crate::order::Order;

pub use file_backend::JsonFileStore;
pub use memory_backend::MemoryStore;

const ORDERS_FILE: &str = "orders.json";
const SETTINGS_FILE: &str = "settings.json";
const NOTIFICATIONS_FILE: &str = "notifications.json";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored document is not valid JSON for its entity
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A whole-document store for one entity type.
///
/// `read` has no side effects: it returns `None` when nothing has been
/// stored yet. Defaults are materialized by [`StoreHandle`].
#[async_trait]
pub trait DocumentStore<T: Send + Sync>: Send + Sync {
    /// Backend type identifier ("file", "memory")
    fn backend_type(&self) -> &'static str;

    /// Load the current document, if one exists
    async fn read(&self) -> StoreResult<Option<T>>;

    /// Replace the stored document
    async fn write(&self, value: &T) -> StoreResult<()>;
}

/// Order collection store
pub type OrderStore = dyn DocumentStore<Vec<Order>>;

/// Notification settings store
pub type SettingsStore = dyn DocumentStore<NotificationSettings>;

/// Delivery log store
pub type LogStore = dyn DocumentStore<Vec<LogEntry>>;

/// Single-writer access to one entity's store.
///
/// Reads of an existing document go straight to the store. Every write,
/// including writing the default document on first access, holds the
/// entity's writer lock for its whole duration.
pub struct StoreHandle<T: Default + Send + Sync + 'static> {
    store: Arc<dyn DocumentStore<T>>,
    write_lock: Mutex<()>,
}

impl<T: Default + Send + Sync + 'static> StoreHandle<T> {
    pub fn new(store: Arc<dyn DocumentStore<T>>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the current document, persisting the default if none exists
    pub async fn load(&self) -> StoreResult<T> {
        if let Some(value) = self.store.read().await? {
            return Ok(value);
        }

        let _guard = self.write_lock.lock().await;
        // Another writer may have created the document while we waited
        if let Some(value) = self.store.read().await? {
            return Ok(value);
        }

        let value = T::default();
        self.store.write(&value).await?;
        Ok(value)
    }

    /// Replace the document wholesale
    pub async fn replace(&self, value: T) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store.write(&value).await
    }

    /// Apply `mutate` to the current document and persist the result.
    ///
    /// If `mutate` fails nothing is written.
    pub async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut value = self.store.read().await?.unwrap_or_default();
        let output = mutate(&mut value)?;
        self.store.write(&value).await?;
        Ok(output)
    }

    pub fn backend_type(&self) -> &'static str {
        self.store.backend_type()
    }
}

/// The stores backing every persisted entity
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<OrderStore>,
    pub settings: Arc<SettingsStore>,
    pub log: Arc<LogStore>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn memory() -> Self {
        Self {
            orders: Arc::new(MemoryStore::<Vec<Order>>::new()),
            settings: Arc::new(MemoryStore::<NotificationSettings>::new()),
            log: Arc::new(MemoryStore::<Vec<LogEntry>>::new()),
        }
    }

    /// JSON file stores under `data_dir`
    pub fn files(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            orders: Arc::new(JsonFileStore::<Vec<Order>>::new(dir.join(ORDERS_FILE))),
            settings: Arc::new(JsonFileStore::<NotificationSettings>::new(
                dir.join(SETTINGS_FILE),
            )),
            log: Arc::new(JsonFileStore::<Vec<LogEntry>>::new(
                dir.join(NOTIFICATIONS_FILE),
            )),
        }
    }
}

/// Create the entity stores based on configuration.
///
/// - `"memory"`: in-memory stores
/// - `"file"` (default): JSON documents under `data_dir`
pub fn create_stores(config: &StorageConfig) -> Stores {
    match config.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory stores");
            Stores::memory()
        }
        other => {
            if other != "file" {
                tracing::warn!(
                    backend = %other,
                    "Unknown storage backend requested, falling back to file"
                );
            }
            tracing::info!(backend = "file", data_dir = %config.data_dir, "Creating file stores");
            Stores::files(&config.data_dir)
        }
    }
}
