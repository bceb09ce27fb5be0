//! In-memory document store.
//!
//! Documents are held behind a `RwLock` and will be lost on service restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreResult};

/// In-memory document store.
pub struct MemoryStore<T> {
    value: RwLock<T>,
}

impl<T: Default> MemoryStore<T> {
    /// Create a store holding the entity's default value.
    pub fn new() -> Self {
        Self::with_value(T::default())
    }
}

impl<T: Default> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStore<T> {
    /// Create a store pre-populated with `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }
}

#[async_trait]
impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn read(&self) -> StoreResult<Option<T>> {
        Ok(Some(self.value.read().await.clone()))
    }

    async fn write(&self, value: &T) -> StoreResult<()> {
        *self.value.write().await = value.clone();
        Ok(())
    }
}
