//! JSON file document store.
//!
//! Each entity lives in its own pretty-printed JSON file. A missing file
//! reads as `None`; the owning `StoreHandle` writes the default under its
//! lock. Every write goes to a uniquely named sibling temporary file which is
//! then renamed over the original, so overlapping writers never share a
//! temporary file.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::{DocumentStore, StoreError, StoreResult};

/// File-backed document store.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Create a store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entity: PhantomData,
        }
    }

    /// A fresh `.<name>.<uuid>.tmp` sibling of the backing file
    fn temp_path(&self) -> PathBuf {
        let mut name = std::ffi::OsString::from(".");
        if let Some(file_name) = self.path.file_name() {
            name.push(file_name);
        }
        name.push(format!(".{}.tmp", Uuid::now_v7().simple()));
        self.path.with_file_name(name)
    }

    async fn ensure_parent_dir(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent, e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn read(&self) -> StoreResult<Option<T>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Document missing");
                Ok(None)
            }
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn write(&self, value: &T) -> StoreResult<()> {
        self.ensure_parent_dir().await?;

        let bytes = serde_json::to_vec_pretty(value)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::io(&self.path, e));
        }

        Ok(())
    }
}
