//! The capability set the catalog needs from an object store.

use anyhow::Result;
use async_trait::async_trait;

use crate::services::storage::{StorageConnection, StorageManager};

/// Read-only view of a hierarchical object store.
///
/// Anything that can list prefixes, list objects and resolve an object to a
/// URL can back the image catalog.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Names of the prefixes directly under `path`, in listing order.
    async fn list_prefixes(&self, path: &str) -> Result<Vec<String>>;

    /// Full paths of the objects directly under `path`, in listing order.
    async fn list_objects(&self, path: &str) -> Result<Vec<String>>;

    /// Resolve an object path to a downloadable URL.
    async fn resolve_url(&self, path: &str) -> Result<String>;

    /// Build the URL of a path by the store's convention, without a backend call.
    async fn object_url(&self, path: &str) -> Result<String>;
}

#[async_trait]
impl<T> ObjectSource for T
where
    T: StorageConnection + ?Sized,
{
    async fn list_prefixes(&self, path: &str) -> Result<Vec<String>> {
        let entries = self.list(path).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect())
    }

    async fn list_objects(&self, path: &str) -> Result<Vec<String>> {
        let entries = self.list(path).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path)
            .collect())
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        self.download_url(path).await
    }

    async fn object_url(&self, path: &str) -> Result<String> {
        StorageConnection::object_url(self, path)
    }
}

#[async_trait]
impl ObjectSource for StorageManager {
    async fn list_prefixes(&self, path: &str) -> Result<Vec<String>> {
        let entries = self.list(path).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect())
    }

    async fn list_objects(&self, path: &str) -> Result<Vec<String>> {
        let entries = self.list(path).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path)
            .collect())
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        self.download_url(path).await
    }

    async fn object_url(&self, path: &str) -> Result<String> {
        StorageManager::object_url(self, path).await
    }
}
