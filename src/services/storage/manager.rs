//! Storage connection manager.
//!
//! This module provides a cloneable handle on the active storage connection,
//! handling its lifecycle and delegating the read-only operations.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::factory::StorageFactory;
use super::traits::BoxedStorageConnection;
use super::types::{ObjectInfo, StorageConfig};

/// Connection status for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConnectionStatus {
    /// Not connected to any storage.
    Disconnected,
    /// Currently connecting.
    Connecting,
    /// Connected to storage.
    Connected,
    /// Connection failed with error.
    Failed(String),
}

/// Manager for storage connections.
///
/// # Example
///
/// ```ignore
/// use image_search::services::storage::{StorageManager, StorageConfig, StorageType, StorageParams};
///
/// let manager = StorageManager::new();
///
/// let config = StorageConfig::new(
///     "firebase".to_string(),
///     StorageType::Gcs,
///     StorageParams::gcs("pss-front.appspot.com".to_string(), None),
/// );
///
/// manager.connect(config).await?;
///
/// let projects = manager.list("/").await?;
/// ```
#[derive(Clone)]
pub struct StorageManager {
    connection: Arc<RwLock<Option<BoxedStorageConnection>>>,
    status: Arc<RwLock<StorageConnectionStatus>>,
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageManager {
    /// Create a new storage manager.
    pub fn new() -> Self {
        Self {
            connection: Arc::new(RwLock::new(None)),
            status: Arc::new(RwLock::new(StorageConnectionStatus::Disconnected)),
        }
    }

    /// Get the current connection status.
    pub async fn status(&self) -> StorageConnectionStatus {
        self.status.read().await.clone()
    }

    /// Check if connected.
    pub async fn is_connected(&self) -> bool {
        matches!(*self.status.read().await, StorageConnectionStatus::Connected)
    }

    /// Connect to storage using the provided configuration.
    ///
    /// If already connected, disconnects first.
    pub async fn connect(&self, config: StorageConfig) -> Result<()> {
        if self.is_connected().await {
            self.disconnect().await?;
        }

        *self.status.write().await = StorageConnectionStatus::Connecting;

        let mut connection = match StorageFactory::create(config.clone()) {
            Ok(conn) => conn,
            Err(e) => {
                *self.status.write().await = StorageConnectionStatus::Failed(e.to_string());
                return Err(e);
            }
        };

        if let Err(e) = connection.connect().await {
            *self.status.write().await = StorageConnectionStatus::Failed(e.to_string());
            return Err(e);
        }

        tracing::info!(
            "Connected to {} storage: {}",
            connection.storage_type(),
            config.name
        );

        *self.connection.write().await = Some(connection);
        *self.status.write().await = StorageConnectionStatus::Connected;

        Ok(())
    }

    /// Disconnect from current storage.
    pub async fn disconnect(&self) -> Result<()> {
        let mut conn_guard = self.connection.write().await;
        if let Some(mut conn) = conn_guard.take() {
            conn.disconnect().await?;
        }

        *self.status.write().await = StorageConnectionStatus::Disconnected;

        Ok(())
    }

    // Delegated storage operations

    /// List the direct children of the given path.
    pub async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        let guard = self.connection.read().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| anyhow!("Not connected to storage"))?;
        conn.list(path).await
    }

    /// Resolve an object to a downloadable URL.
    pub async fn download_url(&self, path: &str) -> Result<String> {
        let guard = self.connection.read().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| anyhow!("Not connected to storage"))?;
        conn.download_url(path).await
    }

    /// Build the URL for an object without contacting the backend.
    pub async fn object_url(&self, path: &str) -> Result<String> {
        let guard = self.connection.read().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| anyhow!("Not connected to storage"))?;
        conn.object_url(path)
    }
}
