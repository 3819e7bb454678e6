//! Storage connection traits.
//!
//! This module defines the core trait for storage backends, providing
//! the read-only listing and URL-resolution interface the image catalog needs.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{ObjectInfo, StorageType};

/// Core trait for storage connections.
///
/// # Example
///
/// ```ignore
/// use image_search::services::storage::{GcsStorage, StorageConfig, StorageConnection, StorageParams, StorageType};
///
/// let config = StorageConfig::new(
///     "firebase".to_string(),
///     StorageType::Gcs,
///     StorageParams::gcs("pss-front.appspot.com".to_string(), None),
/// );
///
/// let mut storage = GcsStorage::new(config);
/// storage.connect().await?;
///
/// for obj in storage.list("siteA/object_imags/").await? {
///     println!("{}", obj.name);
/// }
/// ```
#[async_trait]
pub trait StorageConnection: Send + Sync {
    /// Get the storage type for this connection.
    fn storage_type(&self) -> StorageType;

    /// Connect to the storage backend.
    ///
    /// This builds the operator and validates it against the backend.
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from the storage backend.
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if currently connected.
    async fn is_connected(&self) -> bool;

    /// List the direct children (objects and prefixes) of the given path.
    ///
    /// Entries come back in key order, byte-wise by path.
    async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>>;

    /// Resolve an object to a URL a client can download it from.
    ///
    /// May involve a backend round trip (e.g. presigning).
    async fn download_url(&self, path: &str) -> Result<String>;

    /// Build the URL for an object by this backend's convention.
    ///
    /// Never touches the network; the object need not exist.
    fn object_url(&self, path: &str) -> Result<String>;
}

/// A boxed storage connection for dynamic dispatch.
pub type BoxedStorageConnection = Box<dyn StorageConnection>;
