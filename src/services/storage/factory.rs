//! Storage connection factory.
//!
//! The factory creates the appropriate storage connection based on the
//! storage configuration's type.

use anyhow::{anyhow, Result};

use super::gcs::GcsStorage;
use super::local_fs::LocalFsStorage;
use super::s3::S3Storage;
use super::traits::BoxedStorageConnection;
use super::types::{StorageConfig, StorageType};

/// Factory for creating storage connections based on configuration.
pub struct StorageFactory;

impl StorageFactory {
    /// Create a new storage connection based on the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for its storage type.
    pub fn create(config: StorageConfig) -> Result<BoxedStorageConnection> {
        config.validate().map_err(|e| anyhow!(e))?;

        let connection = match config.storage_type {
            StorageType::Gcs => GcsStorage::boxed(config),
            StorageType::S3 => S3Storage::boxed(config),
            StorageType::LocalFs => LocalFsStorage::boxed(config),
        };
        Ok(connection)
    }
}
