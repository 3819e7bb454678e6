//! Storage types and configuration.
//!
//! This module defines the backend types, connection configuration and the
//! object metadata returned by listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Default lifetime of a presigned S3 download URL.
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

fn default_presign_expiry() -> u64 {
    DEFAULT_PRESIGN_EXPIRY_SECS
}

/// Supported storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Google Cloud Storage (including Firebase Storage buckets)
    Gcs,
    /// Amazon S3 and S3-compatible services (MinIO, R2, DigitalOcean Spaces)
    S3,
    /// Local filesystem
    LocalFs,
}

impl StorageType {
    /// Get the display name for this storage type.
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageType::Gcs => "Google Cloud Storage",
            StorageType::S3 => "Amazon S3",
            StorageType::LocalFs => "Local Filesystem",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for a storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Unique identifier for this connection.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// User-friendly name for the connection.
    pub name: String,
    /// The type of storage backend.
    pub storage_type: StorageType,
    /// Storage-specific parameters.
    pub params: StorageParams,
}

impl StorageConfig {
    /// Create a new storage configuration.
    pub fn new(name: String, storage_type: StorageType, params: StorageParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            storage_type,
            params,
        }
    }

    /// Validate the configuration for the given storage type.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.storage_type, &self.params) {
            (StorageType::Gcs, StorageParams::Gcs { bucket, .. }) => {
                if bucket.is_empty() {
                    return Err("GCS bucket name is required".to_string());
                }
                Ok(())
            }
            (StorageType::S3, StorageParams::S3 { bucket, .. }) => {
                if bucket.is_empty() {
                    return Err("S3 bucket name is required".to_string());
                }
                Ok(())
            }
            (StorageType::LocalFs, StorageParams::LocalFs { root_path }) => {
                if root_path.as_os_str().is_empty() {
                    return Err("Local filesystem root path is required".to_string());
                }
                Ok(())
            }
            _ => Err(format!(
                "Parameter type mismatch: {} params for {:?} storage",
                self.params.param_type(),
                self.storage_type
            )),
        }
    }
}

/// Storage-specific connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageParams {
    /// Google Cloud Storage parameters.
    Gcs {
        /// GCS bucket name (for Firebase projects, `<project>.appspot.com`)
        bucket: String,
        /// Service account credentials JSON path
        #[serde(default)]
        credentials_path: Option<PathBuf>,
        /// Project ID
        #[serde(default)]
        project_id: Option<String>,
    },
    /// S3 and S3-compatible storage parameters.
    S3 {
        /// S3 endpoint URL (leave empty for AWS, set for MinIO/R2/etc.)
        #[serde(default)]
        endpoint: Option<String>,
        /// AWS region (e.g., "us-east-1")
        region: String,
        /// Bucket name
        bucket: String,
        /// Access key ID
        #[serde(default)]
        access_key_id: Option<String>,
        /// Secret access key
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Use path-style addressing (required for MinIO)
        #[serde(default)]
        path_style: bool,
        /// Allow unsigned/anonymous requests for public buckets
        #[serde(default)]
        allow_anonymous: bool,
        /// Lifetime of presigned download URLs
        #[serde(default = "default_presign_expiry")]
        presign_expiry_secs: u64,
    },
    /// Local filesystem parameters.
    LocalFs {
        /// Root directory path
        root_path: PathBuf,
    },
}

impl StorageParams {
    /// Create GCS parameters.
    pub fn gcs(bucket: String, credentials_path: Option<PathBuf>) -> Self {
        StorageParams::Gcs {
            bucket,
            credentials_path,
            project_id: None,
        }
    }

    /// Create S3 parameters.
    pub fn s3(
        endpoint: Option<String>,
        region: String,
        bucket: String,
        access_key_id: Option<String>,
        path_style: bool,
    ) -> Self {
        StorageParams::S3 {
            endpoint,
            region,
            bucket,
            access_key_id,
            secret_access_key: None,
            path_style,
            allow_anonymous: false,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
        }
    }

    /// Create local filesystem parameters.
    pub fn local_fs(root_path: PathBuf) -> Self {
        StorageParams::LocalFs { root_path }
    }

    /// Get the parameter type name.
    pub fn param_type(&self) -> &'static str {
        match self {
            StorageParams::Gcs { .. } => "gcs",
            StorageParams::S3 { .. } => "s3",
            StorageParams::LocalFs { .. } => "local_fs",
        }
    }
}

/// Information about an object (file or prefix) in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full path to the object (relative to the bucket root).
    pub path: String,
    /// Object name (filename or prefix name, without trailing slash).
    pub name: String,
    /// Whether this is a directory (prefix in S3/GCS terms).
    pub is_dir: bool,
    /// Size in bytes (None for directories).
    pub size: Option<u64>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectInfo {
    /// Create a new file object info.
    pub fn file(path: String, size: u64, last_modified: Option<DateTime<Utc>>) -> Self {
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            is_dir: false,
            size: Some(size),
            last_modified,
        }
    }

    /// Create a new directory object info.
    pub fn directory(path: String) -> Self {
        let name = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&path)
            .to_string();
        Self {
            path,
            name,
            is_dir: true,
            size: None,
            last_modified: None,
        }
    }

    /// Convert an OpenDAL listing entry.
    pub(crate) fn from_entry(path: String, metadata: &opendal::Metadata) -> Self {
        if metadata.mode() == opendal::EntryMode::DIR {
            return Self::directory(path);
        }
        let last_modified = metadata
            .last_modified()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.timestamp(), 0));
        Self::file(path, metadata.content_length(), last_modified)
    }
}

/// Normalize a storage path for OpenDAL (no leading slash, root is empty).
pub(crate) fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Sort listing entries in key order (byte-wise by path), as GCS and S3 list them.
pub(crate) fn sort_entries(objects: &mut [ObjectInfo]) {
    objects.sort_by(|a, b| a.path.cmp(&b.path));
}
