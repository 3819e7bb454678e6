//! Blob storage backend implementations.
//!
//! This module provides a unified, read-only interface over the object stores
//! the image browser can sit on, using Apache OpenDAL.
//!
//! Supported storage backends:
//!
//! - **Google Cloud Storage (GCS)**, including Firebase Storage buckets
//! - **Amazon S3** and S3-compatible services (MinIO, Cloudflare R2)
//! - **Local Filesystem** for development and mirrored buckets
//!
//! # Layout
//!
//! ```text
//!   ImageCatalog ──(ObjectSource)──► StorageManager
//!                                         │ active connection
//!                                         ▼
//!                                   StorageFactory::create(config)
//!                                         │
//!                  ┌──────────────────────┼──────────────────────┐
//!                  ▼                      ▼                      ▼
//!             GcsStorage              S3Storage            LocalFsStorage
//!         media URLs (%2F)        presigned GETs            file:// URLs
//! ```
//!
//! Every backend lists through `list_children` so entries come back in the same
//! order whatever the store.

mod factory;
mod gcs;
mod listing;
mod local_fs;
mod manager;
mod s3;
mod traits;
mod types;

pub use factory::StorageFactory;
pub use manager::{StorageConnectionStatus, StorageManager};
pub use traits::{BoxedStorageConnection, StorageConnection};
pub use types::{
    ObjectInfo, StorageConfig, StorageParams, StorageType, DEFAULT_PRESIGN_EXPIRY_SECS,
};

pub use gcs::GcsStorage;
pub use local_fs::LocalFsStorage;
pub use s3::S3Storage;
