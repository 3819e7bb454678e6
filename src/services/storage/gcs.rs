//! Google Cloud Storage implementation using OpenDAL.
//!
//! Download URLs follow the Firebase Storage media convention, so buckets
//! created through Firebase can be browsed without signing.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use opendal::layers::LoggingLayer;
use opendal::services::Gcs;
use opendal::Operator;
use tokio::sync::RwLock;
use url::Url;

use super::listing::list_children;
use super::traits::StorageConnection;
use super::types::{normalize_path, ObjectInfo, StorageConfig, StorageParams, StorageType};

const MEDIA_ENDPOINT: &str = "https://firebasestorage.googleapis.com/v0/b/";

/// Google Cloud Storage connection implementation.
pub struct GcsStorage {
    config: StorageConfig,
    operator: RwLock<Option<Operator>>,
}

impl GcsStorage {
    /// Create a new GCS storage connection.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            operator: RwLock::new(None),
        }
    }

    /// Create a boxed GCS storage connection.
    pub fn boxed(config: StorageConfig) -> Box<dyn StorageConnection> {
        Box::new(Self::new(config))
    }

    /// Get GCS params from config.
    fn get_gcs_params(&self) -> Result<(&str, Option<&std::path::Path>)> {
        match &self.config.params {
            StorageParams::Gcs {
                bucket,
                credentials_path,
                ..
            } => Ok((bucket.as_str(), credentials_path.as_deref())),
            _ => Err(anyhow!("Invalid storage params for GCS")),
        }
    }

    /// Build the OpenDAL operator.
    fn build_operator(&self) -> Result<Operator> {
        let (bucket, credentials_path) = self.get_gcs_params()?;

        let mut builder = Gcs::default().bucket(bucket);

        if let Some(creds_path) = credentials_path {
            let creds_path_str = creds_path
                .to_str()
                .ok_or_else(|| anyhow!("Invalid credentials path"))?;
            builder = builder.credential_path(creds_path_str);
        }

        let op = Operator::new(builder)?
            .layer(LoggingLayer::default())
            .finish();

        Ok(op)
    }

    /// Get the operator, returning an error if not connected.
    async fn get_operator(&self) -> Result<Operator> {
        let guard = self.operator.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow!("Storage not connected"))
    }

    /// Build a Firebase-style media URL; the object path is a single
    /// percent-encoded segment, so `/` becomes `%2F`.
    fn media_url(bucket: &str, path: &str) -> Result<String> {
        let mut url = Url::parse(MEDIA_ENDPOINT)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Media endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(bucket)
            .push("o")
            .push(normalize_path(path));
        url.set_query(Some("alt=media"));
        Ok(url.to_string())
    }
}

#[async_trait]
impl StorageConnection for GcsStorage {
    fn storage_type(&self) -> StorageType {
        StorageType::Gcs
    }

    async fn connect(&mut self) -> Result<()> {
        let op = self.build_operator()?;

        op.check().await.map_err(|e| {
            anyhow!(
                "Failed to connect to GCS: {}. Check your credentials and bucket name.",
                e
            )
        })?;

        let mut guard = self.operator.write().await;
        *guard = Some(op);

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut guard = self.operator.write().await;
        *guard = None;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        let guard = self.operator.read().await;
        guard.is_some()
    }

    async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        let op = self.get_operator().await?;
        list_children(&op, path).await
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        // Media URLs need no signing, only a live connection to have listed the object.
        self.get_operator().await?;
        self.object_url(path)
    }

    fn object_url(&self, path: &str) -> Result<String> {
        let (bucket, _) = self.get_gcs_params()?;
        Self::media_url(bucket, path)
    }
}
