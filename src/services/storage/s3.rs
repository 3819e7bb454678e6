//! S3 storage implementation using OpenDAL.
//!
//! This module provides S3 and S3-compatible storage support including:
//! - Amazon S3
//! - MinIO
//! - Cloudflare R2
//! - Any S3-compatible service
//!
//! Download URLs are presigned GET requests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use opendal::layers::LoggingLayer;
use opendal::services::S3;
use opendal::Operator;
use std::time::Duration;
use tokio::sync::RwLock;

use super::listing::list_children;
use super::traits::StorageConnection;
use super::types::{normalize_path, ObjectInfo, StorageConfig, StorageParams, StorageType};

/// S3 storage connection implementation.
pub struct S3Storage {
    config: StorageConfig,
    operator: RwLock<Option<Operator>>,
}

struct S3Params<'a> {
    endpoint: Option<&'a str>,
    region: &'a str,
    bucket: &'a str,
    access_key_id: Option<&'a str>,
    secret_access_key: Option<&'a str>,
    path_style: bool,
    allow_anonymous: bool,
    presign_expiry_secs: u64,
}

impl S3Storage {
    /// Create a new S3 storage connection.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            operator: RwLock::new(None),
        }
    }

    /// Create a boxed S3 storage connection.
    pub fn boxed(config: StorageConfig) -> Box<dyn StorageConnection> {
        Box::new(Self::new(config))
    }

    /// Get S3 params from config.
    fn get_s3_params(&self) -> Result<S3Params<'_>> {
        match &self.config.params {
            StorageParams::S3 {
                endpoint,
                region,
                bucket,
                access_key_id,
                secret_access_key,
                path_style,
                allow_anonymous,
                presign_expiry_secs,
            } => Ok(S3Params {
                endpoint: endpoint.as_deref().filter(|ep| !ep.is_empty()),
                region: region.as_str(),
                bucket: bucket.as_str(),
                access_key_id: access_key_id.as_deref(),
                secret_access_key: secret_access_key.as_deref(),
                path_style: *path_style,
                allow_anonymous: *allow_anonymous,
                presign_expiry_secs: *presign_expiry_secs,
            }),
            _ => Err(anyhow!("Invalid storage params for S3")),
        }
    }

    /// Build the OpenDAL operator.
    fn build_operator(&self) -> Result<Operator> {
        let params = self.get_s3_params()?;

        let mut builder = S3::default().bucket(params.bucket).region(params.region);

        // Custom endpoint for S3-compatible services
        if let Some(ep) = params.endpoint {
            builder = builder.endpoint(ep);
        }

        if params.allow_anonymous {
            builder = builder.allow_anonymous();
        } else {
            if let Some(key_id) = params.access_key_id {
                builder = builder.access_key_id(key_id);
            }
            if let Some(secret) = params.secret_access_key {
                builder = builder.secret_access_key(secret);
            }
        }

        if !params.path_style {
            builder = builder.enable_virtual_host_style();
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
}

#[async_trait]
impl StorageConnection for S3Storage {
    fn storage_type(&self) -> StorageType {
        StorageType::S3
    }

    async fn connect(&mut self) -> Result<()> {
        let op = self.build_operator()?;

        op.check().await.map_err(|e| {
            anyhow!(
                "Failed to connect to S3: {}. Check your credentials and bucket name.",
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
        let op = self.get_operator().await?;
        let expiry = Duration::from_secs(self.get_s3_params()?.presign_expiry_secs);

        let request = op.presign_read(normalize_path(path), expiry).await?;
        Ok(request.uri().to_string())
    }

    fn object_url(&self, path: &str) -> Result<String> {
        let params = self.get_s3_params()?;
        let path = normalize_path(path);

        let url = match params.endpoint {
            Some(ep) if params.path_style => {
                format!("{}/{}/{}", ep.trim_end_matches('/'), params.bucket, path)
            }
            Some(ep) => {
                let (scheme, host) = ep.split_once("://").unwrap_or(("https", ep));
                format!(
                    "{}://{}.{}/{}",
                    scheme,
                    params.bucket,
                    host.trim_end_matches('/'),
                    path
                )
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                params.bucket, params.region, path
            ),
        };
        Ok(url)
    }
}
