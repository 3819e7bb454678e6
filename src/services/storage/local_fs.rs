//! Local filesystem storage implementation using OpenDAL.
//!
//! Used for development and for browsing a mirrored bucket on disk. It uses
//! the same trait interface as cloud storage.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use opendal::layers::LoggingLayer;
use opendal::services::Fs;
use opendal::Operator;
use std::path::PathBuf;
use tokio::sync::RwLock;
use url::Url;

use super::listing::list_children;
use super::traits::StorageConnection;
use super::types::{normalize_path, ObjectInfo, StorageConfig, StorageParams, StorageType};

/// Local filesystem storage connection implementation.
pub struct LocalFsStorage {
    config: StorageConfig,
    operator: RwLock<Option<Operator>>,
}

impl LocalFsStorage {
    /// Create a new local filesystem storage connection.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            operator: RwLock::new(None),
        }
    }

    /// Create a boxed local filesystem storage connection.
    pub fn boxed(config: StorageConfig) -> Box<dyn StorageConnection> {
        Box::new(Self::new(config))
    }

    /// Get the root path from config.
    fn get_root_path(&self) -> Result<&PathBuf> {
        match &self.config.params {
            StorageParams::LocalFs { root_path } => Ok(root_path),
            _ => Err(anyhow!("Invalid storage params for LocalFs")),
        }
    }

    /// Build the OpenDAL operator.
    fn build_operator(&self) -> Result<Operator> {
        let root_path = self.get_root_path()?;

        let builder = Fs::default().root(
            root_path
                .to_str()
                .ok_or_else(|| anyhow!("Invalid path encoding"))?,
        );

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
impl StorageConnection for LocalFsStorage {
    fn storage_type(&self) -> StorageType {
        StorageType::LocalFs
    }

    async fn connect(&mut self) -> Result<()> {
        let op = self.build_operator()?;

        // Verify the root path exists
        op.check().await.map_err(|e| {
            anyhow!(
                "Failed to access filesystem path: {}. Check that the path exists and is accessible.",
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
        // Local files have no presigning; make sure the object is there.
        op.stat(normalize_path(path)).await?;
        self.object_url(path)
    }

    fn object_url(&self, path: &str) -> Result<String> {
        let full_path = self.get_root_path()?.join(normalize_path(path));
        Url::from_file_path(&full_path)
            .map(|url| url.to_string())
            .map_err(|_| anyhow!("Not an absolute path: {}", full_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_at(root: &std::path::Path) -> LocalFsStorage {
        LocalFsStorage::new(StorageConfig::new(
            "test".to_string(),
            StorageType::LocalFs,
            StorageParams::local_fs(root.to_path_buf()),
        ))
    }

    #[test]
    fn test_object_url() {
        let storage = storage_at(std::path::Path::new("/home/user/data"));

        assert_eq!(
            storage.object_url("/subdir/file.jpg").unwrap(),
            "file:///home/user/data/subdir/file.jpg"
        );
    }

    #[tokio::test]
    async fn test_list_children_of_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let clusters = dir.path().join("siteA").join("object_imags");
        std::fs::create_dir_all(clusters.join("c2")).unwrap();
        std::fs::create_dir_all(clusters.join("c1")).unwrap();
        std::fs::write(clusters.join("c1").join("object_a_x1_y2.jpg"), b"jpg").unwrap();

        let mut storage = storage_at(dir.path());
        storage.connect().await.unwrap();

        let entries = storage.list("siteA/object_imags/").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["c1", "c2"]);
        assert!(entries.iter().all(|e| e.is_dir));

        let files = storage.list("/siteA/object_imags/c1/").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "siteA/object_imags/c1/object_a_x1_y2.jpg");
        assert!(!files[0].is_dir);
    }

    #[tokio::test]
    async fn test_list_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let clusters = dir.path().join("siteA").join("object_imags");
        for cluster in ["a", "B", "c"] {
            std::fs::create_dir_all(clusters.join(cluster)).unwrap();
        }

        let mut storage = storage_at(dir.path());
        storage.connect().await.unwrap();

        let entries = storage.list("siteA/object_imags/").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["B", "a", "c"]);
    }

    #[tokio::test]
    async fn test_download_url_of_existing_and_missing_objects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("p")).unwrap();
        std::fs::write(dir.path().join("p").join("a.jpg"), b"jpg").unwrap();

        let mut storage = storage_at(dir.path());
        storage.connect().await.unwrap();

        let url = storage.download_url("p/a.jpg").await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/p/a.jpg"));

        assert!(storage.download_url("p/missing.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_list_requires_connection() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        assert!(storage.list("").await.is_err());
    }
}
