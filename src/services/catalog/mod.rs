//! Project, cluster and image listing over an object store.
//!
//! The store is laid out as:
//!
//! ```text
//! <project>/object_imags/<cluster>/<file>   object images, tiled
//! <project>/camera_imgs/<file>              camera images, one per base name
//! ```
//!
//! Listing failures never propagate out of the catalog. They come back as
//! [`Listing::Failed`] so callers can degrade to an empty result while still
//! seeing what went wrong.

#[cfg(test)]
pub(crate) mod memory;
mod source;

pub use source::ObjectSource;

use futures::future::try_join_all;
use std::sync::Arc;

/// Per-project directory holding one prefix per cluster.
pub const OBJECT_IMAGES_DIR: &str = "object_imags";
/// Per-project directory holding the camera images.
pub const CAMERA_IMAGES_DIR: &str = "camera_imgs";

/// Outcome of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Loaded(T),
    Failed { reason: String },
}

impl<T> Listing<T> {
    fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Listing::Loaded(value),
            Err(e) => Listing::Failed {
                reason: format!("{:#}", e),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Listing::Failed { .. })
    }

    /// The failure reason, if the listing failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Listing::Loaded(_) => None,
            Listing::Failed { reason } => Some(reason),
        }
    }
}

impl<T: Default> Listing<T> {
    /// Degrade a failed listing to the empty value.
    pub fn unwrap_or_empty(self) -> T {
        match self {
            Listing::Loaded(value) => value,
            Listing::Failed { .. } => T::default(),
        }
    }
}

/// A listed object image: where it lives and where to download it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Downloadable URL.
    pub url: String,
    /// Storage path the URL was resolved from.
    pub path: String,
}

/// One project and its clusters, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub project: String,
    pub clusters: Vec<String>,
}

/// A project whose cluster listing failed and was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFailure {
    pub project: String,
    pub reason: String,
}

/// Projects mapped to their clusters.
///
/// Only projects with at least one cluster have an entry. A project missing
/// from the index has no clusters; it is not an unknown project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIndex {
    entries: Vec<ProjectEntry>,
    failures: Vec<ProjectFailure>,
}

impl ProjectIndex {
    pub fn new(entries: Vec<ProjectEntry>) -> Self {
        Self {
            entries,
            failures: Vec::new(),
        }
    }

    /// Project ids in listing order.
    pub fn project_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.project.clone()).collect()
    }

    /// Clusters of a project; empty when the project has none.
    pub fn clusters_of(&self, project: &str) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.project == project)
            .map(|e| e.clusters.as_slice())
            .unwrap_or(&[])
    }

    pub fn failures(&self) -> &[ProjectFailure] {
        &self.failures
    }
}

/// A cluster whose image listing failed while collecting a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterFailure {
    pub cluster: String,
    pub reason: String,
}

/// All images of a project, concatenated in cluster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectImages {
    pub images: Vec<ImageRef>,
    pub failures: Vec<ClusterFailure>,
}

/// `<project>/object_imags/`
pub fn clusters_path(project: &str) -> String {
    format!("{}/{}/", project, OBJECT_IMAGES_DIR)
}

/// `<project>/object_imags/<cluster>/`
pub fn cluster_path(project: &str, cluster: &str) -> String {
    format!("{}/{}/{}/", project, OBJECT_IMAGES_DIR, cluster)
}

/// Stateless listing client over an [`ObjectSource`].
pub struct ImageCatalog<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for ImageCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: ObjectSource + ?Sized> ImageCatalog<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// List every top-level project with its clusters.
    ///
    /// Projects are walked one after another. A project whose cluster listing
    /// fails or comes back empty is logged and left out; only the root listing
    /// failing fails the whole call.
    pub async fn list_projects(&self) -> Listing<ProjectIndex> {
        let projects = match self.source.list_prefixes("").await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!("Error listing projects: {:#}", e);
                return Listing::from_result(Err(e));
            }
        };

        let mut index = ProjectIndex::default();
        for project in projects {
            tracing::info!("Project: {}", project);

            match self.source.list_prefixes(&clusters_path(&project)).await {
                Ok(clusters) if clusters.is_empty() => {
                    tracing::info!("No clusters found for project {}", project);
                }
                Ok(clusters) => {
                    for cluster in &clusters {
                        tracing::info!("Cluster: {}", cluster);
                    }
                    index.entries.push(ProjectEntry { project, clusters });
                }
                Err(e) => {
                    tracing::warn!("Error listing clusters for project {}: {:#}", project, e);
                    index.failures.push(ProjectFailure {
                        project,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        Listing::Loaded(index)
    }

    /// List the images of one cluster, each resolved to a downloadable URL.
    ///
    /// URLs are resolved concurrently; the result keeps listing order. Any
    /// failure fails the whole listing.
    pub async fn list_images(&self, project: &str, cluster: &str) -> Listing<Vec<ImageRef>> {
        let result: anyhow::Result<Vec<ImageRef>> = async {
            let paths = self
                .source
                .list_objects(&cluster_path(project, cluster))
                .await?;

            try_join_all(paths.into_iter().map(|path| async move {
                let url = self.source.resolve_url(&path).await?;
                tracing::debug!("Image URL: {}", url);
                anyhow::Ok(ImageRef { url, path })
            }))
            .await
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(
                "Error listing images for project {} and cluster {}: {:#}",
                project,
                cluster,
                e
            );
        }
        Listing::from_result(result)
    }

    /// Collect the images of every given cluster, one cluster at a time, in
    /// the order given. Failed clusters contribute no images.
    pub async fn list_project_images(&self, project: &str, clusters: &[String]) -> ProjectImages {
        let mut collected = ProjectImages::default();

        for cluster in clusters {
            match self.list_images(project, cluster).await {
                Listing::Loaded(images) => collected.images.extend(images),
                Listing::Failed { reason } => collected.failures.push(ClusterFailure {
                    cluster: cluster.clone(),
                    reason,
                }),
            }
        }

        collected
    }

    /// URL of an arbitrary path by the store's convention.
    pub async fn object_url(&self, path: &str) -> anyhow::Result<String> {
        self.source.object_url(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemorySource;
    use super::*;

    fn catalog(source: MemorySource) -> ImageCatalog<MemorySource> {
        ImageCatalog::new(Arc::new(source))
    }

    #[test]
    fn test_paths() {
        assert_eq!(clusters_path("siteA"), "siteA/object_imags/");
        assert_eq!(cluster_path("siteA", "c1"), "siteA/object_imags/c1/");
    }

    #[tokio::test]
    async fn test_list_projects_maps_clusters_in_order() {
        let source = MemorySource::new()
            .with_cluster("siteA", "c2", 1)
            .with_cluster("siteA", "c1", 2)
            .with_cluster("siteB", "north", 1);

        let Listing::Loaded(index) = catalog(source).list_projects().await else {
            panic!("listing failed");
        };

        assert_eq!(index.project_ids(), ["siteA", "siteB"]);
        assert_eq!(index.clusters_of("siteA"), ["c1", "c2"]);
        assert_eq!(index.clusters_of("siteB"), ["north"]);
        assert!(index.failures().is_empty());
    }

    #[tokio::test]
    async fn test_project_without_clusters_has_no_entry() {
        let source = MemorySource::new()
            .with_cluster("siteA", "c1", 1)
            .with_object("empty/camera_imgs/foo.jpg");

        let index = catalog(source).list_projects().await.unwrap_or_empty();

        assert_eq!(index.project_ids(), ["siteA"]);
        assert!(index.clusters_of("empty").is_empty());
    }

    #[tokio::test]
    async fn test_broken_project_does_not_block_listing() {
        let source = MemorySource::new()
            .with_cluster("broken", "c1", 1)
            .with_cluster("siteA", "c1", 1)
            .failing_on("broken/object_imags/");

        let index = catalog(source).list_projects().await.unwrap_or_empty();

        assert_eq!(index.project_ids(), ["siteA"]);
        assert_eq!(index.failures().len(), 1);
        assert_eq!(index.failures()[0].project, "broken");
    }

    #[tokio::test]
    async fn test_root_failure_fails_listing() {
        let source = MemorySource::new()
            .with_cluster("siteA", "c1", 1)
            .failing_on("");

        let listing = catalog(source).list_projects().await;

        assert!(listing.is_failed());
        assert!(listing.failure().unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn test_list_images_resolves_urls_in_order() {
        let source = MemorySource::new().with_cluster("siteA", "c1", 3);

        let Listing::Loaded(images) = catalog(source).list_images("siteA", "c1").await else {
            panic!("listing failed");
        };

        let paths: Vec<_> = images.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "siteA/object_imags/c1/object_c1_001_x1_y1.jpg",
                "siteA/object_imags/c1/object_c1_002_x1_y1.jpg",
                "siteA/object_imags/c1/object_c1_003_x1_y1.jpg",
            ]
        );
        assert!(images[0].url.contains("siteA%2Fobject_imags%2Fc1%2Fobject_c1_001_x1_y1.jpg"));
    }

    #[tokio::test]
    async fn test_list_images_failure_is_reported_not_raised() {
        let source = MemorySource::new()
            .with_cluster("siteA", "c1", 3)
            .failing_on("siteA/object_imags/c1/");

        let listing = catalog(source).list_images("siteA", "c1").await;

        assert!(listing.is_failed());
        assert!(listing.unwrap_or_empty().is_empty());
    }

    #[tokio::test]
    async fn test_list_project_images_concatenates_and_skips_failures() {
        let source = MemorySource::new()
            .with_cluster("siteA", "c1", 2)
            .with_cluster("siteA", "c2", 1)
            .with_cluster("siteA", "c3", 2)
            .failing_on("siteA/object_imags/c2/");
        let clusters = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];

        let collected = catalog(source)
            .list_project_images("siteA", &clusters)
            .await;

        assert_eq!(collected.images.len(), 4);
        assert!(collected.images[0].path.contains("/c1/"));
        assert!(collected.images[3].path.contains("/c3/"));
        assert_eq!(collected.failures.len(), 1);
        assert_eq!(collected.failures[0].cluster, "c2");
    }

    #[tokio::test]
    async fn test_catalog_over_local_filesystem() {
        use crate::services::storage::{
            LocalFsStorage, StorageConfig, StorageConnection, StorageParams, StorageType,
        };

        let dir = tempfile::tempdir().unwrap();
        let c1 = dir.path().join("siteA").join("object_imags").join("c1");
        std::fs::create_dir_all(&c1).unwrap();
        std::fs::create_dir_all(dir.path().join("siteB").join("object_imags")).unwrap();
        std::fs::write(c1.join("object_foo_x10_y20.jpg"), b"jpg").unwrap();

        let mut storage = LocalFsStorage::new(StorageConfig::new(
            "local".to_string(),
            StorageType::LocalFs,
            StorageParams::local_fs(dir.path().to_path_buf()),
        ));
        storage.connect().await.unwrap();
        let catalog = ImageCatalog::new(Arc::new(storage));

        let index = catalog.list_projects().await.unwrap_or_empty();
        assert_eq!(index.project_ids(), ["siteA"]);
        assert_eq!(index.clusters_of("siteA"), ["c1"]);

        let images = catalog.list_images("siteA", "c1").await.unwrap_or_empty();
        assert_eq!(images.len(), 1);
        assert!(images[0].url.starts_with("file://"));
        assert!(images[0].url.ends_with("object_foo_x10_y20.jpg"));
    }
}
