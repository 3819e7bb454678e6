//! Selection actions.
//!
//! [`ImageSearch`] runs the transitions of [`SelectionState`] against an
//! [`ImageCatalog`]. The state lock is never held across a catalog call, so
//! actions can overlap; stale results are dropped by the state's tickets.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::services::catalog::{ImageCatalog, Listing, ObjectSource};

use super::selection::{
    FetchRequest, FetchResult, FetchTicket, ModalTarget, SelectionError, SelectionState,
};

/// Cloneable handle driving one shared selection.
pub struct ImageSearch<S: ?Sized> {
    catalog: ImageCatalog<S>,
    state: Arc<RwLock<SelectionState>>,
}

impl<S: ?Sized> Clone for ImageSearch<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: ObjectSource + ?Sized> ImageSearch<S> {
    pub fn new(catalog: ImageCatalog<S>) -> Self {
        Self {
            catalog,
            state: Arc::new(RwLock::new(SelectionState::new())),
        }
    }

    /// Read access to the current state.
    pub async fn state(&self) -> RwLockReadGuard<'_, SelectionState> {
        self.state.read().await
    }

    /// Refresh the project list.
    pub async fn load_projects(&self) -> bool {
        let ticket = self.state.write().await.begin_load_projects();
        self.run(ticket).await
    }

    /// Select a project, or clear the selection with `None`.
    ///
    /// Returns false if a newer selection superseded this one before its
    /// images arrived.
    pub async fn select_project(&self, project: Option<String>) -> bool {
        let ticket = self.state.write().await.begin_select_project(project);
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => true,
        }
    }

    /// Select a cluster of the current project, or go back to all of the
    /// project's clusters with `None`.
    pub async fn select_cluster(&self, cluster: Option<String>) -> Result<bool, SelectionError> {
        let ticket = self.state.write().await.begin_select_cluster(cluster)?;
        match ticket {
            Some(ticket) => Ok(self.run(ticket).await),
            None => Ok(true),
        }
    }

    pub async fn go_to_page(&self, page: usize) -> Result<(), SelectionError> {
        self.state.write().await.go_to_page(page)
    }

    pub async fn next_page(&self) -> Result<(), SelectionError> {
        self.state.write().await.next_page()
    }

    pub async fn previous_page(&self) -> Result<(), SelectionError> {
        self.state.write().await.previous_page()
    }

    /// Open the detail view for an object image URL.
    pub async fn open_modal(&self, object_url: &str) -> Result<ModalTarget, SelectionError> {
        let pending = self.state.read().await.prepare_modal(object_url)?;

        let camera_url = self
            .catalog
            .object_url(pending.camera_path())
            .await
            .map_err(|e| SelectionError::CameraUrl(format!("{:#}", e)))?;

        let mut state = self.state.write().await;
        state.show_modal(pending, camera_url).cloned()
    }

    /// Open the detail view for the `index`-th image of the current page.
    pub async fn open_modal_at(&self, index: usize) -> Result<ModalTarget, SelectionError> {
        let url = self.state.read().await.displayed_image(index)?.url.clone();
        self.open_modal(&url).await
    }

    pub async fn close_modal(&self) {
        self.state.write().await.close_modal();
    }

    async fn run(&self, ticket: FetchTicket) -> bool {
        let result = self.fetch(ticket.request()).await;
        self.state.write().await.apply(ticket, result)
    }

    async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        match request {
            FetchRequest::Projects => FetchResult::Projects(self.catalog.list_projects().await),
            FetchRequest::ProjectImages { project } => {
                let index = self.catalog.list_projects().await;
                let clusters = match &index {
                    Listing::Loaded(index) => index.clusters_of(project).to_vec(),
                    Listing::Failed { .. } => Vec::new(),
                };
                tracing::info!("Clusters for project {}: {:?}", project, clusters);

                let images = self.catalog.list_project_images(project, &clusters).await;
                FetchResult::ProjectImages { index, images }
            }
            FetchRequest::ClusterImages { project, cluster } => {
                FetchResult::ClusterImages(self.catalog.list_images(project, cluster).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::memory::MemorySource;
    use crate::state::selection::Phase;

    fn search(source: MemorySource) -> (Arc<MemorySource>, ImageSearch<MemorySource>) {
        let source = Arc::new(source);
        let search = ImageSearch::new(ImageCatalog::new(Arc::clone(&source)));
        (source, search)
    }

    fn site_a() -> MemorySource {
        MemorySource::new()
            .with_cluster("siteA", "c1", 6)
            .with_cluster("siteA", "c2", 7)
            .with_cluster("siteB", "north", 2)
    }

    #[tokio::test]
    async fn test_load_projects() {
        let (_, search) = search(site_a().with_object("bare/camera_imgs/x.jpg"));

        assert!(search.load_projects().await);
        assert_eq!(search.state().await.projects(), ["siteA", "siteB"]);
    }

    #[tokio::test]
    async fn test_select_project_pages_through_all_clusters() {
        let (_, search) = search(site_a());

        assert!(search.select_project(Some("siteA".to_string())).await);
        {
            let state = search.state().await;
            assert_eq!(state.phase(), Phase::ProjectSelected);
            assert_eq!(state.clusters(), ["c1", "c2"]);
            assert_eq!(state.images().len(), 13);
            assert_eq!(state.displayed_images().len(), 10);
            assert!(state.displayed_images()[0].path.contains("/c1/object_c1_001"));
            assert!(state.has_next());
        }

        search.next_page().await.unwrap();
        let state = search.state().await;
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.displayed_images().len(), 3);
        assert!(state.displayed_images()[2].path.contains("/c2/object_c2_007"));
        assert!(!state.has_next());
    }

    #[tokio::test]
    async fn test_cluster_round_trip_restores_project_images() {
        let (_, search) = search(site_a());
        search.select_project(Some("siteA".to_string())).await;
        let all = search.state().await.images().to_vec();

        assert!(search.select_cluster(Some("c2".to_string())).await.unwrap());
        assert_eq!(search.state().await.images().len(), 7);

        assert!(search.select_cluster(None).await.unwrap());
        let state = search.state().await;
        assert_eq!(state.phase(), Phase::ProjectSelected);
        assert_eq!(state.images(), all.as_slice());
    }

    #[tokio::test]
    async fn test_project_with_no_clusters() {
        let (_, search) = search(site_a().with_object("bare/camera_imgs/x.jpg"));

        assert!(search.select_project(Some("bare".to_string())).await);
        let state = search.state().await;
        assert!(state.clusters().is_empty());
        assert!(state.images().is_empty());
        assert!(state.last_failure().is_none());
    }

    #[tokio::test]
    async fn test_failed_cluster_listing_degrades_to_empty() {
        let (_, search) = search(site_a().failing_on("siteA/object_imags/c1/"));
        search.select_project(Some("siteA".to_string())).await;

        assert_eq!(search.state().await.images().len(), 7);

        search.select_cluster(Some("c1".to_string())).await.unwrap();
        let state = search.state().await;
        assert!(state.images().is_empty());
        assert!(state.last_failure().unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn test_select_cluster_without_project_is_rejected() {
        let (_, search) = search(site_a());

        assert_eq!(
            search.select_cluster(Some("c1".to_string())).await,
            Err(SelectionError::NoProjectSelected)
        );
    }

    #[tokio::test]
    async fn test_slow_cluster_fetch_cannot_clobber_newer_selection() {
        let (source, search) = search(site_a());
        search.select_project(Some("siteA".to_string())).await;

        let release = source.hold("siteA/object_imags/c1/");
        let slow = tokio::spawn({
            let search = search.clone();
            async move { search.select_cluster(Some("c1".to_string())).await }
        });
        while search.state().await.selected_cluster() != Some("c1") {
            tokio::task::yield_now().await;
        }

        assert!(search.select_cluster(Some("c2".to_string())).await.unwrap());
        release.notify_one();

        assert!(!slow.await.unwrap().unwrap());
        let state = search.state().await;
        assert_eq!(state.selected_cluster(), Some("c2"));
        assert_eq!(state.images().len(), 7);
        assert!(state.images().iter().all(|i| i.path.contains("/c2/")));
    }

    #[tokio::test]
    async fn test_open_modal_builds_camera_url() {
        let (_, search) = search(site_a());
        search.select_project(Some("siteA".to_string())).await;

        let modal = search.open_modal_at(0).await.unwrap();
        assert!(modal.is_paired());
        assert_eq!(modal.base_name.as_str(), "c1_001.jpg");
        assert_eq!(modal.camera_path, "siteA/camera_imgs/c1_001.jpg");
        assert_eq!(
            modal.camera_url,
            "https://store.test/v0/b/bucket/o/siteA%2Fcamera_imgs%2Fc1_001.jpg?alt=media"
        );
        assert_eq!(search.state().await.modal(), Some(&modal));

        search.close_modal().await;
        assert!(search.state().await.modal().is_none());
    }

    #[tokio::test]
    async fn test_every_displayed_image_opens_a_paired_modal() {
        let (_, search) = search(site_a());
        search.select_project(Some("siteA".to_string())).await;
        search.go_to_page(2).await.unwrap();

        for index in 0..3 {
            let modal = search.open_modal_at(index).await.unwrap();
            assert!(!modal.base_name.as_str().is_empty());
            assert_eq!(
                modal.camera_path,
                format!("siteA/camera_imgs/{}", modal.base_name)
            );
        }
        assert_eq!(
            search.open_modal_at(3).await,
            Err(SelectionError::NoImageAtIndex(3))
        );
    }
}
