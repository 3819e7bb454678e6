//! Project/cluster selection, paging and the detail view.
//!
//! [`SelectionState`] only changes through its transitions. A transition that
//! needs data hands out a [`FetchTicket`]; the fetched data is applied with
//! [`SelectionState::apply`], which drops it when the selection has moved on
//! since the ticket was issued.

use std::ops::Range;

use crate::naming::{camera_path, derive_base_name, display_name, BaseName};
use crate::services::catalog::{ImageRef, Listing, ProjectImages, ProjectIndex};

/// Images per page.
pub const PAGE_SIZE: usize = 10;

/// Where the selection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ProjectSelected,
    ClusterSelected,
}

/// Rejected selection or navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    NoProjectSelected,
    UnknownCluster(String),
    PageOutOfRange { requested: usize, total: usize },
    NoImageAtIndex(usize),
    EmptyBaseName(String),
    CameraUrl(String),
    /// The project changed while the detail view was being prepared.
    ProjectChanged,
    /// The cluster or image list changed while the detail view was being prepared.
    SelectionChanged,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::NoProjectSelected => write!(f, "no project selected"),
            SelectionError::UnknownCluster(cluster) => {
                write!(f, "cluster {} is not in the selected project", cluster)
            }
            SelectionError::PageOutOfRange { requested, total } => {
                write!(f, "page {} is out of range (1..={})", requested, (*total).max(1))
            }
            SelectionError::NoImageAtIndex(index) => {
                write!(f, "no image at index {} on this page", index)
            }
            SelectionError::EmptyBaseName(url) => {
                write!(f, "cannot derive a camera image name from {}", url)
            }
            SelectionError::CameraUrl(reason) => {
                write!(f, "cannot build camera image URL: {}", reason)
            }
            SelectionError::ProjectChanged => write!(f, "project changed"),
            SelectionError::SelectionChanged => write!(f, "selection changed"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// What a ticket asks the catalog for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// The project index alone.
    Projects,
    /// The project index, then every image of the project's clusters.
    ProjectImages { project: String },
    /// The images of one cluster.
    ClusterImages { project: String, cluster: String },
}

/// Data returned for a [`FetchRequest`].
#[derive(Debug, Clone)]
pub enum FetchResult {
    Projects(Listing<ProjectIndex>),
    ProjectImages {
        index: Listing<ProjectIndex>,
        images: ProjectImages,
    },
    ClusterImages(Listing<Vec<ImageRef>>),
}

/// Proof of which selection a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    selection: u64,
    index: u64,
    request: FetchRequest,
}

impl FetchTicket {
    pub fn request(&self) -> &FetchRequest {
        &self.request
    }
}

/// Detail view pairing an object image with its camera image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalTarget {
    pub object_url: String,
    pub display_name: String,
    pub base_name: BaseName,
    pub camera_path: String,
    pub camera_url: String,
}

impl ModalTarget {
    /// Whether the camera image was derived from a tiled object filename.
    pub fn is_paired(&self) -> bool {
        self.base_name.is_paired()
    }
}

/// A detail view waiting for its camera URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingModal {
    selection: u64,
    project: String,
    object_url: String,
    display_name: String,
    base_name: BaseName,
    camera_path: String,
}

impl PendingModal {
    pub fn camera_path(&self) -> &str {
        &self.camera_path
    }
}

/// Index range of page `page` (1-based) over `len` items.
pub fn page_window(len: usize, page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE).min(len);
    let end = (start + PAGE_SIZE).min(len);
    start..end
}

/// Number of pages needed for `len` items.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// The user-visible selection.
#[derive(Debug)]
pub struct SelectionState {
    projects: Vec<String>,
    selected_project: Option<String>,
    clusters: Vec<String>,
    selected_cluster: Option<String>,
    images: Vec<ImageRef>,
    current_page: usize,
    modal: Option<ModalTarget>,
    loading: bool,
    last_failure: Option<String>,
    selection_generation: u64,
    index_generation: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            selected_project: None,
            clusters: Vec::new(),
            selected_cluster: None,
            images: Vec::new(),
            current_page: 1,
            modal: None,
            loading: false,
            last_failure: None,
            selection_generation: 0,
            index_generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.selected_project, &self.selected_cluster) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::ProjectSelected,
            (Some(_), Some(_)) => Phase::ClusterSelected,
        }
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn selected_project(&self) -> Option<&str> {
        self.selected_project.as_deref()
    }

    pub fn clusters(&self) -> &[String] {
        &self.clusters
    }

    pub fn selected_cluster(&self) -> Option<&str> {
        self.selected_cluster.as_deref()
    }

    /// Every image of the current selection.
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.images.len())
    }

    /// The slice of images on the current page.
    pub fn displayed_images(&self) -> &[ImageRef] {
        &self.images[page_window(self.images.len(), self.current_page)]
    }

    pub fn displayed_image(&self, index: usize) -> Result<&ImageRef, SelectionError> {
        self.displayed_images()
            .get(index)
            .ok_or(SelectionError::NoImageAtIndex(index))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page * PAGE_SIZE < self.images.len()
    }

    pub fn modal(&self) -> Option<&ModalTarget> {
        self.modal.as_ref()
    }

    /// Whether a fetch for the current selection is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Reason of the most recent listing failure for the current selection.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    // Transitions

    /// Start refreshing the project list.
    pub fn begin_load_projects(&mut self) -> FetchTicket {
        self.index_generation += 1;
        self.ticket(FetchRequest::Projects)
    }

    /// Select a project (or clear it with `None`).
    ///
    /// Clears the cluster selection, the image list and the detail view.
    /// Returns the ticket for the project's clusters and images.
    pub fn begin_select_project(&mut self, project: Option<String>) -> Option<FetchTicket> {
        let project = project.filter(|p| !p.is_empty());
        self.reset_selection();
        self.selected_project = project.clone();
        self.selected_cluster = None;
        self.clusters.clear();

        let project = project?;
        self.index_generation += 1;
        self.loading = true;
        Some(self.ticket(FetchRequest::ProjectImages { project }))
    }

    /// Select a cluster of the current project (or clear it with `None`).
    ///
    /// Clearing the cluster while a project is selected re-derives the full
    /// project image list from a fresh project index.
    pub fn begin_select_cluster(
        &mut self,
        cluster: Option<String>,
    ) -> Result<Option<FetchTicket>, SelectionError> {
        let cluster = cluster.filter(|c| !c.is_empty());

        let request = match (cluster, self.selected_project.clone()) {
            (Some(_), None) => return Err(SelectionError::NoProjectSelected),
            (Some(cluster), Some(project)) => {
                if !self.clusters.contains(&cluster) {
                    return Err(SelectionError::UnknownCluster(cluster));
                }
                Some(FetchRequest::ClusterImages { project, cluster })
            }
            (None, Some(project)) => Some(FetchRequest::ProjectImages { project }),
            (None, None) => None,
        };

        self.reset_selection();
        self.selected_cluster = match &request {
            Some(FetchRequest::ClusterImages { cluster, .. }) => Some(cluster.clone()),
            _ => None,
        };

        let Some(request) = request else {
            return Ok(None);
        };
        if matches!(request, FetchRequest::ProjectImages { .. }) {
            self.index_generation += 1;
        }
        self.loading = true;
        Ok(Some(self.ticket(request)))
    }

    /// Apply fetched data. Returns false when the ticket is stale and the data
    /// was dropped.
    pub fn apply(&mut self, ticket: FetchTicket, result: FetchResult) -> bool {
        match (ticket.request, result) {
            (FetchRequest::Projects, FetchResult::Projects(listing)) => {
                if ticket.index != self.index_generation {
                    tracing::debug!("Dropping stale project list");
                    return false;
                }
                self.apply_index(&listing);
                true
            }
            (FetchRequest::ProjectImages { project }, FetchResult::ProjectImages { index, images }) => {
                if ticket.index == self.index_generation {
                    self.publish_projects(&index);
                }
                if ticket.selection != self.selection_generation {
                    tracing::debug!("Dropping stale images for project {}", project);
                    return false;
                }

                self.last_failure = project_failure(&project, &index, &images);
                self.clusters = match &index {
                    Listing::Loaded(index) => index.clusters_of(&project).to_vec(),
                    Listing::Failed { .. } => Vec::new(),
                };
                tracing::info!(
                    "Project {}: {} clusters, {} images",
                    project,
                    self.clusters.len(),
                    images.images.len()
                );
                self.set_images(images.images);
                true
            }
            (FetchRequest::ClusterImages { project, cluster }, FetchResult::ClusterImages(listing)) => {
                if ticket.selection != self.selection_generation {
                    tracing::debug!(
                        "Dropping stale images for project {} and cluster {}",
                        project,
                        cluster
                    );
                    return false;
                }

                self.last_failure = listing.failure().map(str::to_string);
                self.set_images(listing.unwrap_or_empty());
                true
            }
            (request, _) => {
                tracing::warn!("Fetch result does not match request {:?}", request);
                false
            }
        }
    }

    /// Show page `page`. Out-of-range pages are rejected and leave the state
    /// unchanged; an empty list only has page 1.
    pub fn go_to_page(&mut self, page: usize) -> Result<(), SelectionError> {
        let total = self.total_pages();
        if page == 0 || page > total.max(1) {
            return Err(SelectionError::PageOutOfRange {
                requested: page,
                total,
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), SelectionError> {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), SelectionError> {
        self.go_to_page(self.current_page - 1)
    }

    /// Derive the detail view of an object image, short of its camera URL.
    pub fn prepare_modal(&self, object_url: &str) -> Result<PendingModal, SelectionError> {
        let project = self
            .selected_project
            .clone()
            .ok_or(SelectionError::NoProjectSelected)?;

        let base_name = derive_base_name(object_url);
        if base_name.as_str().is_empty() {
            return Err(SelectionError::EmptyBaseName(object_url.to_string()));
        }
        if !base_name.is_paired() {
            tracing::warn!("No tiling suffix in {}; camera image may not exist", object_url);
        }

        Ok(PendingModal {
            selection: self.selection_generation,
            camera_path: camera_path(&project, &base_name),
            display_name: display_name(object_url),
            object_url: object_url.to_string(),
            base_name,
            project,
        })
    }

    /// Open the detail view once its camera URL is known.
    pub fn show_modal(
        &mut self,
        pending: PendingModal,
        camera_url: String,
    ) -> Result<&ModalTarget, SelectionError> {
        if self.selected_project.as_deref() != Some(pending.project.as_str()) {
            return Err(SelectionError::ProjectChanged);
        }
        if self.selection_generation != pending.selection {
            return Err(SelectionError::SelectionChanged);
        }

        Ok(&*self.modal.insert(ModalTarget {
            object_url: pending.object_url,
            display_name: pending.display_name,
            base_name: pending.base_name,
            camera_path: pending.camera_path,
            camera_url,
        }))
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    // Helpers

    fn ticket(&self, request: FetchRequest) -> FetchTicket {
        FetchTicket {
            selection: self.selection_generation,
            index: self.index_generation,
            request,
        }
    }

    /// Start a new selection generation with an empty image list.
    fn reset_selection(&mut self) {
        self.selection_generation += 1;
        self.images.clear();
        self.current_page = 1;
        self.modal = None;
        self.loading = false;
        self.last_failure = None;
    }

    fn apply_index(&mut self, listing: &Listing<ProjectIndex>) {
        match listing {
            Listing::Loaded(index) => self.projects = index.project_ids(),
            Listing::Failed { reason } => self.last_failure = Some(reason.clone()),
        }
    }

    /// Replace the project ids from a loaded index; failures are left to the
    /// caller.
    fn publish_projects(&mut self, listing: &Listing<ProjectIndex>) {
        if let Listing::Loaded(index) = listing {
            self.projects = index.project_ids();
        }
    }

    fn set_images(&mut self, images: Vec<ImageRef>) {
        self.images = images;
        self.current_page = 1;
        self.loading = false;
    }
}

fn project_failure(
    project: &str,
    index: &Listing<ProjectIndex>,
    images: &ProjectImages,
) -> Option<String> {
    if let Some(reason) = index.failure() {
        return Some(reason.to_string());
    }
    if let Listing::Loaded(index) = index {
        if let Some(failure) = index.failures().iter().find(|f| f.project == project) {
            return Some(failure.reason.clone());
        }
    }
    images
        .failures
        .first()
        .map(|f| format!("cluster {}: {}", f.cluster, f.reason))
}
