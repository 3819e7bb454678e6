//! In-memory object store for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::source::ObjectSource;

const URL_PREFIX: &str = "https://store.test/v0/b/bucket/o/";

/// Object store holding a flat set of object paths.
///
/// Prefixes are derived from the paths. Listings under a path registered with
/// [`MemorySource::failing_on`] fail; listings under a held path wait until
/// the hold is released.
#[derive(Default)]
pub(crate) struct MemorySource {
    objects: BTreeSet<String>,
    failing: HashSet<String>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object(mut self, path: &str) -> Self {
        self.objects.insert(path.to_string());
        self
    }

    /// Add `count` tiled images named `object_<cluster>_<nnn>_x1_y1.jpg`.
    pub(crate) fn with_cluster(mut self, project: &str, cluster: &str, count: usize) -> Self {
        for i in 1..=count {
            self.objects.insert(format!(
                "{}/object_imags/{}/object_{}_{:03}_x1_y1.jpg",
                project, cluster, cluster, i
            ));
        }
        self
    }

    pub(crate) fn failing_on(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Make object listings under `path` wait until the returned handle is notified.
    pub(crate) fn hold(&self, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::clone(&notify));
        notify
    }

    pub(crate) fn url_for(path: &str) -> String {
        format!("{}{}?alt=media&token=abc", URL_PREFIX, path.replace('/', "%2F"))
    }

    fn check(&self, path: &str) -> Result<()> {
        if self.failing.contains(path) {
            return Err(anyhow!("backend unreachable: {:?}", path));
        }
        Ok(())
    }

    /// Immediate children of `path`: (prefix names, object paths).
    fn children(&self, path: &str) -> (Vec<String>, Vec<String>) {
        let mut prefixes = BTreeSet::new();
        let mut objects = Vec::new();

        for object in self.objects.iter().filter(|o| o.starts_with(path)) {
            match object[path.len()..].split_once('/') {
                Some((prefix, _)) => {
                    prefixes.insert(prefix.to_string());
                }
                None => objects.push(object.clone()),
            }
        }

        (prefixes.into_iter().collect(), objects)
    }
}

#[async_trait]
impl ObjectSource for MemorySource {
    async fn list_prefixes(&self, path: &str) -> Result<Vec<String>> {
        self.check(path)?;
        Ok(self.children(path).0)
    }

    async fn list_objects(&self, path: &str) -> Result<Vec<String>> {
        let hold = self.holds.lock().unwrap().get(path).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.check(path)?;
        Ok(self.children(path).1)
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        Ok(Self::url_for(path))
    }

    async fn object_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{}?alt=media", URL_PREFIX, path.replace('/', "%2F")))
    }
}
