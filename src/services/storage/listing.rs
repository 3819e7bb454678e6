//! Listing shared by the OpenDAL-backed connections.

use anyhow::Result;
use futures::StreamExt;
use opendal::Operator;

use super::types::{normalize_path, sort_entries, ObjectInfo};

/// List the direct children of `path` on an operator.
pub(crate) async fn list_children(op: &Operator, path: &str) -> Result<Vec<ObjectInfo>> {
    let path = normalize_path(path);

    let mut lister = op.lister_with(path).await?;
    let mut objects = Vec::new();

    while let Some(entry) = lister.next().await {
        let entry = entry?;
        let entry_path = entry.path().to_string();

        // Skip the path itself if it's a directory marker
        if entry_path == path || entry_path == format!("{}/", path) || entry_path == "/" {
            continue;
        }

        objects.push(ObjectInfo::from_entry(entry_path, entry.metadata()));
    }

    sort_entries(&mut objects);
    Ok(objects)
}
