//! Filename rules for object and camera images.
//!
//! Object images are stored as tiles, `object_<name>_x<col>_y<row>.jpg`,
//! inside a cluster. Their camera image is stored once per project as
//! `<name>.jpg`. Both rules work on the download URL alone and never call
//! the backend.

use regex::Regex;
use std::sync::LazyLock;

use crate::services::catalog::CAMERA_IMAGES_DIR;

/// Marker that starts the meaningful part of an object image filename.
pub const OBJECT_MARKER: &str = "object_";

static TILE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_x\d+_y\d+\.jpg$").expect("valid tile suffix pattern"));

/// Canonical camera-image filename derived from an object image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseName {
    /// The tiling suffix was found and stripped.
    Paired(String),
    /// No tiling suffix; the name is passed through after marker removal
    /// and there is no reliable camera image for it.
    Unpaired(String),
}

impl BaseName {
    pub fn as_str(&self) -> &str {
        match self {
            BaseName::Paired(name) | BaseName::Unpaired(name) => name,
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, BaseName::Paired(_))
    }
}

impl std::fmt::Display for BaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last path segment of a URL with any query string removed.
///
/// Percent-encoded separators (`%2F`) are not split on.
pub fn file_name(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    segment.split('?').next().unwrap_or(segment)
}

/// Everything after the last object marker, or `None` without a marker.
fn after_marker(name: &str) -> Option<&str> {
    name.rfind(OBJECT_MARKER)
        .map(|at| &name[at + OBJECT_MARKER.len()..])
}

/// Thumbnail caption: the file name with any prefix before the object
/// marker collapsed, keeping the marker.
///
/// `".../siteA%2Fobject_imags%2Fc1%2Fobject_foo_x1_y2.jpg?alt=media"`
/// becomes `"object_foo_x1_y2.jpg"`.
pub fn display_name(url: &str) -> String {
    let name = file_name(url);
    match after_marker(name) {
        Some(rest) => format!("{}{}", OBJECT_MARKER, rest),
        None => name.to_string(),
    }
}

/// Camera-image filename for an object image URL: the marker and anything
/// before it are removed, then `_x<N>_y<N>.jpg` is reduced to `.jpg`.
pub fn derive_base_name(url: &str) -> BaseName {
    let name = file_name(url);
    let name = after_marker(name).unwrap_or(name);

    match TILE_SUFFIX.find(name) {
        Some(suffix) => BaseName::Paired(format!("{}.jpg", &name[..suffix.start()])),
        None => BaseName::Unpaired(name.to_string()),
    }
}

/// Storage path of a project's camera image: `<project>/camera_imgs/<base>`.
pub fn camera_path(project: &str, base_name: &BaseName) -> String {
    format!("{}/{}/{}", project, CAMERA_IMAGES_DIR, base_name.as_str())
}
