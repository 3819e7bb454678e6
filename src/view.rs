//! Plain-text rendering of the selection.

use std::fmt::Write;

use crate::naming::display_name;
use crate::state::{Phase, SelectionState};

fn choice(selected: Option<&str>) -> &str {
    selected.unwrap_or("-")
}

/// Render the current selection, page and detail view.
pub fn render(state: &SelectionState) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_view(&mut out, state);
    out
}

fn write_view(out: &mut String, state: &SelectionState) -> std::fmt::Result {
    writeln!(out, "Projects: {}", state.projects().join(", "))?;
    writeln!(out, "Project:  {}", choice(state.selected_project()))?;
    if state.phase() != Phase::Idle {
        writeln!(out, "Clusters: {}", state.clusters().join(", "))?;
        writeln!(out, "Cluster:  {}", choice(state.selected_cluster()))?;
    }

    if state.is_loading() {
        writeln!(out, "Loading...")?;
    }
    if let Some(reason) = state.last_failure() {
        writeln!(out, "Error: {}", reason)?;
    }

    if state.phase() != Phase::Idle && !state.is_loading() {
        if state.images().is_empty() {
            writeln!(out, "No images")?;
        } else {
            writeln!(
                out,
                "Page {}/{} ({} images)",
                state.current_page(),
                state.total_pages(),
                state.images().len()
            )?;
            for (index, image) in state.displayed_images().iter().enumerate() {
                writeln!(out, "  [{}] {}", index, display_name(&image.url))?;
            }
            let previous = if state.has_previous() { "prev" } else { "    " };
            let next = if state.has_next() { "next" } else { "" };
            writeln!(out, "  {} {}", previous, next)?;
        }
    }

    if let Some(modal) = state.modal() {
        writeln!(out, "Object: {}", modal.display_name)?;
        writeln!(out, "  {}", modal.object_url)?;
        writeln!(out, "Camera: {}", modal.base_name)?;
        writeln!(out, "  {}", modal.camera_url)?;
        if !modal.is_paired() {
            writeln!(out, "  (no tile suffix, camera image may not exist)")?;
        }
    }

    Ok(())
}
