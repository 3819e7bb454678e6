//! Selection state and the actions that drive it.

mod selection;
mod selection_actions;

pub use selection::*;
pub use selection_actions::ImageSearch;
