pub mod catalog;
pub mod storage;

pub use catalog::{ImageCatalog, ImageRef, Listing, ObjectSource};
