//! Administrative boundary loading.

pub mod crs;
pub mod error;
pub mod loader;

pub use loader::{load_regions, load_regions_async, regions_from_collection};
