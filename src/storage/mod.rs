//! Storage module for persisting crawl state
//!
//! This module handles checkpointing the crawl state between rounds, including:
//! - One JSON artifact per bookkeeping set
//! - A manifest with the layout version and configuration fingerprint
//! - Atomic replacement of every artifact on write

mod json;
mod schema;
mod traits;

pub use json::JsonStateStore;
pub use schema::{Manifest, StateArtifact, SCHEMA_VERSION};
pub use traits::{StateStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the JSON state store rooted at the given cache directory
///
/// The directory is created lazily on the first write.
///
/// # Arguments
///
/// * `cache_dir` - Directory holding the state artifacts
pub fn open_store(cache_dir: &Path) -> JsonStateStore {
    JsonStateStore::new(cache_dir)
}
