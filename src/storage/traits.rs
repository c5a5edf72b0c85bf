//! Storage traits and error types
//!
//! This module defines the trait interface for crawl state backends and
//! associated error types.

use crate::state::CrawlState;
use crate::storage::Manifest;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("State artifact {artifact} is corrupt: {source}")]
    Corrupt {
        artifact: String,
        source: serde_json::Error,
    },

    #[error("Unsupported state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl state backends
///
/// A store persists the five bookkeeping sets of a [`CrawlState`] plus a
/// manifest describing when and under which configuration they were saved.
pub trait StateStore {
    /// Loads the persisted state
    ///
    /// Missing artifacts load as empty sets, so reading a store that was never
    /// written yields a fresh state.
    ///
    /// # Errors
    ///
    /// * `StorageError::Corrupt` - An artifact exists but cannot be decoded
    /// * `StorageError::UnsupportedVersion` - The manifest was written by an
    ///   incompatible version
    fn read(&self) -> StorageResult<CrawlState>;

    /// Persists every artifact of the state, then the manifest
    ///
    /// # Arguments
    ///
    /// * `state` - The state to checkpoint
    /// * `fingerprint` - Fingerprint of the configuration the state belongs to
    fn write(&self, state: &CrawlState, fingerprint: &str) -> StorageResult<()>;

    /// Loads the manifest, if one was ever written
    fn read_manifest(&self) -> StorageResult<Option<Manifest>>;
}
