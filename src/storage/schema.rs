//! On-disk layout of the persisted crawl state
//!
//! Every set of the crawl state lives in its own JSON file inside the cache
//! directory. `manifest.json` is written last on every checkpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of the on-disk state layout
pub const SCHEMA_VERSION: u32 = 1;

/// One persisted file of the crawl state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArtifact {
    FoundUrls,
    LocalUrlPaths,
    HandledLocalSubpaths,
    WrittenFiles,
    Redirects,
    Manifest,
}

impl StateArtifact {
    /// Every artifact, in write order
    pub const ALL: [StateArtifact; 6] = [
        Self::FoundUrls,
        Self::LocalUrlPaths,
        Self::HandledLocalSubpaths,
        Self::WrittenFiles,
        Self::Redirects,
        Self::Manifest,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::FoundUrls => "found_urls.json",
            Self::LocalUrlPaths => "local_url_paths.json",
            Self::HandledLocalSubpaths => "handled_local_subpaths.json",
            Self::WrittenFiles => "written_files.json",
            Self::Redirects => "redirects.json",
            Self::Manifest => "manifest.json",
        }
    }
}

/// Metadata saved alongside the crawl state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Layout version, see [`SCHEMA_VERSION`]
    pub version: u32,

    /// When the last checkpoint completed
    pub saved_at: DateTime<Utc>,

    /// Fingerprint of the configuration that produced the state
    pub fingerprint: String,
}

impl Manifest {
    /// Creates a manifest for a checkpoint taken now
    pub fn new(fingerprint: &str) -> Self {
        Self {
            version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            fingerprint: fingerprint.to_string(),
        }
    }
}
