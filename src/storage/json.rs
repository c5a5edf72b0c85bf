//! JSON file implementation of the state store

use crate::state::CrawlState;
use crate::storage::schema::{Manifest, StateArtifact, SCHEMA_VERSION};
use crate::storage::traits::{StateStore, StorageError, StorageResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// State store keeping one JSON file per artifact in a directory
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    base_dir: PathBuf,
}

impl JsonStateStore {
    /// Creates a store rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn artifact_path(&self, artifact: StateArtifact) -> PathBuf {
        self.base_dir.join(artifact.file_name())
    }

    fn read_artifact<T>(&self, artifact: StateArtifact) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = match fs::read(self.artifact_path(artifact)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                artifact: artifact.file_name().to_string(),
                source,
            })
    }

    /// Writes to a temporary sibling, then renames it over the artifact
    fn write_artifact<T>(&self, artifact: StateArtifact, value: &T) -> StorageResult<()>
    where
        T: Serialize,
    {
        let path = self.artifact_path(artifact);
        let tmp_path = path.with_extension("json.tmp");

        let encoded = serde_json::to_vec_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn read(&self) -> StorageResult<CrawlState> {
        // Validates the version before trusting any artifact
        self.read_manifest()?;

        Ok(CrawlState::from_parts(
            self.read_artifact(StateArtifact::FoundUrls)?
                .unwrap_or_default(),
            self.read_artifact(StateArtifact::LocalUrlPaths)?
                .unwrap_or_default(),
            self.read_artifact(StateArtifact::HandledLocalSubpaths)?
                .unwrap_or_default(),
            self.read_artifact(StateArtifact::WrittenFiles)?
                .unwrap_or_default(),
            self.read_artifact(StateArtifact::Redirects)?
                .unwrap_or_default(),
        ))
    }

    fn write(&self, state: &CrawlState, fingerprint: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.base_dir)?;

        self.write_artifact(StateArtifact::FoundUrls, state.found_urls())?;
        self.write_artifact(StateArtifact::LocalUrlPaths, state.local_url_paths())?;
        self.write_artifact(
            StateArtifact::HandledLocalSubpaths,
            state.handled_local_subpaths(),
        )?;
        self.write_artifact(StateArtifact::WrittenFiles, state.written_files())?;
        self.write_artifact(StateArtifact::Redirects, state.redirects())?;
        self.write_artifact(StateArtifact::Manifest, &Manifest::new(fingerprint))?;

        tracing::debug!(
            "Checkpointed crawl state to {} ({})",
            self.base_dir.display(),
            state.summary()
        );
        Ok(())
    }

    fn read_manifest(&self) -> StorageResult<Option<Manifest>> {
        let manifest: Option<Manifest> = self.read_artifact(StateArtifact::Manifest)?;

        match manifest {
            Some(manifest) if manifest.version != SCHEMA_VERSION => {
                Err(StorageError::UnsupportedVersion {
                    found: manifest.version,
                    expected: SCHEMA_VERSION,
                })
            }
            other => Ok(other),
        }
    }
}
