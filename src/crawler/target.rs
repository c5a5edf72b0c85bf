//! Target folder housekeeping: deletion before a clean run and scanning on reuse

use crate::Result;
use dialoguer::Confirm;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Removes the target folder before a clean run
///
/// Unless `quiet` is set the user is asked to confirm first.
///
/// # Returns
///
/// * `Ok(true)` - The folder was removed or did not exist; the run may proceed
/// * `Ok(false)` - The user declined; the run must be cancelled
pub fn delete_target_folder(path: &Path, quiet: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    if !quiet {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete the target folder {} before starting?",
                path.display()
            ))
            .default(true)
            .interact()?;

        if !confirmed {
            return Ok(false);
        }
    }

    tracing::debug!("Removing existing target folder {}", path.display());
    fs::remove_dir_all(path)?;
    Ok(true)
}

/// Lists every regular file below the target folder
///
/// Paths are returned joined onto `path` exactly as given, so they compare
/// equal to the paths produced by the path mapper for the same folder. A
/// missing folder yields an empty set.
pub fn scan_target_folder(path: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    if !path.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.insert(entry.into_path());
        }
    }

    Ok(files)
}
