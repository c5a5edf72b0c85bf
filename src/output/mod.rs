//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Writing the verify-mode report files
//! - Displaying statistics of a persisted crawl state

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File listing paths that were expected but not found
pub const MISSING_REPORT: &str = "missing.txt";

/// File listing paths whose length differs from the download
pub const MISMATCH_REPORT: &str = "mismatch.txt";

/// Writes the verify-mode findings, one path per line
///
/// # Arguments
///
/// * `dir` - Directory to write `missing.txt` and `mismatch.txt` into
/// * `report` - The finished crawl report
///
/// # Returns
///
/// The paths of the missing and mismatch report files
pub fn write_verify_report(dir: &Path, report: &CrawlReport) -> io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;

    let missing_path = dir.join(MISSING_REPORT);
    let mismatch_path = dir.join(MISMATCH_REPORT);
    fs::write(&missing_path, render_paths(&report.missing))?;
    fs::write(&mismatch_path, render_paths(&report.mismatch))?;

    Ok((missing_path, mismatch_path))
}

fn render_paths(paths: &BTreeSet<PathBuf>) -> String {
    paths
        .iter()
        .map(|path| format!("{}\n", path.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_verify_report() {
        let dir = TempDir::new().unwrap();
        let mut report = CrawlReport::default();
        report.missing.insert(PathBuf::from("t/b.html"));
        report.missing.insert(PathBuf::from("t/a.html"));
        report.mismatch.insert(PathBuf::from("t/index.html"));

        let (missing, mismatch) = write_verify_report(dir.path(), &report).unwrap();

        assert_eq!(fs::read_to_string(missing).unwrap(), "t/a.html\nt/b.html\n");
        assert_eq!(fs::read_to_string(mismatch).unwrap(), "t/index.html\n");
    }

    #[test]
    fn test_write_empty_verify_report() {
        let dir = TempDir::new().unwrap();
        let (missing, mismatch) =
            write_verify_report(&dir.path().join("reports"), &CrawlReport::default()).unwrap();

        assert_eq!(fs::read_to_string(missing).unwrap(), "");
        assert_eq!(fs::read_to_string(mismatch).unwrap(), "");
    }
}
