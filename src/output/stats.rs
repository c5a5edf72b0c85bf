//! Statistics of a persisted crawl state
//!
//! This module provides functionality for extracting and displaying
//! statistics from the state store without running a crawl.

use crate::state::{CrawlState, StateSummary};
use crate::storage::StateStore;
use crate::url::{classify_url, UrlClassification};
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Extension bucket for files without one
const NO_EXTENSION: &str = "(none)";

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Sizes of every state set
    pub summary: StateSummary,

    /// When the state was last checkpointed
    pub saved_at: Option<DateTime<Utc>>,

    /// Configuration fingerprint the state was saved under
    pub fingerprint: Option<String>,

    /// Found URLs pointing at other hosts
    pub external_urls: usize,

    /// Written files by extension
    pub files_by_extension: BTreeMap<String, usize>,
}

/// Loads statistics from the state store
///
/// # Arguments
///
/// * `store` - The state store to read
/// * `hostnames` - Accepted hostnames, for telling external URLs apart
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(MirrorError)` - The persisted state is corrupt or unsupported
pub fn load_statistics(store: &dyn StateStore, hostnames: &[String]) -> Result<CrawlStatistics> {
    let manifest = store.read_manifest()?;
    let state = store.read()?;

    Ok(CrawlStatistics {
        summary: state.summary(),
        saved_at: manifest.as_ref().map(|m| m.saved_at),
        fingerprint: manifest.map(|m| m.fingerprint),
        external_urls: count_external(&state, hostnames),
        files_by_extension: count_by_extension(&state),
    })
}

fn count_external(state: &CrawlState, hostnames: &[String]) -> usize {
    state
        .found_urls()
        .iter()
        .filter(|url| {
            matches!(
                classify_url(url, hostnames),
                UrlClassification::External { .. }
            )
        })
        .count()
}

fn count_by_extension(state: &CrawlState) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for path in state.written_files() {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| NO_EXTENSION.to_string());
        *counts.entry(extension).or_insert(0) += 1;
    }
    counts
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    match stats.saved_at {
        Some(saved_at) => println!("Last checkpoint: {}", saved_at.to_rfc3339()),
        None => println!("Last checkpoint: never"),
    }
    if let Some(fingerprint) = &stats.fingerprint {
        println!("Configuration fingerprint: {}", fingerprint);
    }
    println!();

    let summary = &stats.summary;
    println!("Overview:");
    println!("  Found URLs: {}", summary.found_urls);
    println!("  External URLs: {}", stats.external_urls);
    println!("  Local subpaths: {}", summary.local_url_paths);
    println!("  Handled subpaths: {}", summary.handled_local_subpaths);
    println!("  Unhandled subpaths: {}", summary.frontier);
    println!("  Redirects: {}", summary.redirects);
    println!("  Written files: {}", summary.written_files);
    println!();

    if !stats.files_by_extension.is_empty() {
        println!("Written Files by Extension:");
        let mut counts: Vec<_> = stats.files_by_extension.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (extension, count) in counts {
            println!("  {}: {}", extension, count);
        }
        println!();
    }

    let progress = if summary.local_url_paths > 0 {
        (summary.local_url_paths - summary.frontier) as f64 / summary.local_url_paths as f64
            * 100.0
    } else {
        0.0
    };
    println!(
        "Progress: {:.1}% of discovered subpaths handled",
        progress
    );
}
