//! Mutable crawl state: the frontier and its bookkeeping
//!
//! A single [`CrawlState`] is owned by the coordinator for the duration of a run.
//! It is either built fresh or restored from the state store, mutated only
//! through the methods below, and checkpointed after every round.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// The subpath every crawl starts from
pub const SEED_SUBPATH: &str = "/";

/// Frontier and bookkeeping sets of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    /// Every raw URL ever observed
    found_urls: BTreeSet<String>,

    /// In-scope subpaths discovered so far
    local_url_paths: BTreeSet<String>,

    /// Subpaths that reached a terminal disposition
    handled_local_subpaths: BTreeSet<String>,

    /// Files written to the target folder
    written_files: BTreeSet<PathBuf>,

    /// Handled subpath -> absolute URL it redirected to
    redirects: BTreeMap<String, String>,

    /// Set whenever a mutation changed something since the last checkpoint
    dirty: bool,
}

/// Outcome of comparing `written_files` against the target folder on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Recorded as written but no longer on disk
    pub discarded: Vec<PathBuf>,

    /// On disk but not recorded; now treated as written
    pub adopted: Vec<PathBuf>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.discarded.is_empty() && self.adopted.is_empty()
    }
}

impl CrawlState {
    /// Creates an empty state for a clean run
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a state from its persisted fields
    pub fn from_parts(
        found_urls: BTreeSet<String>,
        local_url_paths: BTreeSet<String>,
        handled_local_subpaths: BTreeSet<String>,
        written_files: BTreeSet<PathBuf>,
        redirects: BTreeMap<String, String>,
    ) -> Self {
        Self {
            found_urls,
            local_url_paths,
            handled_local_subpaths,
            written_files,
            redirects,
            dirty: false,
        }
    }

    // ===== Accessors =====

    pub fn found_urls(&self) -> &BTreeSet<String> {
        &self.found_urls
    }

    pub fn local_url_paths(&self) -> &BTreeSet<String> {
        &self.local_url_paths
    }

    pub fn handled_local_subpaths(&self) -> &BTreeSet<String> {
        &self.handled_local_subpaths
    }

    pub fn written_files(&self) -> &BTreeSet<PathBuf> {
        &self.written_files
    }

    pub fn redirects(&self) -> &BTreeMap<String, String> {
        &self.redirects
    }

    // ===== Discovery =====

    /// Records a raw URL; returns true if it was not seen before
    pub fn record_found_url(&mut self, url: &str) -> bool {
        let inserted = self.found_urls.insert(url.to_string());
        self.dirty |= inserted;
        inserted
    }

    /// Adds an in-scope subpath; returns true if it is new
    pub fn add_local_path(&mut self, subpath: &str) -> bool {
        let inserted = self.local_url_paths.insert(subpath.to_string());
        self.dirty |= inserted;
        inserted
    }

    // ===== Handling =====

    pub fn is_handled(&self, subpath: &str) -> bool {
        self.handled_local_subpaths.contains(subpath)
    }

    /// Marks a subpath as handled; returns false if it already was
    pub fn mark_handled(&mut self, subpath: &str) -> bool {
        let inserted = self.handled_local_subpaths.insert(subpath.to_string());
        self.dirty |= inserted;
        inserted
    }

    /// Discovered but not yet handled subpaths, in sorted order
    ///
    /// The returned vector is a point-in-time copy, so the state can be mutated
    /// while iterating it.
    pub fn frontier(&self) -> Vec<String> {
        self.local_url_paths
            .difference(&self.handled_local_subpaths)
            .cloned()
            .collect()
    }

    // ===== Written files =====

    pub fn is_written(&self, path: &Path) -> bool {
        self.written_files.contains(path)
    }

    /// Records a written file; returns false if it was already recorded
    pub fn mark_written(&mut self, path: &Path) -> bool {
        let inserted = self.written_files.insert(path.to_path_buf());
        self.dirty |= inserted;
        inserted
    }

    /// Replaces `written_files` with the files actually present on disk
    ///
    /// Files recorded but missing are discarded; files present but unrecorded
    /// are adopted as written. Discovery sets are left untouched.
    pub fn reconcile_written_files(&mut self, actual: BTreeSet<PathBuf>) -> Reconciliation {
        let reconciliation = Reconciliation {
            discarded: self.written_files.difference(&actual).cloned().collect(),
            adopted: actual.difference(&self.written_files).cloned().collect(),
        };

        if !reconciliation.is_empty() {
            self.written_files = actual;
            self.dirty = true;
        }

        reconciliation
    }

    // ===== Redirects =====

    /// Records that a handled subpath redirected to an absolute URL
    pub fn record_redirect(&mut self, subpath: &str, target: &str) {
        let previous = self
            .redirects
            .insert(subpath.to_string(), target.to_string());
        self.dirty |= previous.as_deref() != Some(target);
    }

    // ===== Checkpointing =====

    /// Returns true if anything changed since the last checkpoint
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the change marker after a successful checkpoint
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Counts of every set, for logging and statistics
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            found_urls: self.found_urls.len(),
            local_url_paths: self.local_url_paths.len(),
            handled_local_subpaths: self.handled_local_subpaths.len(),
            written_files: self.written_files.len(),
            redirects: self.redirects.len(),
            frontier: self
                .local_url_paths
                .difference(&self.handled_local_subpaths)
                .count(),
        }
    }
}

/// Set sizes of a [`CrawlState`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateSummary {
    pub found_urls: usize,
    pub local_url_paths: usize,
    pub handled_local_subpaths: usize,
    pub written_files: usize,
    pub redirects: usize,
    pub frontier: usize,
}

impl fmt::Display for StateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found URLs: {}, local paths: {}, handled: {}, written files: {}, redirects: {}, frontier: {}",
            self.found_urls,
            self.local_url_paths,
            self.handled_local_subpaths,
            self.written_files,
            self.redirects,
            self.frontier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_new_state_is_empty_and_clean() {
        let state = CrawlState::new();
        assert_eq!(state.summary(), StateSummary::default());
        assert!(!state.is_dirty());
        assert!(state.frontier().is_empty());
    }

    #[test]
    fn test_frontier_is_local_minus_handled() {
        let mut state = CrawlState::new();
        state.add_local_path("/b");
        state.add_local_path("/a");
        state.add_local_path("/c");
        state.mark_handled("/b");

        assert_eq!(state.frontier(), vec!["/a".to_string(), "/c".to_string()]);
    }

    #[test]
    fn test_frontier_is_a_snapshot() {
        let mut state = CrawlState::new();
        state.add_local_path("/a");
        let frontier = state.frontier();

        state.mark_handled("/a");
        state.add_local_path("/b");

        assert_eq!(frontier, vec!["/a".to_string()]);
        assert_eq!(state.frontier(), vec!["/b".to_string()]);
    }

    #[test]
    fn test_mark_handled_only_once() {
        let mut state = CrawlState::new();
        assert!(state.mark_handled("/"));
        assert!(!state.mark_handled("/"));
        assert!(state.is_handled("/"));
    }

    #[test]
    fn test_mutations_set_dirty() {
        let mut state = CrawlState::new();
        state.record_found_url("https://example.org/");
        assert!(state.is_dirty());

        state.mark_clean();
        state.record_found_url("https://example.org/");
        assert!(!state.is_dirty(), "re-recording a URL changes nothing");

        state.mark_written(Path::new("t/index.html"));
        assert!(state.is_dirty());
    }

    #[test]
    fn test_record_redirect() {
        let mut state = CrawlState::new();
        state.record_redirect("/old", "https://host/new");
        assert_eq!(
            state.redirects().get("/old").map(String::as_str),
            Some("https://host/new")
        );

        state.mark_clean();
        state.record_redirect("/old", "https://host/new");
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_reconcile_discards_and_adopts() {
        let mut state = CrawlState::new();
        state.mark_written(Path::new("t/a.html"));
        state.mark_written(Path::new("t/b.html"));
        state.mark_clean();

        let reconciliation = state.reconcile_written_files(paths(&["t/b.html", "t/c.css"]));

        assert_eq!(reconciliation.discarded, vec![PathBuf::from("t/a.html")]);
        assert_eq!(reconciliation.adopted, vec![PathBuf::from("t/c.css")]);
        assert_eq!(state.written_files(), &paths(&["t/b.html", "t/c.css"]));
        assert!(state.is_dirty());
    }

    #[test]
    fn test_reconcile_unchanged_stays_clean() {
        let mut state = CrawlState::new();
        state.mark_written(Path::new("t/a.html"));
        state.mark_clean();

        let reconciliation = state.reconcile_written_files(paths(&["t/a.html"]));
        assert!(reconciliation.is_empty());
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_reconcile_leaves_discovery_untouched() {
        let mut state = CrawlState::new();
        state.add_local_path("/a");
        state.reconcile_written_files(paths(&["t/x.html"]));

        assert_eq!(state.local_url_paths().len(), 1);
        assert!(state.handled_local_subpaths().is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let mut state = CrawlState::new();
        state.record_found_url("/a");
        state.record_found_url("//other/x");
        state.add_local_path("/a");
        state.add_local_path("/b");
        state.mark_handled("/");
        state.mark_handled("/a");
        state.record_redirect("/a", "https://host/b");

        let summary = state.summary();
        assert_eq!(summary.found_urls, 2);
        assert_eq!(summary.local_url_paths, 2);
        assert_eq!(summary.handled_local_subpaths, 2);
        assert_eq!(summary.redirects, 1);
        assert_eq!(summary.frontier, 1);
        assert!(summary.to_string().contains("frontier: 1"));
    }
}
