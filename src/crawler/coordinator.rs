//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the round-based crawl loop that coordinates all aspects
//! of mirroring, including:
//! - Reconciling restored state with the target folder on reuse
//! - Draining the frontier (discovered minus handled subpaths) round by round
//! - Fetching, writing, and scanning pages for further URLs
//! - Checkpointing the state after every round
//!
//! Work is strictly sequential: one subpath is handled at a time and the state
//! is owned by the coordinator, so no locking is involved.

use crate::config::{compute_fingerprint, Config};
use crate::crawler::fetcher::{FetchedResponse, ResponseBody, Transport};
use crate::crawler::filter::SubpathFilter;
use crate::crawler::parser::extract_urls;
use crate::crawler::target::scan_target_folder;
use crate::crawler::writer::{FileSink, StreamError, WriteOutcome};
use crate::state::{CrawlState, Disposition, SEED_SUBPATH};
use crate::storage::StateStore;
use crate::url::{classify_url, resolve_location, PathMapper, UrlClassification};
use crate::{MirrorError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Number of handled subpaths between progress log lines
const PROGRESS_INTERVAL: usize = 50;

/// Summary of a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Rounds that handled at least one subpath
    pub rounds: usize,

    /// How often each disposition was reached
    pub dispositions: BTreeMap<Disposition, u64>,

    /// Verify mode: files that do not exist
    pub missing: BTreeSet<PathBuf>,

    /// Verify mode: files whose length differs from the download
    pub mismatch: BTreeSet<PathBuf>,

    /// Subpaths no file path could be derived for
    pub unmappable: BTreeSet<String>,
}

impl CrawlReport {
    fn record(&mut self, disposition: Disposition) {
        *self.dispositions.entry(disposition).or_insert(0) += 1;
    }

    /// How often the given disposition was reached
    pub fn count(&self, disposition: Disposition) -> u64 {
        self.dispositions.get(&disposition).copied().unwrap_or(0)
    }

    fn count_where(&self, predicate: impl Fn(&Disposition) -> bool) -> u64 {
        self.dispositions
            .iter()
            .filter(|(disposition, _)| predicate(*disposition))
            .map(|(_, count)| count)
            .sum()
    }

    /// Subpaths for which a response was received
    pub fn fetched(&self) -> u64 {
        self.count_where(Disposition::was_fetched)
    }

    /// Files written to the target folder
    pub fn written(&self) -> u64 {
        self.count_where(Disposition::is_written)
    }

    /// Subpaths handled without a request
    pub fn skipped(&self) -> u64 {
        self.count_where(Disposition::is_skipped)
    }

    /// Subpaths that failed to map, fetch or write
    pub fn errors(&self) -> u64 {
        self.count_where(Disposition::is_error)
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rounds, {} fetched, {} written, {} redirects, {} collisions, {} skipped, {} fetch failures, {} write failures",
            self.rounds,
            self.fetched(),
            self.written(),
            self.count(Disposition::Redirected),
            self.count(Disposition::Collided),
            self.skipped(),
            self.count(Disposition::FetchFailed),
            self.count(Disposition::WriteFailed)
        )?;
        if !self.unmappable.is_empty() {
            write!(f, ", {} unmappable", self.unmappable.len())?;
        }
        if !self.missing.is_empty() || !self.mismatch.is_empty() {
            write!(
                f,
                ", {} missing, {} mismatched",
                self.missing.len(),
                self.mismatch.len()
            )?;
        }
        Ok(())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<T: Transport, S: StateStore> {
    config: Config,
    state: CrawlState,
    transport: T,
    store: S,
    fingerprint: String,
    mapper: PathMapper,
    filter: SubpathFilter,
    sink: FileSink,
}

impl<T: Transport, S: StateStore> Coordinator<T, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `state` - A fresh state, or one restored from `store`
    /// * `transport` - Where responses come from
    /// * `store` - Where the state is checkpointed
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - An ignore pattern does not compile
    pub fn new(config: Config, state: CrawlState, transport: T, store: S) -> Result<Self> {
        let filter = SubpathFilter::from_rules(&config.rules)?;
        let mapper = PathMapper::new(
            config.run.target_folder.clone(),
            config.rules.query_mapped_keys.clone(),
        );
        let sink = FileSink::new(config.run.verify_downloaded);
        let fingerprint = compute_fingerprint(&config);

        Ok(Self {
            config,
            state,
            transport,
            store,
            fingerprint,
            mapper,
            filter,
            sink,
        })
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs the crawl until no unhandled subpath is left
    ///
    /// 1. On reuse, reconciles written files with the target folder
    /// 2. Handles `/` plus every discovered, unhandled subpath, round by round
    /// 3. Checkpoints the state after each round that changed it
    ///
    /// A fatal error aborts the run without checkpointing the current round,
    /// so a rerun retries it.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();

        if self.config.run.reuse_target_folder && !self.sink.is_verify_only() {
            self.reconcile_target_folder()?;
        }
        self.checkpoint()?;

        tracing::debug!("State: {}", self.state.summary());

        let start_time = Instant::now();
        let mut handled = 0usize;

        loop {
            let mut frontier = self.state.frontier();
            if !self.state.is_handled(SEED_SUBPATH)
                && !frontier.iter().any(|subpath| subpath == SEED_SUBPATH)
            {
                frontier.insert(0, SEED_SUBPATH.to_string());
            }
            if frontier.is_empty() {
                break;
            }

            report.rounds += 1;
            tracing::info!(
                "Round {}: {} unhandled subpaths",
                report.rounds,
                frontier.len()
            );
            tracing::debug!("State: {}", self.state.summary());

            for subpath in &frontier {
                let disposition = self.handle_subpath(subpath).await?;
                tracing::trace!("{} -> {}", subpath, disposition);
                report.record(disposition);
                if disposition == Disposition::Unmappable {
                    report.unmappable.insert(subpath.clone());
                }

                handled += 1;
                if handled % PROGRESS_INTERVAL == 0 {
                    let rate = handled as f64 / start_time.elapsed().as_secs_f64();
                    tracing::info!(
                        "Progress: {} subpaths handled, {} files written, {:.2} subpaths/sec",
                        handled,
                        self.state.written_files().len(),
                        rate
                    );
                }
            }

            self.checkpoint()?;
        }

        let verify = self.sink.report();
        report.missing = verify.missing.clone();
        report.mismatch = verify.mismatch.clone();

        tracing::info!(
            "Crawl completed in {:?}: {}",
            start_time.elapsed(),
            report
        );

        Ok(report)
    }

    /// Handles a single subpath and returns its terminal disposition
    ///
    /// The subpath is marked handled before the request is made, so it is
    /// never retried within this state, whatever the outcome.
    async fn handle_subpath(&mut self, subpath: &str) -> Result<Disposition> {
        if subpath.is_empty() {
            tracing::warn!("Ignoring empty subpath");
            self.state.mark_handled(subpath);
            return Ok(Disposition::Empty);
        }

        if !subpath.starts_with('/') {
            return Err(MirrorError::InvalidSubpath {
                subpath: subpath.to_string(),
            });
        }

        if self.state.is_handled(subpath) {
            tracing::debug!("Ignoring already handled subpath {}", subpath);
            return Ok(Disposition::AlreadyHandled);
        }

        if let Some(reason) = self.filter.check(subpath) {
            tracing::debug!("Ignoring subpath {} ({})", subpath, reason);
            self.state.mark_handled(subpath);
            return Ok(Disposition::Ignored);
        }

        tracing::debug!("Checking {}", subpath);
        self.state.mark_handled(subpath);

        let path = match self.mapper.map(subpath) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Skipping subpath {}: {}", subpath, e);
                return Ok(Disposition::Unmappable);
            }
        };

        if self.state.is_written(&path) {
            tracing::warn!(
                "File {} was already written; subpath {} maps to the same file as another",
                path.display(),
                subpath
            );
            self.reparse_existing(&path);
            return Ok(Disposition::Collided);
        }

        let url = self.config.request_url(subpath);
        tracing::debug!("Downloading {}", url);

        let mut response = match self.transport.fetch(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                return Ok(Disposition::FetchFailed);
            }
        };

        let location = self.follow_location(&url, &response)?;

        if response.is_redirect() {
            let target = location.ok_or_else(|| MirrorError::RedirectWithoutLocation {
                url: url.clone(),
                status: response.status,
            })?;
            tracing::debug!("Identified as redirect {} -> {}", subpath, target);
            self.state.record_redirect(subpath, &target);
            return Ok(Disposition::Redirected);
        }

        if response.is_html(&self.config.rules.html_content_types) {
            self.store_html(&path, &mut response.body).await
        } else {
            self.store_binary(&path, &mut response.body).await
        }
    }

    /// Reads an HTML body, feeds its URLs through discovery, then writes it
    ///
    /// URLs are extracted before writing so a failed write loses no links.
    async fn store_html<B: ResponseBody>(
        &mut self,
        path: &Path,
        body: &mut B,
    ) -> Result<Disposition> {
        let body = match body.read_all().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                return Ok(Disposition::FetchFailed);
            }
        };

        for found in extract_urls(&String::from_utf8_lossy(&body)) {
            self.handle_new_url(&found);
        }

        match self.sink.write(&mut self.state, path, &body) {
            Ok(outcome) => Ok(disposition_for(outcome, Disposition::WrittenHtml)),
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
                Ok(Disposition::WriteFailed)
            }
        }
    }

    /// Streams a non-HTML body to disk unmodified
    async fn store_binary<B: ResponseBody>(
        &mut self,
        path: &Path,
        body: &mut B,
    ) -> Result<Disposition> {
        match self.sink.write_stream(&mut self.state, path, body).await {
            Ok(outcome) => Ok(disposition_for(outcome, Disposition::WrittenBinary)),
            Err(StreamError::Body(e)) => {
                tracing::warn!("Fetch failed: {}", e);
                Ok(Disposition::FetchFailed)
            }
            Err(StreamError::Io(e)) => {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
                Ok(Disposition::WriteFailed)
            }
        }
    }

    /// Feeds the resolved `Location` header, if any, through discovery
    ///
    /// The header is honoured whatever the status code. An unresolvable value
    /// is fatal on a redirect and ignored otherwise.
    fn follow_location<B>(
        &mut self,
        url: &str,
        response: &FetchedResponse<B>,
    ) -> Result<Option<String>> {
        let Some(location) = response.location.as_deref() else {
            return Ok(None);
        };

        match resolve_location(url, location) {
            Ok(absolute) => {
                self.handle_new_url(&absolute);
                Ok(Some(absolute))
            }
            Err(e) if response.is_redirect() => Err(e.into()),
            Err(e) => {
                tracing::warn!("Ignoring Location header of {}: {}", url, e);
                Ok(None)
            }
        }
    }

    /// Records a raw URL and adds its subpath to the frontier if it is local
    fn handle_new_url(&mut self, url: &str) {
        self.state.record_found_url(url);

        match classify_url(url, &self.config.run.hostnames) {
            UrlClassification::Ignored => {}
            UrlClassification::External { host } => {
                tracing::trace!("Dropping external URL {} (host {})", url, host);
            }
            UrlClassification::Local { subpath } => {
                if self.state.add_local_path(&subpath) {
                    tracing::trace!("Discovered {}", subpath);
                }
            }
        }
    }

    /// Re-extracts URLs from an already written file
    ///
    /// Only files with a parse extension are read. Unreadable files are
    /// skipped; in verify mode they may legitimately not exist.
    fn reparse_existing(&mut self, path: &Path) {
        if !has_parse_extension(path, &self.config.rules.parse_extensions) {
            return;
        }

        match fs::read(path) {
            Ok(bytes) => {
                for found in extract_urls(&String::from_utf8_lossy(&bytes)) {
                    self.handle_new_url(&found);
                }
            }
            Err(e) => tracing::debug!("Cannot re-read {}: {}", path.display(), e),
        }
    }

    /// Replaces the recorded written files with what is actually on disk
    fn reconcile_target_folder(&mut self) -> Result<()> {
        tracing::debug!(
            "Reading already written files from {}",
            self.config.run.target_folder.display()
        );

        let actual = scan_target_folder(&self.config.run.target_folder)?;
        let reconciliation = self.state.reconcile_written_files(actual);

        for path in &reconciliation.discarded {
            tracing::debug!("Written file is missing at {} - discarding", path.display());
        }
        for path in &reconciliation.adopted {
            tracing::debug!("Written file is not known at {} - adding", path.display());
        }
        if !reconciliation.is_empty() {
            tracing::info!(
                "Reconciled target folder: {} files discarded, {} adopted",
                reconciliation.discarded.len(),
                reconciliation.adopted.len()
            );
        }

        if self.config.rules.rescan_written_files {
            self.rescan_written_files();
        }

        Ok(())
    }

    /// Feeds the URLs of every written page back through discovery
    fn rescan_written_files(&mut self) {
        let files: Vec<PathBuf> = self
            .state
            .written_files()
            .iter()
            .filter(|path| has_parse_extension(path, &self.config.rules.parse_extensions))
            .cloned()
            .collect();

        tracing::info!("Rescanning {} written files for URLs", files.len());

        for path in files {
            match fs::read(&path) {
                Ok(bytes) => {
                    for found in extract_urls(&String::from_utf8_lossy(&bytes)) {
                        self.handle_new_url(&found);
                    }
                }
                Err(e) => tracing::warn!("Cannot rescan {}: {}", path.display(), e),
            }
        }
    }

    /// Persists the state if it changed; verify runs never persist
    fn checkpoint(&mut self) -> Result<()> {
        if self.sink.is_verify_only() || !self.state.is_dirty() {
            return Ok(());
        }

        tracing::debug!("Writing persistent state");
        self.store.write(&self.state, &self.fingerprint)?;
        self.state.mark_clean();
        Ok(())
    }
}

/// Maps a sink outcome onto the disposition of the handled subpath
fn disposition_for(outcome: WriteOutcome, written: Disposition) -> Disposition {
    match outcome {
        WriteOutcome::Written => written,
        WriteOutcome::AlreadyWritten => Disposition::Collided,
        WriteOutcome::Verified | WriteOutcome::Missing | WriteOutcome::Mismatch => {
            Disposition::Verified
        }
    }
}

/// Returns true if the file extension (with its dot) is one of `extensions`
fn has_parse_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions.iter().any(|candidate| {
        candidate
            .strip_prefix('.')
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(extension))
    })
}
