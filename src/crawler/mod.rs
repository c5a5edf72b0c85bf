//! Crawler module for mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - URL extraction from fetched pages
//! - HTTP fetching behind a transport trait
//! - Ignore rules and the write-once file sink
//! - Target folder housekeeping
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod filter;
mod parser;
mod target;
mod writer;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, FetchedResponse, HttpBody, HttpTransport, ResponseBody, Transport,
    TransportError,
};
pub use filter::{IgnoreReason, SubpathFilter};
pub use parser::extract_urls;
pub use target::{delete_target_folder, scan_target_folder};
pub use writer::{FileSink, StreamError, VerifyReport, WriteOutcome};

use crate::config::{compute_fingerprint, Config};
use crate::output::write_verify_report;
use crate::state::CrawlState;
use crate::storage::{open_store, JsonStateStore, StateStore};
use crate::Result;
use std::fs;

/// Runs a complete mirror operation
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Delete the target folder if asked to (after confirmation)
/// 2. Restore the persisted state when reusing the target folder
/// 3. Build the HTTP client
/// 4. Crawl until no unhandled subpath is left
/// 5. Write the verify report in verify mode
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(Some(CrawlReport))` - Crawl completed; unmappable subpaths are listed
///   in the report rather than aborting the run
/// * `Ok(None)` - The user declined deleting the target folder
/// * `Err(MirrorError)` - Crawl failed
pub async fn mirror(config: Config) -> Result<Option<CrawlReport>> {
    if config.run.delete_target_folder
        && !delete_target_folder(&config.run.target_folder, config.run.quiet)?
    {
        tracing::info!("Deleting the target folder was declined; nothing to do");
        return Ok(None);
    }

    let store = open_store(&config.state.cache_dir);
    let state = load_state(&config, &store)?;
    let transport = HttpTransport::new(&config.http)?;

    let verify = config.run.verify_downloaded;
    let report_dir = config.state.report_dir.clone();
    let target_folder = config.run.target_folder.clone();

    let mut coordinator = Coordinator::new(config, state, transport, store)?;
    let report = coordinator.run().await?;

    if verify {
        tracing::info!(
            "Done checking downloaded files. Missing {}, mismatched {}",
            report.missing.len(),
            report.mismatch.len()
        );
        let (missing, mismatch) = write_verify_report(&report_dir, &report)?;
        tracing::info!(
            "The paths of these files have been saved to {} and {}",
            missing.display(),
            mismatch.display()
        );
    }

    tracing::info!(
        "All done! Check the target folder for the results at {}",
        target_folder.display()
    );

    Ok(Some(report))
}

/// Picks the state a run starts from
///
/// Verify runs always start fresh and never touch the target folder. A reused,
/// existing target folder resumes the persisted state; anything else starts
/// fresh with the target folder created.
fn load_state(config: &Config, store: &JsonStateStore) -> Result<CrawlState> {
    let run = &config.run;

    if run.verify_downloaded {
        tracing::info!(
            "Verifying files in {} against the site",
            run.target_folder.display()
        );
        return Ok(CrawlState::new());
    }

    if run.reuse_target_folder && run.target_folder.exists() {
        tracing::debug!("Reusing target folder {}", run.target_folder.display());

        if let Some(manifest) = store.read_manifest()? {
            if manifest.fingerprint != compute_fingerprint(config) {
                tracing::warn!(
                    "Crawl state in {} was saved with different hostnames or rules; URL mapping may differ",
                    store.base_dir().display()
                );
            }
            tracing::info!("Resuming from state saved at {}", manifest.saved_at);
        }

        let state = store.read()?;
        tracing::debug!("Restored state: {}", state.summary());
        return Ok(state);
    }

    fs::create_dir_all(&run.target_folder)?;
    Ok(CrawlState::new())
}
