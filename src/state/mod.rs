//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the frontier plus every bookkeeping set of a run (found URLs,
//!   local subpaths, handled subpaths, written files, redirects)
//! - `Disposition`: the terminal outcome recorded for each handled subpath

mod crawl_state;
mod disposition;

// Re-export main types
pub use crawl_state::{CrawlState, Reconciliation, StateSummary, SEED_SUBPATH};
pub use disposition::Disposition;
