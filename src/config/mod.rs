//! Configuration module for Site-Mirror
//!
//! Run options come from the command line; crawl rules, HTTP settings and state
//! locations come from an optional TOML file. Both are merged into one
//! [`Config`] and validated before a crawl starts.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::{load_config, RunOptions};
//! use std::path::Path;
//!
//! let run = RunOptions {
//!     hostnames: vec!["example.org".to_string()],
//!     ..RunOptions::default()
//! };
//! let config = load_config(run, Some(Path::new("mirror.toml"))).unwrap();
//! println!("Ignoring {} prefixes", config.rules.ignored_prefixes.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FileConfig, HttpConfig, RequestProtocol, RulesConfig, RunOptions, StateConfig,
};

// Re-export parser functions
pub use parser::{compute_fingerprint, load_config, load_file_config};
pub use validation::validate;
