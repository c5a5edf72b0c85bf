//! Site-Mirror: a resumable website mirror
//!
//! This crate mirrors a website to local disk. Starting from `/` it follows every
//! `href`/`src` attribute that points back at one of the configured hostnames,
//! downloads each page and asset once, and maps every URL onto a deterministic
//! file path under the target folder. Crawl progress is checkpointed after every
//! round so an interrupted run can pick up where it stopped.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mirror operations
///
/// Every variant aborts the run. Per-subpath problems (transport failures,
/// file collisions, failed writes, unmappable subpaths) never surface here;
/// they are recorded as a [`state::Disposition`] and the crawl continues.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Redirect status {status} without Location header for {url}")]
    RedirectWithoutLocation { url: String, status: u16 },

    #[error("Subpath must be absolute (start with '/'), got '{subpath}'")]
    InvalidSubpath { subpath: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {source}")]
    Parse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Cannot resolve Location '{location}' against {base}: {source}")]
    InvalidLocation {
        location: String,
        base: String,
        source: ::url::ParseError,
    },
}

/// Errors raised when a subpath cannot be mapped onto a file path
///
/// These are raised for subpaths without a filename whose query string does not
/// name exactly one filename-mapped key. The subpath is carried along so the
/// list of mapped keys can be extended. The crawler skips such a subpath and
/// reports it at the end of the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("No filename and no filename-mapped query key in subpath {subpath} (keys: {keys:?})")]
    NoMappedKey { subpath: String, keys: Vec<String> },

    #[error("No filename and more than one filename-mapped query key in subpath {subpath} (keys: {keys:?})")]
    AmbiguousMappedKey { subpath: String, keys: Vec<String> },

    #[error("Filename-mapped query key '{key}' has no value in subpath {subpath}")]
    EmptyMappedValue { subpath: String, key: String },
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{mirror, Coordinator, CrawlReport};
pub use state::{CrawlState, Disposition};
pub use url::{classify_url, parse_url, PathMapper, UrlClassification};
