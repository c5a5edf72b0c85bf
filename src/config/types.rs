use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure for Site-Mirror
///
/// `run` comes from the command line; the remaining sections come from the
/// optional TOML file and fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub run: RunOptions,
    pub rules: RulesConfig,
    pub http: HttpConfig,
    pub state: StateConfig,
}

impl Config {
    /// Combines command-line run options with the file-based sections
    pub fn new(run: RunOptions, file: FileConfig) -> Self {
        Self {
            run,
            rules: file.rules,
            http: file.http,
            state: file.state,
        }
    }

    /// The hostname used to build request URLs
    ///
    /// Validation guarantees at least one hostname is configured.
    pub fn primary_hostname(&self) -> &str {
        self.run
            .hostnames
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Builds the absolute request URL for an in-scope subpath
    pub fn request_url(&self, subpath: &str) -> String {
        format!(
            "{}://{}{}",
            self.run.request_protocol,
            self.primary_hostname(),
            subpath
        )
    }
}

/// Protocol used for every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RequestProtocol {
    Http,
    #[default]
    Https,
}

impl RequestProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for RequestProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run options supplied on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Folder the mirrored file tree is written to
    pub target_folder: PathBuf,

    /// Resume into an existing target folder using the persisted crawl state
    pub reuse_target_folder: bool,

    /// Delete an existing target folder before starting
    pub delete_target_folder: bool,

    /// Accepted hostnames; the first one is used to build request URLs
    pub hostnames: Vec<String>,

    /// Protocol used for requests
    pub request_protocol: RequestProtocol,

    /// Skip the confirmation prompt before deleting the target folder
    pub quiet: bool,

    /// Compare existing files against fresh downloads instead of writing
    pub verify_downloaded: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target_folder: PathBuf::from("downloaded"),
            reuse_target_folder: false,
            delete_target_folder: false,
            hostnames: Vec::new(),
            request_protocol: RequestProtocol::Https,
            quiet: false,
            verify_downloaded: false,
        }
    }
}

/// Sections read from the optional TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub rules: RulesConfig,
    pub http: HttpConfig,
    pub state: StateConfig,
}

/// Rules deciding what is fetched and how it is stored
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Subpaths starting with any of these prefixes are never fetched
    #[serde(rename = "ignored-prefixes")]
    pub ignored_prefixes: Vec<String>,

    /// Subpaths matching any of these regular expressions are never fetched
    #[serde(rename = "ignored-patterns")]
    pub ignored_patterns: Vec<String>,

    /// Query keys that name the file of a URL without a filename
    #[serde(rename = "query-mapped-keys")]
    pub query_mapped_keys: Vec<String>,

    /// Media types written as HTML and scanned for further URLs
    #[serde(rename = "html-content-types")]
    pub html_content_types: Vec<String>,

    /// Extensions of already written files that are re-read for URLs
    #[serde(rename = "parse-extensions")]
    pub parse_extensions: Vec<String>,

    /// Re-read written files for URLs when resuming
    #[serde(rename = "rescan-written-files")]
    pub rescan_written_files: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            ignored_prefixes: Vec::new(),
            ignored_patterns: Vec::new(),
            query_mapped_keys: vec!["do".to_string()],
            html_content_types: vec!["text/html".to_string()],
            parse_extensions: vec![".html".to_string()],
            rescan_written_files: false,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("site-mirror/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Locations of the persisted crawl state and the verify reports
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Directory holding one JSON artifact per crawl state field
    #[serde(rename = "cache-dir")]
    pub cache_dir: PathBuf,

    /// Directory receiving `missing.txt` and `mismatch.txt` in verify mode
    #[serde(rename = "report-dir")]
    pub report_dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            report_dir: PathBuf::from("."),
        }
    }
}
