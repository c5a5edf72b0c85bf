use crate::config::types::{Config, FileConfig, RunOptions};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses the optional TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Parsed file sections, with defaults for missing keys
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&content)?;
    Ok(file)
}

/// Builds and validates the full configuration
///
/// When `path` is `None` every file section uses its defaults.
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::{load_config, RunOptions};
///
/// let run = RunOptions {
///     hostnames: vec!["example.org".to_string()],
///     ..RunOptions::default()
/// };
/// let config = load_config(run, None).unwrap();
/// assert_eq!(config.primary_hostname(), "example.org");
/// ```
pub fn load_config(run: RunOptions, path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let config = Config::new(run, file);
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 fingerprint of everything that influences URL mapping
///
/// The fingerprint is stored next to the persisted crawl state so a resumed run
/// can tell whether hostnames or crawl rules changed since the state was written.
pub fn compute_fingerprint(config: &Config) -> String {
    let mut hasher = Sha256::new();

    hasher.update(b"hostnames\n");
    for hostname in &config.run.hostnames {
        hasher.update(hostname.as_bytes());
        hasher.update(b"\n");
    }

    let rules = &config.rules;
    let sections: [(&str, &[String]); 5] = [
        ("ignored-prefixes", &rules.ignored_prefixes),
        ("ignored-patterns", &rules.ignored_patterns),
        ("query-mapped-keys", &rules.query_mapped_keys),
        ("html-content-types", &rules.html_content_types),
        ("parse-extensions", &rules.parse_extensions),
    ];
    for (name, values) in sections {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
        for value in values {
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn run_options() -> RunOptions {
        RunOptions {
            target_folder: "/nonexistent/site-mirror-target".into(),
            hostnames: vec!["example.org".to_string()],
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_load_valid_file_config() {
        let config_content = r#"
[rules]
ignored-prefixes = ["/calendar/", "/login/"]
ignored-patterns = ['^/profile/[0-9]+-[a-zA-Z0-9]/content/.*']
query-mapped-keys = ["do", "page_id"]

[http]
user-agent = "TestMirror/1.0"
timeout-secs = 5

[state]
cache-dir = "./state"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(run_options(), Some(file.path())).unwrap();

        assert_eq!(config.rules.ignored_prefixes, vec!["/calendar/", "/login/"]);
        assert_eq!(config.rules.query_mapped_keys, vec!["do", "page_id"]);
        assert_eq!(config.http.user_agent, "TestMirror/1.0");
        assert_eq!(config.http.timeout_secs, 5);
        // Unspecified keys keep their defaults
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.rules.html_content_types, vec!["text/html"]);
        assert_eq!(config.state.cache_dir, Path::new("./state"));
    }

    #[test]
    fn test_load_config_without_file_uses_defaults() {
        let config = load_config(run_options(), None).unwrap();
        assert_eq!(config.rules.query_mapped_keys, vec!["do"]);
        assert_eq!(config.rules.parse_extensions, vec![".html"]);
        assert!(!config.rules.rescan_written_files);
        assert_eq!(config.state.cache_dir, Path::new("cache"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(run_options(), Some(Path::new("/nonexistent/mirror.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(run_options(), Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[rules]\nignored-patterns = ['(unclosed']\n");
        let result = load_config(run_options(), Some(file.path()));
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let config = load_config(run_options(), None).unwrap();
        let first = compute_fingerprint(&config);
        let second = compute_fingerprint(&config);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_rules_and_hostnames() {
        let base = load_config(run_options(), None).unwrap();

        let mut other_rules = base.clone();
        other_rules.rules.query_mapped_keys.push("page_id".to_string());

        let mut other_hosts = base.clone();
        other_hosts.run.hostnames.push("www.example.org".to_string());

        let fingerprint = compute_fingerprint(&base);
        assert_ne!(fingerprint, compute_fingerprint(&other_rules));
        assert_ne!(fingerprint, compute_fingerprint(&other_hosts));
    }

    #[test]
    fn test_fingerprint_ignores_http_settings() {
        let base = load_config(run_options(), None).unwrap();
        let mut other = base.clone();
        other.http.timeout_secs = 99;

        assert_eq!(compute_fingerprint(&base), compute_fingerprint(&other));
    }
}
