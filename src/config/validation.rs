use crate::config::types::{Config, HttpConfig, RulesConfig, RunOptions, StateConfig};
use crate::ConfigError;
use regex::Regex;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_run_options(&config.run)?;
    validate_rules(&config.rules)?;
    validate_http_config(&config.http)?;
    validate_state_config(&config.state)?;
    Ok(())
}

/// Validates the command-line run options
fn validate_run_options(run: &RunOptions) -> Result<(), ConfigError> {
    let Some(primary) = run.hostnames.first() else {
        return Err(ConfigError::Validation(
            "No hostnames specified".to_string(),
        ));
    };

    for hostname in &run.hostnames {
        validate_hostname(hostname)?;
    }

    // Request URLs are built from the first hostname, so it must be concrete
    if primary.starts_with("*.") {
        return Err(ConfigError::Validation(format!(
            "The first hostname is used for requests and cannot be a wildcard, got '{}'",
            primary
        )));
    }

    if run.reuse_target_folder && run.delete_target_folder {
        return Err(ConfigError::Validation(
            "--reuse-target-folder and --delete-target-folder are mutually exclusive".to_string(),
        ));
    }

    if run.verify_downloaded && run.delete_target_folder {
        return Err(ConfigError::Validation(
            "--verify-downloaded cannot be combined with --delete-target-folder".to_string(),
        ));
    }

    if run.target_folder.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "target folder cannot be empty".to_string(),
        ));
    }

    // Verify mode never writes, so an existing target folder is expected there
    if run.target_folder.exists()
        && !run.reuse_target_folder
        && !run.delete_target_folder
        && !run.verify_downloaded
    {
        return Err(ConfigError::Validation(format!(
            "The target folder '{}' already exists and neither --reuse-target-folder nor --delete-target-folder was specified",
            run.target_folder.display()
        )));
    }

    Ok(())
}

/// Validates a single accepted hostname (wildcards allowed)
fn validate_hostname(hostname: &str) -> Result<(), ConfigError> {
    let base = hostname.strip_prefix("*.").unwrap_or(hostname);

    if base.is_empty() {
        return Err(ConfigError::Validation(
            "Hostnames cannot be empty".to_string(),
        ));
    }

    if base.contains('/') || base.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "Hostname '{}' must not contain slashes or whitespace",
            hostname
        )));
    }

    Ok(())
}

/// Validates crawl rules, compiling every ignore pattern once
fn validate_rules(rules: &RulesConfig) -> Result<(), ConfigError> {
    for pattern in &rules.ignored_patterns {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    if rules.ignored_prefixes.iter().any(|prefix| prefix.is_empty()) {
        return Err(ConfigError::Validation(
            "ignored-prefixes cannot contain an empty prefix (it would ignore everything)"
                .to_string(),
        ));
    }

    if rules.html_content_types.is_empty() {
        return Err(ConfigError::Validation(
            "html-content-types must name at least one media type".to_string(),
        ));
    }

    if rules.query_mapped_keys.iter().any(|key| key.is_empty()) {
        return Err(ConfigError::Validation(
            "query-mapped-keys cannot contain an empty key".to_string(),
        ));
    }

    for extension in &rules.parse_extensions {
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "parse-extensions entries must look like '.html', got '{}'",
                extension
            )));
        }
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(http: &HttpConfig) -> Result<(), ConfigError> {
    if http.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if http.timeout_secs == 0 || http.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout-secs={} connect-timeout-secs={}",
            http.timeout_secs, http.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates state and report locations
fn validate_state_config(state: &StateConfig) -> Result<(), ConfigError> {
    if state.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache-dir cannot be empty".to_string(),
        ));
    }

    if state.report_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "report-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
