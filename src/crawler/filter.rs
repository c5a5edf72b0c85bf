//! Ignore rules for local subpaths
//!
//! Subpaths matching an ignored prefix or pattern are marked handled without a
//! request. Prefixes are checked first, then patterns in configuration order.

use crate::config::RulesConfig;
use crate::ConfigError;
use regex::Regex;
use std::fmt;

/// Why a subpath was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The subpath starts with this prefix
    Prefix(String),
    /// The subpath matches this regular expression
    Pattern(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "ignored prefix {}", prefix),
            Self::Pattern(pattern) => write!(f, "ignored pattern {}", pattern),
        }
    }
}

/// Compiled ignore rules
#[derive(Debug, Clone, Default)]
pub struct SubpathFilter {
    prefixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl SubpathFilter {
    /// Compiles the ignore rules of the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for a pattern that does not compile.
    pub fn from_rules(rules: &RulesConfig) -> Result<Self, ConfigError> {
        let patterns = rules
            .ignored_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            prefixes: rules.ignored_prefixes.clone(),
            patterns,
        })
    }

    /// Returns the first rule that ignores the subpath, if any
    ///
    /// Patterns are searched anywhere in the subpath; anchor them with `^`
    /// to match from the start.
    pub fn check(&self, subpath: &str) -> Option<IgnoreReason> {
        if let Some(prefix) = self.prefixes.iter().find(|p| subpath.starts_with(p.as_str())) {
            return Some(IgnoreReason::Prefix(prefix.clone()));
        }

        self.patterns
            .iter()
            .find(|pattern| pattern.is_match(subpath))
            .map(|pattern| IgnoreReason::Pattern(pattern.as_str().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.patterns.is_empty()
    }
}
