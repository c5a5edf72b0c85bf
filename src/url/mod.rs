//! URL handling module for Site-Mirror
//!
//! This module decomposes raw URLs found in markup, decides whether they point
//! at the mirrored site, and maps in-scope subpaths onto file paths.

mod matcher;
mod parts;
mod path_map;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use matcher::{is_accepted_authority, is_accepted_host, matches_hostname};
pub use parts::{parse_url, UrlParts};
pub use path_map::{parse_query, strip_fragment, PathMapper, QueryParam, INDEX_FILENAME};

/// URL classification types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrlClassification {
    /// Empty or fragment-only URL - not classified at all
    Ignored,
    /// URL on a host that is not mirrored - recorded but dropped
    External { host: String },
    /// URL on the mirrored site - its subpath joins the frontier
    Local { subpath: String },
}

impl UrlClassification {
    /// Returns true if the URL points at the mirrored site
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// Returns the in-scope subpath, if any
    pub fn subpath(&self) -> Option<&str> {
        match self {
            Self::Local { subpath } => Some(subpath),
            _ => None,
        }
    }
}

/// Classifies a raw URL against the accepted hostnames
///
/// # Rules
///
/// 1. An empty URL or one starting with `#` is ignored
/// 2. A URL without a host is relative and always local
/// 3. A URL whose host matches an accepted hostname is local
/// 4. Everything else is external
///
/// # Examples
///
/// ```
/// use site_mirror::url::{classify_url, UrlClassification};
///
/// let hostnames = vec!["example.org".to_string()];
/// assert_eq!(
///     classify_url("/x", &hostnames),
///     UrlClassification::Local { subpath: "/x".to_string() }
/// );
/// assert!(!classify_url("//otherhost/x", &hostnames).is_local());
/// assert_eq!(classify_url("#top", &hostnames), UrlClassification::Ignored);
/// ```
pub fn classify_url(raw: &str, hostnames: &[String]) -> UrlClassification {
    if raw.is_empty() || raw.starts_with('#') {
        return UrlClassification::Ignored;
    }

    let parts = parse_url(raw);
    if parts.is_relative() || is_accepted_authority(parts.host, parts.port, hostnames) {
        UrlClassification::Local {
            subpath: parts.subpath.to_string(),
        }
    } else {
        UrlClassification::External {
            host: parts.host.to_string(),
        }
    }
}

/// Resolves a `Location` header value against the URL that was requested
///
/// Absolute locations come back unchanged apart from `url` normalisation;
/// relative ones are joined onto `base`.
pub fn resolve_location(base: &str, location: &str) -> Result<String, UrlError> {
    let base_url = Url::parse(base).map_err(|source| UrlError::Parse {
        url: base.to_string(),
        source,
    })?;

    base_url
        .join(location)
        .map(|resolved| resolved.to_string())
        .map_err(|source| UrlError::InvalidLocation {
            location: location.to_string(),
            base: base.to_string(),
            source,
        })
}
