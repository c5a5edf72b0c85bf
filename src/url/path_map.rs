//! Deterministic mapping of in-scope subpaths onto file paths
//!
//! # Mapping Steps
//!
//! 1. Split the subpath on `/`; the last segment is the candidate filename,
//!    the rest are directory segments (`.` dropped, `..` pops, clamped at the
//!    target folder)
//! 2. Split the query string off the filename at the first `?`; a `#` before
//!    any `?` starts a fragment and is dropped together with what follows
//! 3. Truncate the query string at the first `#` not preceded by `&`
//! 4. Parse the query string into ordered `key=value` pairs, dropping empty keys
//! 5. A non-empty filename is used as-is and the query string is discarded
//! 6. An empty filename without query parameters becomes `index.html`
//! 7. An empty filename with query parameters needs exactly one filename-mapped
//!    key: the key becomes a directory and the file is `{value}.html`
//! 8. Everything is joined under the target folder
//!
//! Step 5 is lossy on purpose: `/page.php?a=1` and `/page.php?a=2` share one
//! file, and the second fetch becomes a logged collision.

use crate::MappingError;
use std::path::{Path, PathBuf};

/// Filename used for subpaths that end in `/` and carry no query
pub const INDEX_FILENAME: &str = "index.html";

/// One `key=value` pair of a query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParam<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// Maps subpaths to file paths under a target folder
///
/// The mapping is a pure function of the subpath, the target folder and the
/// list of filename-mapped query keys.
#[derive(Debug, Clone)]
pub struct PathMapper {
    target_folder: PathBuf,
    mapped_keys: Vec<String>,
}

impl PathMapper {
    /// Creates a mapper for the given target folder and filename-mapped query keys
    pub fn new(target_folder: impl Into<PathBuf>, mapped_keys: Vec<String>) -> Self {
        Self {
            target_folder: target_folder.into(),
            mapped_keys,
        }
    }

    /// The folder every mapped path lives under
    pub fn target_folder(&self) -> &Path {
        &self.target_folder
    }

    /// Maps a subpath to its file path
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::url::PathMapper;
    /// use std::path::Path;
    ///
    /// let mapper = PathMapper::new("site", vec!["page_id".to_string()]);
    /// assert_eq!(mapper.map("/").unwrap(), Path::new("site/index.html"));
    /// assert_eq!(
    ///     mapper.map("/forum/?page_id=5").unwrap(),
    ///     Path::new("site/forum/page_id/5.html")
    /// );
    /// assert!(mapper.map("/forum/?foo=1&bar=2").is_err());
    /// ```
    pub fn map(&self, subpath: &str) -> Result<PathBuf, MappingError> {
        let (directories, last) = subpath.rsplit_once('/').unwrap_or(("", subpath));
        let (filename, query) = split_filename(last);

        let mut segments = resolve_segments(directories.split('/'));
        let mut filename = filename.to_string();

        // A trailing dot segment names a directory, not a file
        if filename == "." || filename == ".." {
            segments = resolve_segments(
                segments
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(filename.as_str())),
            );
            filename.clear();
        }

        if filename.is_empty() {
            let params = parse_query(query);
            if params.is_empty() {
                filename = INDEX_FILENAME.to_string();
            } else {
                let (key, value) = self.mapped_param(subpath, &params)?;
                segments.push(key.to_string());
                filename = format!("{}.html", value);
            }
        }

        let mut path = self.target_folder.clone();
        path.extend(&segments);
        path.push(filename);
        Ok(path)
    }

    /// Finds the single filename-mapped query parameter
    fn mapped_param<'a>(
        &self,
        subpath: &str,
        params: &[QueryParam<'a>],
    ) -> Result<(&'a str, &'a str), MappingError> {
        let mapped: Vec<&QueryParam<'a>> = params
            .iter()
            .filter(|param| self.mapped_keys.iter().any(|key| key == param.key))
            .collect();

        match mapped.as_slice() {
            [param] => match param.value {
                Some(value) if !value.is_empty() => Ok((param.key, value)),
                _ => Err(MappingError::EmptyMappedValue {
                    subpath: subpath.to_string(),
                    key: param.key.to_string(),
                }),
            },
            [] => Err(MappingError::NoMappedKey {
                subpath: subpath.to_string(),
                keys: params.iter().map(|p| p.key.to_string()).collect(),
            }),
            _ => Err(MappingError::AmbiguousMappedKey {
                subpath: subpath.to_string(),
                keys: mapped.iter().map(|p| p.key.to_string()).collect(),
            }),
        }
    }
}

/// Splits the last subpath segment into filename and fragment-free query string
fn split_filename(last: &str) -> (&str, &str) {
    let question = last.find('?');
    let hash = last.find('#');

    match (question, hash) {
        (Some(q), Some(h)) if h < q => (&last[..h], ""),
        (Some(q), _) => (&last[..q], strip_fragment(&last[q + 1..])),
        (None, Some(h)) => (&last[..h], ""),
        (None, None) => (last, ""),
    }
}

/// Truncates a query string at the first `#` that does not follow an `&`
pub fn strip_fragment(query: &str) -> &str {
    let mut last = None;
    for (index, c) in query.char_indices() {
        if c == '#' && last != Some('&') {
            return &query[..index];
        }
        last = Some(c);
    }
    query
}

/// Parses a query string into ordered pairs, dropping pairs with an empty key
pub fn parse_query(query: &str) -> Vec<QueryParam<'_>> {
    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            (!key.is_empty()).then_some(QueryParam { key, value })
        })
        .collect()
}

/// Resolves `.` and `..` directory segments, never climbing above the root
fn resolve_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();

    for segment in segments {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                resolved.pop();
            }
            _ => resolved.push(segment.to_string()),
        }
    }

    resolved
}
