//! Terminal outcomes of handling a subpath
//!
//! Once a subpath is handled it never leaves that state within a run, so every
//! variant except `AlreadyHandled` is recorded exactly once per subpath.
use std::fmt;

/// Represents what happened when a subpath was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Disposition {
    // ===== Skip States =====
    /// Empty subpath (e.g. a link to the bare hostname)
    Empty,

    /// Subpath was handled earlier - re-entry is a no-op
    AlreadyHandled,

    /// Subpath matched an ignored prefix or pattern
    Ignored,

    /// Subpath maps to a file that was already written
    Collided,

    // ===== Success States =====
    /// Response was a redirect; the target was recorded, nothing written
    Redirected,

    /// HTML page written and scanned for further URLs
    WrittenHtml,

    /// Non-HTML content written unmodified
    WrittenBinary,

    /// Verify mode: existing file compared against the fresh download
    Verified,

    // ===== Error States =====
    /// Transport failure (network, DNS, timeout)
    FetchFailed,

    /// Response received but the file could not be written
    WriteFailed,

    /// No file path could be derived from the subpath's query string
    Unmappable,
}

impl Disposition {
    /// Returns true if content reached the target folder
    pub fn is_written(&self) -> bool {
        matches!(self, Self::WrittenHtml | Self::WrittenBinary)
    }

    /// Returns true if the subpath was skipped without a request
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::AlreadyHandled | Self::Ignored | Self::Collided
        )
    }

    /// Returns true if the subpath failed and was not retried
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::WriteFailed | Self::Unmappable
        )
    }

    /// Returns true if a request was issued for the subpath
    pub fn was_fetched(&self) -> bool {
        matches!(
            self,
            Self::Redirected
                | Self::WrittenHtml
                | Self::WrittenBinary
                | Self::Verified
                | Self::WriteFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::AlreadyHandled => "already_handled",
            Self::Ignored => "ignored",
            Self::Collided => "collided",
            Self::Redirected => "redirected",
            Self::WrittenHtml => "written_html",
            Self::WrittenBinary => "written_binary",
            Self::Verified => "verified",
            Self::FetchFailed => "fetch_failed",
            Self::WriteFailed => "write_failed",
            Self::Unmappable => "unmappable",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Disposition; 11] = [
        Disposition::Empty,
        Disposition::AlreadyHandled,
        Disposition::Ignored,
        Disposition::Collided,
        Disposition::Redirected,
        Disposition::WrittenHtml,
        Disposition::WrittenBinary,
        Disposition::Verified,
        Disposition::FetchFailed,
        Disposition::WriteFailed,
        Disposition::Unmappable,
    ];

    #[test]
    fn test_categories_are_exclusive() {
        for disposition in ALL {
            let categories = [
                disposition.is_written(),
                disposition.is_skipped(),
                disposition.is_error(),
            ];
            assert!(
                categories.iter().filter(|c| **c).count() <= 1,
                "{} is in more than one category",
                disposition
            );
        }
    }

    #[test]
    fn test_skipped_never_fetched() {
        for disposition in ALL.into_iter().filter(Disposition::is_skipped) {
            assert!(!disposition.was_fetched());
        }
    }

    #[test]
    fn test_fetch_failed_was_not_fetched() {
        assert!(Disposition::FetchFailed.is_error());
        assert!(!Disposition::FetchFailed.was_fetched());
        assert!(Disposition::WriteFailed.was_fetched());
    }

    #[test]
    fn test_unmappable_is_an_unfetched_error() {
        assert!(Disposition::Unmappable.is_error());
        assert!(!Disposition::Unmappable.was_fetched());
        assert!(!Disposition::Unmappable.is_skipped());
    }

    #[test]
    fn test_display_names_unique() {
        let mut names: Vec<&str> = ALL.iter().map(Disposition::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
