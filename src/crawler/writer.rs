//! Write-once file sink
//!
//! Every mapped file path is written at most once per crawl state: the first
//! writer wins and later writers short-circuit. In verify mode nothing is
//! written; existing files are compared against the fresh download instead.
//!
//! HTML arrives as a buffer because it is scanned for URLs anyway; everything
//! else is streamed from the response body straight into the file.

use crate::crawler::fetcher::{ResponseBody, TransportError};
use crate::state::CrawlState;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors raised while streaming a body to disk
#[derive(Debug, Error)]
pub enum StreamError {
    /// The body could not be read; nothing is left on disk
    #[error(transparent)]
    Body(#[from] TransportError),

    /// The file could not be written
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What happened to a file handed to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content was written to disk
    Written,
    /// The path was already written; nothing was done
    AlreadyWritten,
    /// Verify mode: the file exists with the expected length
    Verified,
    /// Verify mode: the file does not exist
    Missing,
    /// Verify mode: the file exists with a different length
    Mismatch,
}

/// Files found wrong in verify mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub missing: BTreeSet<PathBuf>,
    pub mismatch: BTreeSet<PathBuf>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.mismatch.is_empty()
    }
}

/// Writes downloaded content under the target folder
#[derive(Debug, Default)]
pub struct FileSink {
    verify_only: bool,
    report: VerifyReport,
}

impl FileSink {
    /// Creates a sink; with `verify_only` set, files are compared instead of written
    pub fn new(verify_only: bool) -> Self {
        Self {
            verify_only,
            report: VerifyReport::default(),
        }
    }

    pub fn is_verify_only(&self) -> bool {
        self.verify_only
    }

    /// Writes `content` to `path` unless the path was already written
    ///
    /// Parent directories are created as needed. The path is recorded in the
    /// state's written files on success, and in verify mode for every checked
    /// path, so a second subpath mapping to the same file short-circuits.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be written or, in
    /// verify mode, inspected.
    pub fn write(
        &mut self,
        state: &mut CrawlState,
        path: &Path,
        content: &[u8],
    ) -> io::Result<WriteOutcome> {
        if state.is_written(path) {
            return Ok(WriteOutcome::AlreadyWritten);
        }

        if self.verify_only {
            let outcome = self.verify(path, content.len() as u64)?;
            state.mark_written(path);
            return Ok(outcome);
        }

        tracing::debug!("Writing file {}", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        state.mark_written(path);

        Ok(WriteOutcome::Written)
    }

    /// Streams `body` into `path` unless the path was already written
    ///
    /// Behaves like [`FileSink::write`], but only one chunk is held in memory at
    /// a time. In verify mode the body is drained and only its length is kept.
    /// A body that fails mid-stream leaves no partial file behind and the path
    /// is not recorded as written.
    pub async fn write_stream<B: ResponseBody>(
        &mut self,
        state: &mut CrawlState,
        path: &Path,
        body: &mut B,
    ) -> Result<WriteOutcome, StreamError> {
        if state.is_written(path) {
            return Ok(WriteOutcome::AlreadyWritten);
        }

        if self.verify_only {
            let mut length = 0u64;
            while let Some(chunk) = body.chunk().await? {
                length += chunk.len() as u64;
            }
            let outcome = self.verify(path, length)?;
            state.mark_written(path);
            return Ok(outcome);
        }

        tracing::debug!("Streaming file {}", path.display());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(path).await?;
        if let Err(e) = copy_body(&mut file, body).await {
            drop(file);
            if let Err(remove) = tokio::fs::remove_file(path).await {
                tracing::debug!("Cannot remove partial file {}: {}", path.display(), remove);
            }
            return Err(e);
        }
        state.mark_written(path);

        Ok(WriteOutcome::Written)
    }

    /// Compares the existing file's length with the downloaded length
    fn verify(&mut self, path: &Path, length: u64) -> io::Result<WriteOutcome> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Missing file {}", path.display());
                self.report.missing.insert(path.to_path_buf());
                return Ok(WriteOutcome::Missing);
            }
            Err(e) => return Err(e),
        };

        if metadata.len() != length {
            tracing::debug!(
                "Length mismatch for {}: {} on disk, {} downloaded",
                path.display(),
                metadata.len(),
                length
            );
            self.report.mismatch.insert(path.to_path_buf());
            return Ok(WriteOutcome::Mismatch);
        }

        Ok(WriteOutcome::Verified)
    }

    /// Files found missing or mismatched so far
    pub fn report(&self) -> &VerifyReport {
        &self.report
    }

    pub fn into_report(self) -> VerifyReport {
        self.report
    }
}

async fn copy_body<B: ResponseBody>(
    file: &mut tokio::fs::File,
    body: &mut B,
) -> Result<(), StreamError> {
    while let Some(chunk) = body.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}
