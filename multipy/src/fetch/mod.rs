//! Integrity-checked installer downloads.
//!
//! The [`Fetcher`] turns `(url, checksum)` into a verified file in the
//! download cache:
//!
//! - The cache file is named after the URL's last path segment.
//! - An existing file is reused only when a checksum is pinned and matches.
//! - With no checksum the file is always downloaded again.
//! - A failed transfer never leaves a partial file behind.
//!
//! Transfers go through the [`Downloader`] trait so the cache logic can be
//! exercised without a network.

mod checksum;
mod http;

pub use checksum::{calculate_file_checksum, checksums_match, file_matches};
pub use http::HttpDownloader;

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::{ProvisionError, ProvisionResult};

/// Chunk size for streaming downloads and hashing (128 KiB).
pub(crate) const CHUNK_SIZE: usize = 128 * 1024;

/// Byte progress callback: `(bytes_downloaded, total_bytes)`.
///
/// `total_bytes` is 0 when the server does not report a length.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Transfers a remote resource into a local file.
pub trait Downloader {
    /// Download `url` into `dest`, replacing any existing content.
    ///
    /// Returns the number of bytes written. Implementations may leave a
    /// partial file on error; [`Fetcher`] removes it.
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ProvisionResult<u64>;
}

impl<D: Downloader + ?Sized> Downloader for &D {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ProvisionResult<u64> {
        (**self).download(url, dest, progress)
    }
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Local path of the verified installer.
    pub path: PathBuf,
    /// True if an existing cache entry was reused.
    pub cache_hit: bool,
    /// Bytes transferred (0 on a cache hit).
    pub bytes_downloaded: u64,
}

/// Download cache keyed by URL file name.
pub struct Fetcher<D: Downloader> {
    downloader: D,
    cache_dir: PathBuf,
    progress: Option<ProgressCallback>,
}

impl<D: Downloader> Fetcher<D> {
    /// Create a fetcher that stores files in `cache_dir`.
    pub fn new(downloader: D, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            cache_dir: cache_dir.into(),
            progress: None,
        }
    }

    /// Report byte progress of fresh downloads to `progress`.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Return a verified local copy of `url`.
    ///
    /// See the module documentation for the reuse rules. A freshly downloaded
    /// file that does not match `expected_checksum` is deleted and reported
    /// as [`ProvisionError::ChecksumMismatch`].
    pub fn fetch(&self, url: &str, expected_checksum: Option<&str>) -> ProvisionResult<FetchOutcome> {
        match self.cached(url, expected_checksum)? {
            Some(hit) => Ok(hit),
            None => self.download(url, expected_checksum),
        }
    }

    /// The cache entry for `url`, if it can be reused as is.
    ///
    /// Only a file matching a pinned checksum qualifies.
    pub fn cached(
        &self,
        url: &str,
        expected_checksum: Option<&str>,
    ) -> ProvisionResult<Option<FetchOutcome>> {
        let filename = cache_file_name(url)?;
        let dest = self.cache_dir.join(&filename);

        let Some(expected) = expected_checksum else {
            return Ok(None);
        };
        if !dest.is_file() {
            return Ok(None);
        }
        if !file_matches(&dest, expected)? {
            tracing::info!(file = %filename, "cached file failed verification, downloading again");
            return Ok(None);
        }

        tracing::info!(file = %filename, "cache hit");
        Ok(Some(FetchOutcome {
            path: dest,
            cache_hit: true,
            bytes_downloaded: 0,
        }))
    }

    /// Download `url` into the cache, replacing any existing entry.
    pub fn download(&self, url: &str, expected_checksum: Option<&str>) -> ProvisionResult<FetchOutcome> {
        let filename = cache_file_name(url)?;

        fs::create_dir_all(&self.cache_dir).map_err(|e| ProvisionError::CreateDirFailed {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        let dest = self.cache_dir.join(&filename);

        tracing::info!(url, dest = %dest.display(), "downloading");

        let bytes_downloaded = match self
            .downloader
            .download(url, &dest, self.progress.as_ref())
        {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_partial(&dest);
                return Err(e);
            }
        };

        if let Some(expected) = expected_checksum {
            let actual = calculate_file_checksum(&dest)?;
            if !checksums_match(&actual, expected) {
                remove_partial(&dest);
                return Err(ProvisionError::ChecksumMismatch {
                    filename,
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(FetchOutcome {
            path: dest,
            cache_hit: false,
            bytes_downloaded,
        })
    }
}

/// Fetch `url` into `cache_dir` over HTTP.
///
/// Convenience wrapper around [`Fetcher`] and [`HttpDownloader`].
pub fn fetch(url: &str, expected_checksum: Option<&str>, cache_dir: &Path) -> ProvisionResult<PathBuf> {
    let fetcher = Fetcher::new(HttpDownloader::new()?, cache_dir);
    fetcher.fetch(url, expected_checksum).map(|outcome| outcome.path)
}

/// Derive the cache file name from the URL's final path segment.
pub fn cache_file_name(url: &str) -> ProvisionResult<String> {
    let parsed = Url::parse(url).map_err(|e| ProvisionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(|| ProvisionError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no file name".to_string(),
        })
}

/// Delete a partially written download, ignoring a missing file.
fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download");
        }
    }
}
