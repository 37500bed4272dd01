//! Blocking HTTP downloader.
//!
//! Streams a remote resource into a local file in fixed-size chunks. No
//! resume and no request timeout: a partial file is the fetcher's problem,
//! and a hung transfer blocks the run until the process is killed.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use super::{Downloader, ProgressCallback, CHUNK_SIZE};
use crate::error::{ProvisionError, ProvisionResult};

/// HTTP-based installer downloader.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with no request timeout.
    pub fn new() -> ProvisionResult<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("multipy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProvisionError::DownloadFailed {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Stream the response body for `url` into `dest`, truncating it first.
    fn stream_download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ProvisionResult<u64> {
        let mut response =
            self.client
                .get(url)
                .send()
                .map_err(|e| ProvisionError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::DownloadFailed {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        let total_size = response.content_length().unwrap_or(0);

        let file = File::create(dest).map_err(|e| ProvisionError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut downloaded = 0u64;

        loop {
            let bytes_read =
                response
                    .read(&mut buffer)
                    .map_err(|e| ProvisionError::DownloadFailed {
                        url: url.to_string(),
                        reason: format!("read error: {}", e),
                    })?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| ProvisionError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;

            if let Some(cb) = progress {
                cb(downloaded, total_size);
            }
        }

        writer.flush().map_err(|e| ProvisionError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }
}

impl Downloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ProvisionResult<u64> {
        self.stream_download(url, dest, progress)
    }
}
