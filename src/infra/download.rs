//! Source archive downloads
//!
//! Fetches archives over HTTP with retry and exponential backoff, hashing
//! the payload while it streams. Archives are cached under a name derived
//! from the URL, so a second build of the same version skips the network.

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Upper bound for the backoff delay
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// A downloaded archive
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the archive
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA-256 of the content
    pub checksum: String,
}

/// Download manager for fetching files with retry
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: reqwest::Client,
    max_retries: u32,
    base_delay_ms: u64,
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self::with_config(
            defaults::MAX_DOWNLOAD_RETRIES,
            defaults::DOWNLOAD_RETRY_BASE_DELAY_MS,
        )
    }

    /// Create a download manager with custom retry settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            max_retries,
            base_delay_ms,
        }
    }

    /// Get max retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Download a file with retry logic
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;

            match self.download_once(url, dest).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!("Download attempt {attempts}/{} failed: {e}", self.max_retries);
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(MAX_RETRY_DELAY_MS);
                    }
                }
            }
        }

        // Clean up partial download on failure
        let _ = tokio::fs::remove_file(dest).await;

        Err(last_error.unwrap_or_else(|| DownloadError::MaxRetriesExceeded {
            url: url.to_string(),
            retries: self.max_retries,
        }))
    }

    async fn download_once(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::debug!("Downloaded {downloaded} bytes from {url}");
        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum: hex::encode(hasher.finalize()),
        })
    }

    /// Download a file and verify its checksum
    ///
    /// A mismatching download is deleted.
    pub async fn download_verified(
        &self,
        url: &str,
        dest: &Path,
        expected_checksum: &str,
    ) -> Result<DownloadResult, DownloadError> {
        let result = self.download(url, dest).await?;

        if !result.checksum.eq_ignore_ascii_case(expected_checksum) {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(DownloadError::ChecksumFailed {
                file: dest.display().to_string(),
            });
        }

        Ok(result)
    }

    /// Fetch an archive into the cache directory
    ///
    /// A cached archive is reused when it exists and, if a checksum is
    /// given, matches it; otherwise it is downloaded again.
    pub async fn fetch_cached(
        &self,
        url: &str,
        cache_dir: &Path,
        expected_checksum: Option<&str>,
    ) -> Result<PathBuf, DownloadError> {
        let dest = cache_dir.join(cache_file_name(url));

        if dest.exists() {
            let valid = match expected_checksum {
                Some(expected) => verify_checksum(&dest, expected)?,
                None => true,
            };
            if valid {
                tracing::info!("Using cached {}", dest.display());
                return Ok(dest);
            }
            tracing::warn!(
                "Cached {} does not match its checksum, downloading again",
                dest.display()
            );
        }

        tracing::info!("Downloading {url}");
        let result = match expected_checksum {
            Some(expected) => self.download_verified(url, &dest, expected).await?,
            None => self.download(url, &dest).await?,
        };
        Ok(result.path)
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache file name for a URL: a short URL hash plus the archive's own name
///
/// Keeps the extension so `tar` can pick the decompressor.
pub fn cache_file_name(url: &str) -> String {
    let digest = compute_checksum(url.as_bytes());
    let base = url
        .split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|b| !b.is_empty())
        .unwrap_or("archive");
    format!("{}-{base}", &digest[..16])
}

/// Verify SHA-256 checksum of a file
pub fn verify_checksum(path: &Path, expected: &str) -> Result<bool, DownloadError> {
    let content = std::fs::read(path).map_err(|e| DownloadError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(compute_checksum(&content).eq_ignore_ascii_case(expected))
}

/// Compute SHA-256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
