//! Default fetch-and-extract collaborator: HTTP download with an on-disk
//! cache, followed by extraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::extract::{self, ArchiveFormat};
use super::{FetchError, FetchRequest, Fetcher};
use crate::paths::filename_from_url;
use crate::{NullReporter, Reporter};

/// Request timeout used by [`HttpFetcher::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Downloads archives over HTTP(S), caches them by URL and unpacks them.
///
/// A URL that is already cached is not downloaded again, unless the cached
/// archive cannot be unpacked: that entry is discarded and fetched once more.
/// Downloads land in a temporary file next to the cache entry and are only
/// moved into place once complete.
pub struct HttpFetcher {
    client: Client,
    cache_dir: PathBuf,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Fetcher caching into `cache_dir` with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        Self::with_timeout(cache_dir, DEFAULT_TIMEOUT)
    }

    /// Fetcher with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn with_timeout(cache_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            reporter: Arc::new(NullReporter),
        })
    }

    /// Report download and extraction progress to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Cache directory archives are stored in.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache entry for `url`: `<sha256(url) prefix>-<file name>`.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let name = match filename_from_url(url) {
            "" => "download",
            name => name,
        };
        self.cache_dir.join(format!("{}-{name}", &digest[..16]))
    }

    /// Return the cached archive for `url`, downloading it first if needed.
    ///
    /// The flag is true when the archive came from the cache.
    async fn retrieve(&self, url: &str) -> Result<(PathBuf, bool), FetchError> {
        let cached = self.cache_path(url);
        if tokio::fs::try_exists(&cached).await? {
            debug!(url, path = %cached.display(), "Using cached archive");
            self.reporter.cached(url, &cached);
            return Ok((cached, true));
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        info!(url, "Downloading shellcheck archive");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length();
        let partial = tempfile::Builder::new()
            .prefix(".partial-")
            .tempfile_in(&self.cache_dir)?;
        let mut file = tokio::fs::File::from_std(partial.as_file().try_clone()?);
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        self.reporter.downloading(url, 0, total);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            self.reporter.downloading(url, downloaded, total);
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        partial.persist(&cached).map_err(|e| FetchError::Io(e.error))?;
        debug!(url, bytes = downloaded, path = %cached.display(), "Cached archive");
        Ok((cached, false))
    }

    async fn unpack_into(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        dest: &Path,
    ) -> Result<(), FetchError> {
        self.reporter.extracting(archive, dest);
        debug!(?format, dest = %dest.display(), "Unpacking archive");
        extract::unpack(archive, format, dest).await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_and_extract(&self, request: &FetchRequest) -> Result<(), FetchError> {
        let (archive, from_cache) = self.retrieve(&request.url).await?;
        let dest = &request.unpack_directory;
        tokio::fs::create_dir_all(dest).await?;

        let name = filename_from_url(&request.url);
        if !request.unpack {
            tokio::fs::copy(&archive, dest.join(name)).await?;
            return Ok(());
        }

        let format = ArchiveFormat::detect(name)
            .ok_or_else(|| FetchError::UnsupportedArchive(name.to_string()))?;
        match self.unpack_into(&archive, format, dest).await {
            Err(e) if from_cache => {
                warn!(url = %request.url, error = %e, "Discarding unreadable cached archive");
                self.reporter.warning(&format!(
                    "cached archive {} could not be unpacked ({e}), downloading again",
                    archive.display()
                ));
                tokio::fs::remove_file(&archive).await?;
                let (archive, _) = self.retrieve(&request.url).await?;
                self.unpack_into(&archive, format, dest).await
            }
            result => result,
        }
    }
}
