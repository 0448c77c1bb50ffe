//! The fetch-and-extract collaborator used by the download strategy.
//!
//! The resolver only knows the [`Fetcher`] trait. Retrieval, caching and
//! archive formats are the implementation's business; [`HttpFetcher`] is
//! the one shipped with the `network` feature.

#[cfg(feature = "network")]
pub mod extract;
#[cfg(feature = "network")]
pub mod http;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "network")]
pub use http::HttpFetcher;

#[derive(Error, Debug)]
pub enum FetchError {
    #[cfg(feature = "network")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("{0}")]
    Other(String),
}

/// What to retrieve and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Archive (or raw file) URL.
    pub url: String,
    /// Directory the archive is unpacked into.
    pub unpack_directory: PathBuf,
    /// Unpack the archive; when false the file is copied as-is.
    pub unpack: bool,
}

impl FetchRequest {
    /// Request that unpacks `url` into `unpack_directory`.
    pub fn unpack(url: impl Into<String>, unpack_directory: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            unpack_directory: unpack_directory.into(),
            unpack: true,
        }
    }
}

/// Retrieves an archive (with caching) and unpacks it.
///
/// Implementations own their retry and timeout policy; the resolver calls
/// this exactly once per download resolution.
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Fetch `request.url` and materialize it in `request.unpack_directory`.
    async fn fetch_and_extract(&self, request: &FetchRequest) -> Result<(), FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch_and_extract(&self, request: &FetchRequest) -> Result<(), FetchError> {
        (**self).fetch_and_extract(request).await
    }
}
