//! Error taxonomy for binary resolution.

use std::path::{Path, PathBuf};

use shellcheck_schema::ArchError;
use thiserror::Error;

use crate::fetch::FetchError;

/// Broad class of a [`ResolveError`].
///
/// Lets callers tell "we never had a candidate" (configuration), "the fetch
/// collaborator failed" (fetch) and "we had a candidate and it is broken"
/// (integrity) apart without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unsupported platform, unusable external binary, missing embedded resource.
    Configuration,
    /// Reported by the fetch-and-extract collaborator.
    Fetch,
    /// A candidate existed but is missing, unreadable or not executable.
    Integrity,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Platform(#[from] ArchError),

    #[error(
        "The external shellcheck binary has not been provided, cannot be found, or is not usable [{}]",
        describe(.path.as_deref())
    )]
    ExternalUnusable { path: Option<PathBuf> },

    #[error("No embedded shellcheck binary for platform [{platform_key}] (looked for [{resource}])")]
    NoEmbeddedBinary {
        platform_key: String,
        resource: String,
    },

    #[error("Failed to read embedded resource [{resource}]: {source}")]
    ResourceRead {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetching [{url}] failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Could not find extracted file [{}]", .path.display())]
    MissingAfterFetch { path: PathBuf },

    #[error("Resolved file [{}] does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("Resolved file [{}] is not readable: {source}", .path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resolved file [{}] is not executable", .path.display())]
    NotExecutable { path: PathBuf },

    #[error("Failed to stage [{}]: {source}", .path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Platform(_) | Self::ExternalUnusable { .. } | Self::NoEmbeddedBinary { .. } => {
                ErrorKind::Configuration
            }
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::MissingAfterFetch { .. }
            | Self::NotFound { .. }
            | Self::NotReadable { .. }
            | Self::NotExecutable { .. }
            | Self::ResourceRead { .. }
            | Self::Staging { .. } => ErrorKind::Integrity,
        }
    }

    /// Wrap an I/O failure on `path` while writing or chmod-ing a candidate.
    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "not configured".to_string(), |p| p.display().to_string())
}
