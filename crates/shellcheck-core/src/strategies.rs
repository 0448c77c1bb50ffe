//! The three ways of getting hold of a shellcheck binary.
//!
//! Each strategy only produces a candidate path. The resolver hands every
//! candidate to [`verify`](crate::verify::verify) before returning it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shellcheck_schema::{Architecture, DownloadUrlOverrides};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::ResolveError;
use crate::fetch::{FetchRequest, Fetcher};
use crate::paths::PathLayout;
use crate::resources::EmbeddedResources;
use crate::verify::{self, make_executable};

#[async_trait]
pub trait Strategy: Send + Sync {
    /// Produce a candidate binary path for `arch`. No internal retries.
    async fn acquire(&self, arch: &Architecture) -> Result<PathBuf, ResolveError>;
}

/// Use a binary the caller already has. Never touches the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct ExternalStrategy<'a> {
    path: Option<&'a Path>,
}

impl<'a> ExternalStrategy<'a> {
    /// Validate `path` (if any) when acquiring.
    pub fn new(path: Option<&'a Path>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Strategy for ExternalStrategy<'_> {
    async fn acquire(&self, arch: &Architecture) -> Result<PathBuf, ResolveError> {
        let unusable = || ResolveError::ExternalUnusable {
            path: self.path.map(Path::to_path_buf),
        };
        let path = self.path.ok_or_else(unusable)?;

        // The execute bit only counts on Unix-like systems.
        verify::probe(arch, path).await.map_err(|reason| {
            debug!(path = %path.display(), ?reason, "External binary rejected");
            unusable()
        })?;
        Ok(path.to_path_buf())
    }
}

/// Fetch the release archive through the injected [`Fetcher`] and pick the
/// binary from its conventional location.
#[derive(Debug, Clone, Copy)]
pub struct DownloadStrategy<'a> {
    fetcher: &'a dyn Fetcher,
    layout: &'a PathLayout,
    overrides: &'a DownloadUrlOverrides,
}

impl<'a> DownloadStrategy<'a> {
    /// Download into `layout`'s output directory using `fetcher`.
    pub fn new(
        fetcher: &'a dyn Fetcher,
        layout: &'a PathLayout,
        overrides: &'a DownloadUrlOverrides,
    ) -> Self {
        Self {
            fetcher,
            layout,
            overrides,
        }
    }
}

#[async_trait]
impl Strategy for DownloadStrategy<'_> {
    async fn acquire(&self, arch: &Architecture) -> Result<PathBuf, ResolveError> {
        let url = arch.download_url(self.overrides);
        let output_dir = self
            .layout
            .ensure_output_dir()
            .await
            .map_err(|e| ResolveError::staging(self.layout.output_dir(), e))?;

        debug!(url, dest = %output_dir.display(), "Delegating download");
        let request = FetchRequest::unpack(url, output_dir);
        self.fetcher
            .fetch_and_extract(&request)
            .await
            .map_err(|source| ResolveError::Fetch {
                url: url.to_string(),
                source,
            })?;

        // Only the conventional location counts; the unpacked tree is not searched.
        let expected = self.layout.downloaded_binary_path(arch);
        if !tokio::fs::try_exists(&expected).await.unwrap_or(false) {
            return Err(ResolveError::MissingAfterFetch { path: expected });
        }

        make_executable(arch, &expected)
            .await
            .map_err(|e| ResolveError::staging(&expected, e))?;
        Ok(expected)
    }
}

/// Copy the binary bundled with the tool into the plugin output directory.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedStrategy<'a> {
    resources: &'a dyn EmbeddedResources,
    layout: &'a PathLayout,
}

impl<'a> EmbeddedStrategy<'a> {
    /// Copy from `resources` into `layout`'s output directory.
    pub fn new(resources: &'a dyn EmbeddedResources, layout: &'a PathLayout) -> Self {
        Self { resources, layout }
    }
}

#[async_trait]
impl Strategy for EmbeddedStrategy<'_> {
    async fn acquire(&self, arch: &Architecture) -> Result<PathBuf, ResolveError> {
        let resource = arch.embedded_bin_path();
        debug!(resource, "Looking up embedded binary");

        let bytes = self
            .resources
            .load(resource)
            .await
            .map_err(|source| ResolveError::ResourceRead {
                resource: resource.to_string(),
                source,
            })?
            .ok_or_else(|| ResolveError::NoEmbeddedBinary {
                platform_key: arch.platform_key().to_string(),
                resource: resource.to_string(),
            })?;

        let target = self.layout.embedded_binary_path(arch);
        write_replacing(&target, &bytes)
            .await
            .map_err(|e| ResolveError::staging(&target, e))?;
        debug!(path = %target.display(), bytes = bytes.len(), "Extracted embedded binary");

        make_executable(arch, &target)
            .await
            .map_err(|e| ResolveError::staging(&target, e))?;
        Ok(target)
    }
}

/// Write `bytes` to `target` through a sibling temp file, replacing any
/// existing file in one rename.
async fn write_replacing(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| std::io::Error::other("binary path has no parent directory"))?;
    tokio::fs::create_dir_all(parent).await?;

    let staged = tempfile::Builder::new()
        .prefix(".staged-")
        .tempfile_in(parent)?;
    let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resources::{DirectoryResources, StaticResources};
    use crate::testing::RecordingFetcher;
    use tempfile::TempDir;

    const LINUX_RESOURCE: &str = "shellcheck-bin/linux/x86_64/shellcheck";

    fn linux() -> Architecture {
        Architecture::for_key("Linux-amd64").unwrap()
    }

    #[tokio::test]
    async fn external_without_path_is_unusable() {
        let err = ExternalStrategy::new(None).acquire(&linux()).await.unwrap_err();
        assert!(matches!(err, ResolveError::ExternalUnusable { path: None }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn external_exec_bit_depends_on_platform() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("shellcheck");
        std::fs::write(&bin, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).unwrap();

        let strategy = ExternalStrategy::new(Some(&bin));
        let err = strategy.acquire(&linux()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let windows = Architecture::for_key("Windows-x86_64").unwrap();
        assert_eq!(strategy.acquire(&windows).await.unwrap(), bin);

        // Nothing was changed on disk.
        let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn download_uses_override_and_expected_path() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(tmp.path(), "sc");
        let fetcher = RecordingFetcher::with_file("shellcheck-v0.7.1/shellcheck", b"bin");
        let overrides: DownloadUrlOverrides =
            [("Linux-amd64", "https://mirror.example/sc.tar.xz")].into_iter().collect();

        let path = DownloadStrategy::new(&fetcher, &layout, &overrides)
            .acquire(&linux())
            .await
            .unwrap();

        assert_eq!(path, layout.downloaded_binary_path(&linux()));
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://mirror.example/sc.tar.xz");
        assert_eq!(requests[0].unpack_directory, layout.output_dir());
        assert!(requests[0].unpack);
    }

    #[tokio::test]
    async fn download_does_not_search_the_tree() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(tmp.path(), "sc");
        let fetcher = RecordingFetcher::with_file("other-dir/shellcheck", b"bin");

        let err = DownloadStrategy::new(&fetcher, &layout, &DownloadUrlOverrides::default())
            .acquire(&linux())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingAfterFetch { .. }));
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[tokio::test]
    async fn download_surfaces_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(tmp.path(), "sc");
        let fetcher = RecordingFetcher::failing("connection reset");

        let err = DownloadStrategy::new(&fetcher, &layout, &DownloadUrlOverrides::default())
            .acquire(&linux())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn embedded_missing_resource_is_distinguishable() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(tmp.path(), "sc");
        let resources = StaticResources::default();

        let err = EmbeddedStrategy::new(&resources, &layout)
            .acquire(&linux())
            .await
            .unwrap_err();
        match err {
            ResolveError::NoEmbeddedBinary {
                platform_key,
                resource,
            } => {
                assert_eq!(platform_key, "Linux-amd64");
                assert_eq!(resource, LINUX_RESOURCE);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn embedded_read_failure_names_the_resource() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(&tmp.path().join("build"), "sc");
        let root = tmp.path().join("resources");
        // A directory where the binary should be cannot be read as a file.
        std::fs::create_dir_all(root.join(LINUX_RESOURCE)).unwrap();
        let resources = DirectoryResources::new(&root);

        let err = EmbeddedStrategy::new(&resources, &layout)
            .acquire(&linux())
            .await
            .unwrap_err();
        match &err {
            ResolveError::ResourceRead { resource, .. } => assert_eq!(resource, LINUX_RESOURCE),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert!(err.to_string().contains("embedded resource"));
        assert!(!layout.output_dir().exists());
    }

    #[tokio::test]
    async fn embedded_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let layout = PathLayout::new(tmp.path(), "sc");
        let target = layout.embedded_binary_path(&linux());
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"a much longer stale binary").unwrap();

        let resources = StaticResources::default().with(LINUX_RESOURCE, b"fresh");
        let path = EmbeddedStrategy::new(&resources, &layout)
            .acquire(&linux())
            .await
            .unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"fresh");
    }
}
