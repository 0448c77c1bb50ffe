//! Stores for the shellcheck binaries bundled with the tool.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

/// Source of pre-packaged binaries, addressed by
/// [`Architecture::embedded_bin_path`](shellcheck_schema::Architecture::embedded_bin_path).
#[async_trait]
pub trait EmbeddedResources: Send + Sync + std::fmt::Debug {
    /// Bytes of `resource`, or `None` when nothing is bundled under that name.
    async fn load(&self, resource: &str) -> std::io::Result<Option<Vec<u8>>>;
}

/// Binaries shipped as files under a directory, e.g. `resources/` next to
/// the executable.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    /// Serve resources from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, resource: &str) -> PathBuf {
        resource
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

#[async_trait]
impl EmbeddedResources for DirectoryResources {
    async fn load(&self, resource: &str) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.locate(resource)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Binaries compiled into the executable with `include_bytes!`.
///
/// ```
/// use shellcheck_core::resources::StaticResources;
///
/// static FAKE: &[u8] = b"#!/bin/sh\n";
/// let resources = StaticResources::default()
///     .with("shellcheck-bin/linux/x86_64/shellcheck", FAKE);
/// assert_eq!(resources.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HashMap<String, &'static [u8]>,
}

impl StaticResources {
    /// Register `bytes` under `resource`.
    pub fn with(mut self, resource: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.entries.insert(resource.into(), bytes);
        self
    }

    /// Number of bundled resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bundled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EmbeddedResources for StaticResources {
    async fn load(&self, resource: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(resource).map(|bytes| bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn directory_maps_resource_segments() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("shellcheck-bin").join("linux").join("shellcheck");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, b"bin").unwrap();

        let resources = DirectoryResources::new(tmp.path());
        let bytes = resources.load("shellcheck-bin/linux/shellcheck").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"bin"[..]));
        assert!(resources.load("shellcheck-bin/darwin/shellcheck").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_lookup_is_exact() {
        let resources = StaticResources::default().with("a/b", b"x");
        assert!(resources.load("a/b").await.unwrap().is_some());
        assert!(resources.load("a/B").await.unwrap().is_none());
    }
}
