//! Read-only configuration consumed by the resolver.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DownloadUrlOverrides, ResolutionMethod};

/// Name of the directory created under the build root.
pub const DEFAULT_PLUGIN_DIR: &str = "shellcheck-resolver";

/// Default build output root, relative to the working directory.
pub const DEFAULT_BUILD_ROOT: &str = "target";

/// Everything the resolver needs to know from its caller.
///
/// Deserializes from TOML; missing keys fall back to [`ResolverConfig::default`].
///
/// ```toml
/// method = "download"
/// build_root = "out"
///
/// [download_url_overrides]
/// Linux-amd64 = "https://mirror.example/shellcheck.tar.xz"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Strategy used to obtain the binary.
    pub method: ResolutionMethod,
    /// Binary to use with [`ResolutionMethod::External`].
    pub external_binary_path: Option<PathBuf>,
    /// Download URLs replacing the built-in ones, keyed by platform.
    pub download_url_overrides: DownloadUrlOverrides,
    /// Build output root the plugin directory lives under.
    pub build_root: PathBuf,
    /// Name of the plugin directory inside `build_root`.
    pub plugin_dir: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            method: ResolutionMethod::default(),
            external_binary_path: None,
            download_url_overrides: DownloadUrlOverrides::default(),
            build_root: PathBuf::from(DEFAULT_BUILD_ROOT),
            plugin_dir: DEFAULT_PLUGIN_DIR.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Config for `method` rooted at `build_root`, everything else default.
    pub fn new(method: ResolutionMethod, build_root: impl Into<PathBuf>) -> Self {
        Self {
            method,
            build_root: build_root.into(),
            ..Self::default()
        }
    }

    /// Set the external binary path.
    pub fn with_external_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.external_binary_path = Some(path.into());
        self
    }

    /// Add a download URL override.
    pub fn with_override(mut self, platform_key: &str, url: &str) -> Self {
        self.download_url_overrides.insert(platform_key, url);
        self
    }

    /// Resolve a relative `build_root` and `external_binary_path` against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.build_root.is_relative() {
            self.build_root = base.join(&self.build_root);
        }
        if let Some(path) = self.external_binary_path.take() {
            self.external_binary_path = Some(if path.is_relative() {
                base.join(path)
            } else {
                path
            });
        }
        self
    }
}
