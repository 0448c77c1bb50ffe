use std::path::{Path, PathBuf};

use dirs::cache_dir;
use shellcheck_schema::{Architecture, BINARY_NAME, ResolverConfig};

/// Environment variable overriding the download cache directory.
pub const CACHE_ENV: &str = "SHELLCHECK_RESOLVER_CACHE";

/// Environment variable overriding the embedded resource directory.
pub const RESOURCES_ENV: &str = "SHELLCHECK_RESOLVER_RESOURCES";

/// On-disk locations used while staging a binary.
///
/// Everything is derived from the build output root, so the same root and
/// [`Architecture`] always produce the same paths.
///
/// ```text
/// <build_root>/
/// └── <plugin_dir>/
///     ├── shellcheck[.exe]          # embedded copy
///     └── shellcheck-v0.7.1/...     # unpacked release archive
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    output_dir: PathBuf,
}

impl PathLayout {
    /// Layout for `<build_root>/<plugin_dir>`.
    pub fn new(build_root: &Path, plugin_dir: &str) -> Self {
        Self {
            output_dir: build_root.join(plugin_dir),
        }
    }

    /// Layout described by a resolver configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.build_root, &config.plugin_dir)
    }

    /// The plugin output directory. Not created by this call.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the plugin output directory if it is missing.
    ///
    /// Succeeds when the directory already exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be created.
    pub async fn ensure_output_dir(&self) -> std::io::Result<&Path> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(&self.output_dir)
    }

    /// Path of a named file inside the plugin output directory.
    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Where the embedded binary is copied to: `shellcheck` plus the platform suffix.
    pub fn embedded_binary_path(&self, arch: &Architecture) -> PathBuf {
        self.binary_path(&format!("{BINARY_NAME}{}", arch.executable_suffix()))
    }

    /// Where an unpacked release archive puts the binary for `arch`.
    pub fn downloaded_binary_path(&self, arch: &Architecture) -> PathBuf {
        arch.archive_binary_path()
            .split('/')
            .fold(self.output_dir.clone(), |path, part| path.join(part))
    }
}

/// Download cache directory, or None if no cache location can be resolved.
///
/// `SHELLCHECK_RESOLVER_CACHE` wins over the platform cache directory.
pub fn try_cache_path() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(CACHE_ENV) {
        return Some(PathBuf::from(val));
    }
    cache_dir().map(|c| c.join("shellcheck-resolver"))
}

/// Directory the bundled binaries ship in.
///
/// `SHELLCHECK_RESOLVER_RESOURCES` wins; otherwise `resources/` next to the
/// running executable.
pub fn try_resources_path() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(RESOURCES_ENV) {
        return Some(PathBuf::from(val));
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
}

/// Extract the filename from a URL, ignoring any query string or fragment.
pub fn filename_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.split('/').next_back().unwrap_or("")
}
