//! Configuration file discovery and flag merging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shellcheck_schema::{BINARY_NAME, ResolutionMethod, ResolverConfig};
use tracing::debug;

use crate::ResolveOpts;

/// Name of the configuration file looked up from the working directory.
pub const CONFIG_FILE: &str = "shellcheck-resolver.toml";

/// Walk up from `start` looking for [`CONFIG_FILE`].
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Load the configuration: the explicit file, else the nearest one, else defaults.
///
/// Relative `build_root` and `external_binary_path` values are taken relative
/// to the file's directory (or `cwd` without a file).
pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<ResolverConfig> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(|| find_config(cwd)) else {
        debug!("No {CONFIG_FILE} found, using defaults");
        return Ok(ResolverConfig::default().rooted_at(cwd));
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ResolverConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(path = %path.display(), method = %config.method, "Loaded configuration");

    let base = path.parent().unwrap_or(cwd);
    Ok(config.rooted_at(base))
}

/// Apply command-line flags on top of the file configuration.
///
/// For the external method without a configured binary, `shellcheck` is
/// looked up on `PATH`.
pub fn apply(mut config: ResolverConfig, opts: &ResolveOpts, cwd: &Path) -> ResolverConfig {
    if let Some(method) = opts.method {
        config.method = method;
    }
    if let Some(path) = &opts.external_path {
        config.external_binary_path = Some(cwd.join(path));
    }
    if let Some(root) = &opts.build_root {
        config.build_root = cwd.join(root);
    }
    for (key, url) in &opts.overrides {
        config.download_url_overrides.insert(key.as_str(), url.as_str());
    }

    if config.method == ResolutionMethod::External && config.external_binary_path.is_none() {
        config.external_binary_path = which::which(BINARY_NAME).ok();
        debug!(found = ?config.external_binary_path, "Looked up shellcheck on PATH");
    }
    config
}
