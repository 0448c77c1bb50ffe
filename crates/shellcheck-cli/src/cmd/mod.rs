//! Command modules - one file per CLI command

pub mod arch;
pub mod check;
pub mod completions;
pub mod resolve;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use shellcheck_core::fetch::HttpFetcher;
use shellcheck_core::resources::DirectoryResources;
use shellcheck_core::{Reporter, Resolver, try_cache_path, try_resources_path};

use crate::ResolveOpts;
use crate::ui::StderrReporter;

/// Build a resolver from the config file, the flags and the environment.
pub fn build_resolver(
    config_path: Option<&Path>,
    opts: &ResolveOpts,
    quiet: bool,
) -> Result<Resolver> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let config = crate::config::load(config_path, &cwd)?;
    let config = crate::config::apply(config, opts, &cwd);

    let reporter: Arc<dyn Reporter> = Arc::new(StderrReporter::new(quiet));

    let cache_dir = opts
        .cache_dir
        .clone()
        .or_else(try_cache_path)
        .context("Could not determine a cache directory. Set SHELLCHECK_RESOLVER_CACHE.")?;
    let fetcher = HttpFetcher::with_timeout(cache_dir, Duration::from_secs(opts.timeout))
        .context("Failed to set up the HTTP client")?
        .with_reporter(reporter.clone());

    let resources_dir = opts
        .resources_dir
        .clone()
        .or_else(try_resources_path)
        .context("Could not locate bundled binaries. Set SHELLCHECK_RESOLVER_RESOURCES.")?;
    let resources = DirectoryResources::new(resources_dir);

    let resolver = Resolver::new(config, Arc::new(fetcher), Arc::new(resources))?;
    Ok(resolver.with_reporter(reporter))
}
