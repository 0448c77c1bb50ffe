//! Resolve command

use std::path::Path;

use anyhow::Result;

use crate::ResolveOpts;

/// Resolve the binary and print its path on stdout.
pub async fn resolve(config: Option<&Path>, opts: &ResolveOpts, quiet: bool) -> Result<()> {
    let resolver = super::build_resolver(config, opts, quiet)?;
    let binary = resolver.resolve_configured().await?;
    println!("{binary}");
    Ok(())
}
