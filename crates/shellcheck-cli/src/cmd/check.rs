//! Check command: resolve the binary, collect scripts, run shellcheck once.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use glob::Pattern;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::ResolveOpts;

/// Pattern used when no `--include` is given.
pub const DEFAULT_INCLUDE: &str = "*.sh";

/// Resolve shellcheck and run it over every matching script.
///
/// The exit code is shellcheck's own; its output is passed through untouched.
pub async fn check(
    config: Option<&Path>,
    opts: &ResolveOpts,
    quiet: bool,
    include: &[String],
    paths: &[PathBuf],
    args: &[String],
) -> Result<ExitCode> {
    let patterns = compile_patterns(include)?;
    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };

    let resolver = super::build_resolver(config, opts, quiet)?;
    let binary = resolver.resolve_configured().await?;

    // Never lint what we staged ourselves.
    let skip = resolver.layout().output_dir().to_path_buf();
    let scripts = collect_scripts(&roots, &patterns, &skip)?;
    if scripts.is_empty() {
        info!("No shell scripts matched");
        return Ok(ExitCode::SUCCESS);
    }
    debug!(count = scripts.len(), binary = %binary, "Running shellcheck");

    let status = tokio::process::Command::new(binary.path())
        .args(args)
        .args(&scripts)
        .status()
        .await
        .with_context(|| format!("Failed to run {binary}"))?;

    Ok(match status.code() {
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

fn compile_patterns(include: &[String]) -> Result<Vec<Pattern>> {
    if include.is_empty() {
        return Ok(vec![Pattern::new(DEFAULT_INCLUDE)?]);
    }
    include
        .iter()
        .map(|raw| Pattern::new(raw).with_context(|| format!("Invalid glob '{raw}'")))
        .collect()
}

/// Files under `roots` whose path (relative to its root) matches a pattern.
///
/// Explicit file roots are always included. Hidden directories and `skip`
/// are not descended into.
pub fn collect_scripts(
    roots: &[PathBuf],
    patterns: &[Pattern],
    skip: &Path,
) -> Result<Vec<PathBuf>> {
    let skip = skip.canonicalize().ok();
    let mut scripts = Vec::new();
    for root in roots {
        if root.is_file() {
            scripts.push(root.clone());
            continue;
        }

        // Where `skip` sits below this root, as a relative path.
        let skip_below = match (&skip, root.canonicalize()) {
            (Some(skip), Ok(canonical_root)) => skip
                .strip_prefix(&canonical_root)
                .ok()
                .map(Path::to_path_buf),
            _ => None,
        };

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let hidden =
                    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
                let skipped = skip_below.as_deref().is_some_and(|below| {
                    entry.path().strip_prefix(root).is_ok_and(|rel| rel == below)
                });
                !hidden && !skipped
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if patterns.iter().any(|p| p.matches_path(relative)) {
                scripts.push(entry.into_path());
            }
        }
    }
    Ok(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"#!/bin/sh\n").unwrap();
    }

    #[test]
    fn collects_matching_scripts_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("build.sh"));
        touch(&root.join("scripts/deploy.sh"));
        touch(&root.join("scripts/readme.md"));
        touch(&root.join(".git/hooks/pre-commit.sh"));
        touch(&root.join("target/shellcheck-resolver/staged.sh"));

        let patterns = compile_patterns(&[]).unwrap();
        let skip = root.join("target/shellcheck-resolver");
        let found = collect_scripts(&[root.to_path_buf()], &patterns, &skip).unwrap();

        assert_eq!(
            found,
            vec![root.join("build.sh"), root.join("scripts/deploy.sh")]
        );
    }

    #[test]
    fn output_dir_is_skipped_however_the_root_is_spelled() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("build.sh"));
        touch(&root.join("scripts/deploy.sh"));
        touch(&root.join("target/shellcheck-resolver/staged.sh"));

        let patterns = compile_patterns(&[]).unwrap();
        let roundabout = root.join("scripts").join("..");
        let skip = root.join("target").join("shellcheck-resolver");
        let found = collect_scripts(&[roundabout], &patterns, &skip).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| !p.to_string_lossy().contains("staged")));
    }

    #[test]
    fn custom_patterns_and_file_roots() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("bin/tool"));
        touch(&root.join("lib/a.bash"));

        let patterns = compile_patterns(&["*.bash".to_string()]).unwrap();
        let found = collect_scripts(
            &[root.to_path_buf(), root.join("bin/tool")],
            &patterns,
            &root.join("nothing"),
        )
        .unwrap();
        assert_eq!(found, vec![root.join("lib/a.bash"), root.join("bin/tool")]);
    }

    #[test]
    fn bad_glob_is_rejected() {
        assert!(compile_patterns(&["[".to_string()]).is_err());
    }
}
