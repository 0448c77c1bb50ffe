//! shellcheck-resolve - obtain a verified shellcheck binary
//!
//! Thin command-line front end over `shellcheck-core`: it reads the
//! configuration file and flags, builds a [`shellcheck_core::Resolver`] with
//! the HTTP fetcher and the bundled resource directory, and prints or runs
//! the resolved binary.
//!
//! # Configuration
//!
//! ```text
//! shellcheck-resolver.toml   # searched upward from the working directory
//! $SHELLCHECK_RESOLVER_CACHE       # download cache (default: user cache dir)
//! $SHELLCHECK_RESOLVER_RESOURCES   # bundled binaries (default: <exe dir>/resources)
//! ```
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]

pub mod cmd;
pub mod config;
pub mod ui;

use clap::{Args, Parser, Subcommand};
use shellcheck_schema::ResolutionMethod;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shellcheck-resolve")]
#[command(author, version, about = "Resolve a runnable shellcheck binary")]
pub struct Cli {
    /// Configuration file (default: nearest shellcheck-resolver.toml)
    #[arg(long, global = true, env = "SHELLCHECK_RESOLVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the binary and print its path
    Resolve {
        #[command(flatten)]
        opts: ResolveOpts,
    },
    /// Show the detected platform and where its binary comes from
    Arch {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// List every supported platform key
        #[arg(long)]
        list: bool,
    },
    /// Resolve the binary and run it over shell scripts
    Check {
        #[command(flatten)]
        opts: ResolveOpts,
        /// Glob patterns selecting scripts (default: *.sh)
        #[arg(long = "include", value_name = "GLOB")]
        include: Vec<String>,
        /// Files or directories to scan (default: current directory)
        paths: Vec<PathBuf>,
        /// Extra arguments passed to shellcheck
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Flags shared by every command that resolves a binary.
#[derive(Debug, Clone, Args)]
pub struct ResolveOpts {
    /// Resolution method: external, download or embedded
    #[arg(long, short = 'm')]
    pub method: Option<ResolutionMethod>,

    /// Binary to use with the external method (default: shellcheck on PATH)
    #[arg(long, value_name = "PATH")]
    pub external_path: Option<PathBuf>,

    /// Build output root
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<PathBuf>,

    /// Download URL override for a platform, as KEY=URL (repeatable)
    #[arg(long = "override", value_name = "KEY=URL", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Directory holding the bundled binaries
    #[arg(long, value_name = "DIR", env = "SHELLCHECK_RESOLVER_RESOURCES")]
    pub resources_dir: Option<PathBuf>,

    /// Download cache directory
    #[arg(long, value_name = "DIR", env = "SHELLCHECK_RESOLVER_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub timeout: u64,
}

/// Parse a `KEY=URL` override.
///
/// ```
/// use shellcheck_cli::parse_override;
///
/// assert_eq!(
///     parse_override("Linux-amd64=https://m/sc.tar.xz").unwrap(),
///     ("Linux-amd64".to_string(), "https://m/sc.tar.xz".to_string())
/// );
/// assert!(parse_override("no-separator").is_err());
/// ```
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, url)) if !key.is_empty() && !url.is_empty() => {
            Ok((key.to_string(), url.to_string()))
        }
        _ => Err(format!("expected KEY=URL, got '{raw}'")),
    }
}
