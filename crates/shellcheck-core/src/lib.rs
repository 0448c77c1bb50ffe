//! Resolves a runnable shellcheck binary before anything invokes it.
//!
//! # Overview
//!
//! A [`Resolver`] is built once per build with the detected
//! [`Architecture`](shellcheck_schema::Architecture). It dispatches to one of
//! three strategies and hands the result to a common verifier:
//!
//! - **external**: validate a binary the caller already has.
//! - **download**: fetch the release archive through a [`Fetcher`] and pick
//!   the binary from its conventional location.
//! - **embedded**: copy the binary bundled with the tool.
//!
//! # Directory Layout
//!
//! ```text
//! <build_root>/<plugin_dir>/
//! ├── shellcheck[.exe]        # embedded copy
//! └── shellcheck-v0.7.1/      # unpacked release archive
//! ```

pub mod error;
pub mod fetch;
pub mod paths;
pub mod reporter;
pub mod resolver;
pub mod resources;
pub mod strategies;
pub mod verify;

#[cfg(test)]
mod testing;

pub use error::{ErrorKind, ResolveError};
pub use fetch::{FetchError, FetchRequest, Fetcher};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use resolver::Resolver;
pub use strategies::Strategy;
pub use verify::ResolvedBinary;

/// User Agent string for archive downloads
pub const USER_AGENT: &str = concat!("shellcheck-resolver/", env!("CARGO_PKG_VERSION"));
