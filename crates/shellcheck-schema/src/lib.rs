//! Shared types for the shellcheck binary resolver.
//!
//! Pure data only: platform descriptors, the resolution method and the
//! configuration surface. Nothing in this crate touches the filesystem.

pub mod arch;
pub mod config;
pub mod method;
pub mod overrides;

// Re-exports
pub use arch::*;
pub use config::*;
pub use method::*;
pub use overrides::*;

/// File name of the shellcheck executable, without platform suffix.
pub const BINARY_NAME: &str = "shellcheck";
