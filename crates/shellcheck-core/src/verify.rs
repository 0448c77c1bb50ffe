//! Final usability check shared by every strategy, plus the permission step.

use std::path::{Path, PathBuf};

use shellcheck_schema::Architecture;
use tracing::debug;

use crate::error::ResolveError;

/// A shellcheck binary that exists, is readable and, on Unix-like platforms,
/// is executable.
///
/// Only [`verify`] builds one, so holding a `ResolvedBinary` means the checks
/// passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    path: PathBuf,
}

impl ResolvedBinary {
    /// Absolute path of the binary.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ResolvedBinary {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for ResolvedBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Which usability property a file is missing.
#[derive(Debug)]
pub(crate) enum Unusable {
    Missing,
    Unreadable(std::io::Error),
    NotExecutable,
}

/// Check existence, then readability, then (Unix-like only) the execute bit.
pub(crate) async fn probe(arch: &Architecture, path: &Path) -> Result<(), Unusable> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return Err(Unusable::Missing),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Unusable::Missing),
        Err(e) => return Err(Unusable::Unreadable(e)),
    };

    tokio::fs::File::open(path)
        .await
        .map_err(Unusable::Unreadable)?;

    if arch.is_unix_like() && !has_exec_bit(&meta) {
        return Err(Unusable::NotExecutable);
    }
    Ok(())
}

/// Verify `candidate` and turn it into a [`ResolvedBinary`].
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`], [`ResolveError::NotReadable`] or
/// [`ResolveError::NotExecutable`] naming the first property that failed.
pub async fn verify(arch: &Architecture, candidate: &Path) -> Result<ResolvedBinary, ResolveError> {
    let path = std::path::absolute(candidate).map_err(|source| ResolveError::NotReadable {
        path: candidate.to_path_buf(),
        source,
    })?;

    match probe(arch, &path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Verified shellcheck binary");
            Ok(ResolvedBinary { path })
        }
        Err(Unusable::Missing) => Err(ResolveError::NotFound { path }),
        Err(Unusable::Unreadable(source)) => Err(ResolveError::NotReadable { path, source }),
        Err(Unusable::NotExecutable) => Err(ResolveError::NotExecutable { path }),
    }
}

/// Mark `path` executable for everyone when `arch` is Unix-like.
///
/// A no-op on Windows, which has no execute bit.
///
/// # Errors
///
/// Returns the I/O error from reading or changing the permissions.
pub async fn make_executable(arch: &Architecture, path: &Path) -> std::io::Result<()> {
    if !arch.is_unix_like() {
        return Ok(());
    }
    set_exec_bits(path).await
}

#[cfg(unix)]
async fn set_exec_bits(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    let mode = perms.mode();
    if mode & 0o755 != 0o755 {
        perms.set_mode(mode | 0o755);
        tokio::fs::set_permissions(path, perms).await?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)] // Must match the async signature of the unix variant
async fn set_exec_bits(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn has_exec_bit(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &std::fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn linux() -> Architecture {
        Architecture::for_key("Linux-amd64").unwrap()
    }

    fn windows() -> Architecture {
        Architecture::for_key("Windows-x86_64").unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = verify(&linux(), &tmp.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[tokio::test]
    async fn directory_is_not_a_binary() {
        let tmp = TempDir::new().unwrap();
        let err = verify(&linux(), tmp.path()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[tokio::test]
    async fn windows_skips_exec_bit() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("shellcheck.exe");
        std::fs::write(&bin, b"MZ").unwrap();
        let resolved = verify(&windows(), &bin).await.unwrap();
        assert!(resolved.path().is_absolute());
        assert!(resolved.path().ends_with("shellcheck.exe"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unix_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("shellcheck");
        std::fs::write(&bin, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = verify(&linux(), &bin).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotExecutable { .. }));

        make_executable(&linux(), &bin).await.unwrap();
        let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(verify(&linux(), &bin).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn make_executable_is_noop_for_windows() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("shellcheck.exe");
        std::fs::write(&bin, b"MZ").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o600)).unwrap();

        make_executable(&windows(), &bin).await.unwrap();
        let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
