//! Platform detection and the built-in table of known shellcheck builds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overrides::DownloadUrlOverrides;

/// Release every built-in download URL and archive layout points at.
pub const SHELLCHECK_VERSION: &str = "v0.7.1";

/// Errors raised while working out which platform we are running on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchError {
    /// The detected platform has no entry in the built-in table.
    #[error("Unsupported platform [{platform_key}]: no shellcheck build is known for it")]
    Unsupported {
        /// Normalized key of the platform that was detected.
        platform_key: String,
    },
}

/// Operating system family, which decides the permission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    /// Linux, macOS and friends: POSIX execute bits apply.
    UnixLike,
    /// Windows: no execute bit, binaries carry an `.exe` suffix.
    Windows,
}

impl OsFamily {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnixLike => "unix-like",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct PlatformEntry {
    key: &'static str,
    family: OsFamily,
    download_url: &'static str,
    embedded_resource: &'static str,
    archive_binary: &'static str,
}

static BUILTIN: &[PlatformEntry] = &[
    PlatformEntry {
        key: "Linux-amd64",
        family: OsFamily::UnixLike,
        download_url: "https://github.com/koalaman/shellcheck/releases/download/v0.7.1/shellcheck-v0.7.1.linux.x86_64.tar.xz",
        embedded_resource: "shellcheck-bin/linux/x86_64/shellcheck",
        archive_binary: "shellcheck-v0.7.1/shellcheck",
    },
    PlatformEntry {
        key: "Linux-aarch64",
        family: OsFamily::UnixLike,
        download_url: "https://github.com/koalaman/shellcheck/releases/download/v0.7.1/shellcheck-v0.7.1.linux.aarch64.tar.xz",
        embedded_resource: "shellcheck-bin/linux/aarch64/shellcheck",
        archive_binary: "shellcheck-v0.7.1/shellcheck",
    },
    PlatformEntry {
        key: "Linux-arm",
        family: OsFamily::UnixLike,
        download_url: "https://github.com/koalaman/shellcheck/releases/download/v0.7.1/shellcheck-v0.7.1.linux.armv6hf.tar.xz",
        embedded_resource: "shellcheck-bin/linux/armv6hf/shellcheck",
        archive_binary: "shellcheck-v0.7.1/shellcheck",
    },
    PlatformEntry {
        key: "Mac_OS_X-x86_64",
        family: OsFamily::UnixLike,
        download_url: "https://github.com/koalaman/shellcheck/releases/download/v0.7.1/shellcheck-v0.7.1.darwin.x86_64.tar.xz",
        embedded_resource: "shellcheck-bin/darwin/x86_64/shellcheck",
        archive_binary: "shellcheck-v0.7.1/shellcheck",
    },
    PlatformEntry {
        key: "Windows-x86_64",
        family: OsFamily::Windows,
        download_url: "https://github.com/koalaman/shellcheck/releases/download/v0.7.1/shellcheck-v0.7.1.zip",
        embedded_resource: "shellcheck-bin/windows/x86_64/shellcheck.exe",
        archive_binary: "shellcheck-v0.7.1.exe",
    },
];

/// Everything platform-specific about obtaining a shellcheck binary.
///
/// Built once (usually through [`Architecture::detect`]) and handed to every
/// component that needs it. It is never mutated afterwards.
///
/// # Example
///
/// ```
/// use shellcheck_schema::{Architecture, DownloadUrlOverrides};
///
/// let arch = Architecture::for_key("Windows-x86_64").unwrap();
/// assert!(!arch.is_unix_like());
/// assert_eq!(arch.executable_suffix(), ".exe");
/// assert!(arch.download_url(&DownloadUrlOverrides::default()).ends_with(".zip"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Architecture {
    os_family: OsFamily,
    platform_key: String,
    embedded_resource_path: &'static str,
    default_download_url: &'static str,
    archive_binary_path: &'static str,
}

impl Architecture {
    /// Detect the architecture of the running process.
    ///
    /// # Errors
    ///
    /// Returns [`ArchError::Unsupported`] when the platform has no built-in
    /// mapping. There is no generic fallback.
    pub fn detect() -> Result<Self, ArchError> {
        let os = std::env::consts::OS;
        Self::from_platform(reported_os_name(os), reported_cpu(os, std::env::consts::ARCH))
    }

    /// Build the architecture for an explicit OS name and CPU name pair.
    ///
    /// # Errors
    ///
    /// Returns [`ArchError::Unsupported`] when the normalized key is unknown.
    pub fn from_platform(os_name: &str, cpu: &str) -> Result<Self, ArchError> {
        Self::for_key(&platform_key(os_name, cpu))
    }

    /// Look up a platform by its exact (case-sensitive) key.
    ///
    /// # Errors
    ///
    /// Returns [`ArchError::Unsupported`] when the key is not in the table.
    pub fn for_key(platform_key: &str) -> Result<Self, ArchError> {
        BUILTIN
            .iter()
            .find(|entry| entry.key == platform_key)
            .map(|entry| Self {
                os_family: entry.family,
                platform_key: entry.key.to_string(),
                embedded_resource_path: entry.embedded_resource,
                default_download_url: entry.download_url,
                archive_binary_path: entry.archive_binary,
            })
            .ok_or_else(|| ArchError::Unsupported {
                platform_key: platform_key.to_string(),
            })
    }

    /// Keys of every platform with a built-in mapping.
    pub fn known_platform_keys() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|entry| entry.key)
    }

    /// The operating system family.
    pub fn os_family(&self) -> OsFamily {
        self.os_family
    }

    /// Normalized `<os>-<cpu>` key, e.g. `Linux-amd64`.
    pub fn platform_key(&self) -> &str {
        &self.platform_key
    }

    /// Whether POSIX permission rules apply.
    pub fn is_unix_like(&self) -> bool {
        self.os_family == OsFamily::UnixLike
    }

    /// `.exe` on Windows, empty everywhere else.
    pub fn executable_suffix(&self) -> &'static str {
        match self.os_family {
            OsFamily::Windows => ".exe",
            OsFamily::UnixLike => "",
        }
    }

    /// Location of the pre-packaged binary inside the bundled resources.
    pub fn embedded_bin_path(&self) -> &'static str {
        self.embedded_resource_path
    }

    /// Archive URL compiled in for this platform.
    pub fn default_download_url(&self) -> &'static str {
        self.default_download_url
    }

    /// The URL to download: an exact key match in `overrides`, else the default.
    pub fn download_url<'a>(&'a self, overrides: &'a DownloadUrlOverrides) -> &'a str {
        overrides
            .get(&self.platform_key)
            .unwrap_or(self.default_download_url)
    }

    /// Path of the binary relative to the directory the archive was unpacked into.
    pub fn archive_binary_path(&self) -> &'static str {
        self.archive_binary_path
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.platform_key, self.os_family)
    }
}

/// Join an OS name and a CPU name into a platform key.
///
/// Whitespace inside either part becomes `_`; case is left alone so the key
/// matches external lookup tables byte for byte.
pub fn platform_key(os_name: &str, cpu: &str) -> String {
    format!("{}-{}", normalize(os_name), normalize(cpu))
}

fn normalize(part: &str) -> String {
    part.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Human OS name for a `std::env::consts::OS` value.
pub fn reported_os_name(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "Mac OS X",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// CPU name for a `std::env::consts::{OS, ARCH}` pair.
///
/// Linux reports 64-bit x86 as `amd64`; other systems keep the Rust name.
pub fn reported_cpu<'a>(os: &str, arch: &'a str) -> &'a str {
    match (os, arch) {
        ("linux", "x86_64") => "amd64",
        _ => arch,
    }
}
