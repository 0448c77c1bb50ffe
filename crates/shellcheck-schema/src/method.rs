//! The closed set of ways to obtain a binary.

use thiserror::Error;

/// How the shellcheck binary should be obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// Use a binary the caller already has on disk.
    External,
    /// Fetch the release archive for this platform and unpack it.
    Download,
    /// Copy the binary bundled with this tool.
    #[default]
    Embedded,
}

/// A resolution method name that is not one of the three known ones.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown resolution method [{0}], expected one of: external, download, embedded")]
pub struct ParseMethodError(pub String);

impl ResolutionMethod {
    /// All methods, in declaration order.
    pub const ALL: [Self; 3] = [Self::External, Self::Download, Self::Embedded];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Download => "download",
            Self::Embedded => "embedded",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResolutionMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "external" => Ok(Self::External),
            "download" => Ok(Self::Download),
            "embedded" => Ok(Self::Embedded),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}
