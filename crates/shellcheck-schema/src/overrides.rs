//! Caller-supplied download URL overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-platform download URLs that replace the built-in defaults.
///
/// Keys must match [`Architecture::platform_key`](crate::Architecture::platform_key)
/// exactly. There is no prefix or case-insensitive matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadUrlOverrides(BTreeMap<String, String>);

impl DownloadUrlOverrides {
    /// Register (or replace) the URL for a platform key.
    pub fn insert(&mut self, platform_key: impl Into<String>, url: impl Into<String>) {
        self.0.insert(platform_key.into(), url.into());
    }

    /// URL configured for exactly this platform key.
    pub fn get(&self, platform_key: &str) -> Option<&str> {
        self.0.get(platform_key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DownloadUrlOverrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
