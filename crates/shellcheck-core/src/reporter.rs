//! Reporter trait for dependency injection
//!
//! This trait allows the resolver and the default fetcher to report progress
//! without being coupled to a specific terminal implementation.

use std::path::Path;

use shellcheck_schema::ResolutionMethod;

pub trait Reporter: Send + Sync {
    /// A resolution has started for the given method and platform.
    fn resolving(&self, method: ResolutionMethod, platform_key: &str);

    /// Updates the progress of a download.
    fn downloading(&self, url: &str, current: u64, total: Option<u64>);

    /// A download was skipped because the archive is already cached.
    fn cached(&self, url: &str, archive: &Path);

    /// An archive is being unpacked into `dest`.
    fn extracting(&self, archive: &Path, dest: &Path);

    /// Resolution finished with a verified binary.
    fn resolved(&self, binary: &Path);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn resolving(&self, method: ResolutionMethod, platform_key: &str) {
        (**self).resolving(method, platform_key);
    }
    fn downloading(&self, url: &str, current: u64, total: Option<u64>) {
        (**self).downloading(url, current, total);
    }
    fn cached(&self, url: &str, archive: &Path) {
        (**self).cached(url, archive);
    }
    fn extracting(&self, archive: &Path, dest: &Path) {
        (**self).extracting(archive, dest);
    }
    fn resolved(&self, binary: &Path) {
        (**self).resolved(binary);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., scripting, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn resolving(&self, _: ResolutionMethod, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn cached(&self, _: &str, _: &Path) {}
    fn extracting(&self, _: &Path, _: &Path) {}
    fn resolved(&self, _: &Path) {}
    fn warning(&self, _: &str) {}
}
