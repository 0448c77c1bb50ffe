//! Resolver façade: picks the strategy, runs it, verifies the result.

use std::sync::Arc;

use shellcheck_schema::{Architecture, ResolutionMethod, ResolverConfig};
use tracing::{info, warn};

use crate::error::ResolveError;
use crate::fetch::Fetcher;
use crate::paths::PathLayout;
use crate::resources::EmbeddedResources;
use crate::strategies::{DownloadStrategy, EmbeddedStrategy, ExternalStrategy, Strategy};
use crate::verify::{ResolvedBinary, verify};
use crate::{NullReporter, Reporter};

/// Guarantees a runnable shellcheck binary at a known path.
///
/// The [`Architecture`] is fixed when the resolver is built and passed to
/// every strategy. One resolution runs to completion per call; callers must
/// not run two resolutions against the same output directory at once.
pub struct Resolver {
    arch: Architecture,
    config: ResolverConfig,
    layout: PathLayout,
    fetcher: Arc<dyn Fetcher>,
    resources: Arc<dyn EmbeddedResources>,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("arch", &self.arch)
            .field("layout", &self.layout)
            .field("fetcher", &self.fetcher)
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Resolver for the platform this process runs on.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Platform`] when the platform is not supported.
    pub fn new(
        config: ResolverConfig,
        fetcher: Arc<dyn Fetcher>,
        resources: Arc<dyn EmbeddedResources>,
    ) -> Result<Self, ResolveError> {
        let arch = Architecture::detect()?;
        Ok(Self::with_architecture(arch, config, fetcher, resources))
    }

    /// Resolver for an explicit architecture.
    pub fn with_architecture(
        arch: Architecture,
        config: ResolverConfig,
        fetcher: Arc<dyn Fetcher>,
        resources: Arc<dyn EmbeddedResources>,
    ) -> Self {
        let layout = PathLayout::from_config(&config);
        Self {
            arch,
            config,
            layout,
            fetcher,
            resources,
            reporter: Arc::new(NullReporter),
        }
    }

    /// Report progress to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The architecture detected (or supplied) at construction.
    pub fn architecture(&self) -> &Architecture {
        &self.arch
    }

    /// The configuration this resolver reads.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Staging locations under the build root.
    pub fn layout(&self) -> &PathLayout {
        &self.layout
    }

    /// Resolve with the method named in the configuration.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub async fn resolve_configured(&self) -> Result<ResolvedBinary, ResolveError> {
        self.resolve(self.config.method).await
    }

    /// Obtain and verify a shellcheck binary using `method`.
    ///
    /// Any failure aborts the resolution; no other method is tried.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`]; use [`ResolveError::kind`] to tell
    /// configuration, fetch and integrity failures apart.
    pub async fn resolve(&self, method: ResolutionMethod) -> Result<ResolvedBinary, ResolveError> {
        info!(%method, platform = self.arch.platform_key(), "Resolving shellcheck binary");
        self.reporter.resolving(method, self.arch.platform_key());

        let strategy: Box<dyn Strategy + '_> = match method {
            ResolutionMethod::External => Box::new(ExternalStrategy::new(
                self.config.external_binary_path.as_deref(),
            )),
            ResolutionMethod::Download => Box::new(DownloadStrategy::new(
                self.fetcher.as_ref(),
                &self.layout,
                &self.config.download_url_overrides,
            )),
            ResolutionMethod::Embedded => Box::new(EmbeddedStrategy::new(
                self.resources.as_ref(),
                &self.layout,
            )),
        };

        let result = match strategy.acquire(&self.arch).await {
            Ok(candidate) => verify(&self.arch, &candidate).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(binary) => {
                info!(path = %binary, "Resolved shellcheck binary");
                self.reporter.resolved(binary.path());
            }
            Err(e) => warn!(%method, kind = ?e.kind(), "Resolution failed: {e}"),
        }
        result
    }
}
