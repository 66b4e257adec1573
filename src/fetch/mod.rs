//! Downloading planned packages into the package cache.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::http::HttpClient;
use crate::repository::Package;
use crate::resolve::FetchPlan;
use crate::runtime::Runtime;

/// Concurrent downloads when the command line does not say otherwise.
pub const DEFAULT_JOBS: usize = 4;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Makes the package available locally and returns its path.
    async fn fetch(&self, package: &Package) -> Result<PathBuf>;
}

/// Downloads into `<cache>/package/<filename>` through a `.part` file.
pub struct HttpFetcher<R: Runtime> {
    runtime: R,
    http: HttpClient,
    package_dir: PathBuf,
    cleanup: SharedCleanupContext,
}

impl<R: Runtime> HttpFetcher<R> {
    pub fn new(
        runtime: R,
        http: HttpClient,
        package_dir: PathBuf,
        cleanup: SharedCleanupContext,
    ) -> Self {
        Self {
            runtime,
            http,
            package_dir,
            cleanup,
        }
    }
}

#[async_trait]
impl<R: Runtime> Fetcher for HttpFetcher<R> {
    #[tracing::instrument(skip_all, fields(filename = %package.filename))]
    async fn fetch(&self, package: &Package) -> Result<PathBuf> {
        let target = self.package_dir.join(&package.filename);
        if self.runtime.exists(&target) {
            debug!("{} already cached", package.filename);
            return Ok(target);
        }

        let partial = self.package_dir.join(format!("{}.part", package.filename));
        let guard = CleanupGuard::new(Arc::clone(&self.cleanup), partial.clone());

        info!("Downloading {}", package.download_url);
        let result = self
            .http
            .download_file(&package.download_url, || self.runtime.create_file(&partial))
            .await
            .and_then(|_| self.runtime.rename(&partial, &target));

        if let Err(e) = result {
            if self.runtime.exists(&partial) {
                let _ = self.runtime.remove_file(&partial);
            }
            guard.success();
            return Err(e).with_context(|| format!("Failed to download {}", package.filename));
        }

        guard.success();
        Ok(target)
    }
}

/// Fetches every planned package with at most `jobs` downloads in flight.
///
/// Failures are logged and skipped. Returns the filenames that are now
/// available locally, in plan order.
pub async fn fetch_all<F: Fetcher>(fetcher: &F, plan: &FetchPlan<'_>, jobs: usize) -> Vec<String> {
    let mut outcomes: Vec<_> = stream::iter(plan.iter().enumerate())
        .map(|(position, package)| async move {
            (position, package, fetcher.fetch(package).await)
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await;
    outcomes.sort_by_key(|(position, _, _)| *position);

    outcomes
        .into_iter()
        .filter_map(|(_, package, outcome)| match outcome {
            Ok(_) => Some(package.filename.clone()),
            Err(e) => {
                error!("Error downloading {}: {:#}", package.filename, e);
                None
            }
        })
        .collect()
}
