use anyhow::{Context, Result, anyhow};
use log::{error, info};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    archive::{Extractor, make_zip, stage_packages},
    cleanup::{self, SharedCleanupContext},
    fetch::{Fetcher, fetch_all},
    output::{
        base_directory, clean_extracted, package_basename, set_executable_bits, write_metadata,
    },
    repository::{Arch, RepoLocation, RepositoryLoader},
    resolve::{DependencyResolver, Diagnostic, FetchPlan, PackageMatcher},
    runtime::Runtime,
};

pub mod config;

pub use config::Config;

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub packages: Vec<String>,
    pub location: RepoLocation,
    pub with_dependencies: bool,
    pub source: bool,
    pub clean: bool,
    pub make_zip: bool,
    pub add_metadata: bool,
    pub jobs: usize,
}

impl RunOptions {
    fn arch(&self) -> Arch {
        if self.source { Arch::Src } else { Arch::Noarch }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every resolved filename, sorted.
    pub resolved: Vec<String>,
    pub fetched: Vec<String>,
    pub staged: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub metadata_path: Option<PathBuf>,
    pub zip_path: Option<PathBuf>,
}

/// Builds the real collaborators and runs, removing partial downloads on Ctrl-C.
#[tracing::instrument(skip(runtime, options))]
pub async fn download<R: Runtime + Clone + 'static>(
    runtime: R,
    options: RunOptions,
    cache_root: PathBuf,
    output_dir: PathBuf,
) -> Result<RunSummary> {
    let cleanup_ctx = cleanup::new_shared();
    let config = Config::new(runtime, cache_root, output_dir, Arc::clone(&cleanup_ctx))?;

    let ctrl_c_handler = spawn_interrupt_handler(Arc::clone(&cleanup_ctx));
    let result = run(&options, &config).await;
    ctrl_c_handler.abort();

    result
}

fn spawn_interrupt_handler(cleanup_ctx: SharedCleanupContext) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            cleanup::lock(&cleanup_ctx).cleanup();
            std::process::exit(130);
        }
    })
}

/// Opens the repository, resolves, fetches, extracts and packages.
///
/// Only repository and output-naming failures are errors; per-package problems
/// are logged and reported in the summary.
#[tracing::instrument(skip_all)]
pub async fn run<R: Runtime, F: Fetcher, E: Extractor>(
    options: &RunOptions,
    config: &Config<R, F, E>,
) -> Result<RunSummary> {
    let runtime = &config.runtime;
    config.layout.ensure(runtime)?;

    let loader = RepositoryLoader::new(runtime, &config.http, config.layout.repository_dir());
    let index = loader
        .open(&options.location, options.arch())
        .await
        .with_context(|| format!("Error opening repository {}", options.location))?;

    if options.clean {
        clean_extracted(runtime, &config.output_dir)?;
    }

    let basename = if options.make_zip || options.add_metadata {
        let first = options
            .packages
            .first()
            .ok_or_else(|| anyhow!("No package specified"))?;
        let package = PackageMatcher::new(&index)
            .primary_package(first)
            .ok_or_else(|| anyhow!("Package not found: {}", first))?;
        Some(package_basename(&package.filename))
    } else {
        None
    };

    let request: BTreeSet<String> = options.packages.iter().cloned().collect();
    let resolution = DependencyResolver::new(&index).resolve(&request, options.with_dependencies);
    for diagnostic in &resolution.diagnostics {
        diagnostic.log();
    }

    let plan = FetchPlan::from_resolution(&index, &resolution);
    for filename in &resolution.filenames {
        println!("{}", filename);
    }

    let fetched = fetch_all(&config.fetcher, &plan, options.jobs).await;
    info!("{}/{} packages available", fetched.len(), plan.len());

    runtime.create_dir_all(&config.output_dir)?;
    let staged = stage_packages(
        runtime,
        &config.extractor,
        &config.layout,
        &config.output_dir,
        &fetched,
        options.source,
    );

    let base_dir = base_directory(runtime, &config.output_dir);
    if !options.source {
        if let Err(e) = set_executable_bits(runtime, &base_dir) {
            error!("Failed to set executable bits below {:?}: {:#}", base_dir, e);
        }
    }

    let mut summary = RunSummary {
        resolved: resolution.filenames.iter().cloned().collect(),
        fetched,
        staged,
        diagnostics: resolution.diagnostics.clone(),
        ..Default::default()
    };

    if let Some(basename) = basename {
        if options.add_metadata {
            summary.metadata_path = Some(write_metadata(runtime, &base_dir, &basename, plan.iter())?);
        }

        if options.make_zip {
            let zip_path = config.zip_dir.join(format!("{}.zip", basename));
            make_zip(runtime, &base_dir, &zip_path)?;
            summary.zip_path = Some(zip_path);

            if options.clean {
                clean_extracted(runtime, &config.output_dir)?;
            }
        }
    }

    Ok(summary)
}
