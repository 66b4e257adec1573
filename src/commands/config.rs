use anyhow::Result;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    archive::{Extractor, SevenZipExtractor},
    cache::CacheLayout,
    cleanup::SharedCleanupContext,
    fetch::{Fetcher, HttpFetcher},
    http::HttpClient,
    runtime::Runtime,
};

const USER_AGENT: &str = concat!("rpmfetch/", env!("RPMFETCH_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborators and locations for one run.
pub struct Config<R: Runtime, F: Fetcher, E: Extractor> {
    pub runtime: R,
    pub http: HttpClient,
    pub fetcher: F,
    pub extractor: E,
    pub layout: CacheLayout,
    /// Where packages are extracted.
    pub output_dir: PathBuf,
    /// Where the zip is written.
    pub zip_dir: PathBuf,
}

impl<R: Runtime + Clone> Config<R, HttpFetcher<R>, SevenZipExtractor> {
    pub fn new(
        runtime: R,
        cache_root: PathBuf,
        output_dir: PathBuf,
        cleanup: SharedCleanupContext,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let http = HttpClient::new(client);

        let layout = CacheLayout::new(cache_root);
        let zip_dir = runtime.current_dir()?;
        let fetcher = HttpFetcher::new(
            runtime.clone(),
            http.clone(),
            layout.package_dir(),
            cleanup,
        );

        Ok(Self {
            runtime,
            http,
            fetcher,
            extractor: SevenZipExtractor::default(),
            layout,
            output_dir,
            zip_dir,
        })
    }
}
