use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::info;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::http::HttpClient;
use crate::runtime::Runtime;

use super::metadata::{parse_primary, parse_repomd};
use super::{Arch, RepoLocation, RepositoryIndex};

/// Fetches repository metadata and turns it into a [`RepositoryIndex`].
///
/// `repomd.xml` is fetched on every open so a republished repository is
/// noticed; the primary document it points at has a content-addressed name and
/// is cached, decompressed, under `cache_dir`.
pub struct RepositoryLoader<'a, R: Runtime> {
    runtime: &'a R,
    http: &'a HttpClient,
    cache_dir: PathBuf,
}

impl<'a, R: Runtime> RepositoryLoader<'a, R> {
    pub fn new(runtime: &'a R, http: &'a HttpClient, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            http,
            cache_dir: cache_dir.into(),
        }
    }

    /// Any failure here is fatal for the run: without an index there is
    /// nothing to resolve against.
    #[tracing::instrument(skip(self))]
    pub async fn open(&self, location: &RepoLocation, arch: Arch) -> Result<RepositoryIndex> {
        let repomd = self
            .http
            .get_bytes(&location.repomd_url())
            .await
            .context("Failed to fetch repomd.xml")?;
        let primary_href = parse_repomd(repomd.as_slice())?;

        let cached = self.cache_dir.join(cached_primary_name(&primary_href));
        if !self.runtime.exists(&cached) {
            self.download_primary(&location.join(&primary_href), &primary_href, &cached)
                .await?;
        }

        let reader = self.runtime.open(&cached)?;
        let records = parse_primary(BufReader::new(reader))
            .with_context(|| format!("Failed to read cached metadata {:?}", cached))?;

        let index = RepositoryIndex::build(records, location.base_url(), arch);
        info!("{} {} packages in {}", index.len(), arch, location);
        Ok(index)
    }

    async fn download_primary(&self, url: &str, href: &str, cached: &Path) -> Result<()> {
        info!("Downloading repository data");
        let body = self
            .http
            .get_bytes(url)
            .await
            .context("Failed to fetch primary metadata")?;

        let xml = if href.ends_with(".gz") {
            let mut xml = Vec::new();
            GzDecoder::new(body.as_slice())
                .read_to_end(&mut xml)
                .context("Failed to decompress primary metadata")?;
            xml
        } else {
            body
        };

        self.runtime.create_dir_all(&self.cache_dir)?;
        let partial = cached.with_extension("part");
        self.runtime.write(&partial, &xml)?;
        self.runtime.rename(&partial, cached)?;
        Ok(())
    }
}

/// `repodata/abc-primary.xml.gz` -> `abc-primary.xml`
fn cached_primary_name(href: &str) -> String {
    let basename = href.rsplit('/').next().unwrap_or(href);
    Path::new(basename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(basename)
        .to_string()
}
