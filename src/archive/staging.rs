use anyhow::{Context, Result};
use log::{error, info};
use std::path::{Path, PathBuf};

use super::Extractor;
use crate::cache::CacheLayout;
use crate::repository::file_stem;
use crate::runtime::Runtime;

/// Unpacks cached packages into `output_dir`, in the given order.
///
/// Binary packages share the output root; source packages each get
/// `<output_dir>/<stem>`. A package that fails to unpack is logged and
/// skipped. Returns the filenames that were staged.
#[tracing::instrument(skip_all)]
pub fn stage_packages<R: Runtime, E: Extractor>(
    runtime: &R,
    extractor: &E,
    layout: &CacheLayout,
    output_dir: &Path,
    filenames: &[String],
    source_mode: bool,
) -> Vec<String> {
    filenames
        .iter()
        .filter(|filename| {
            let target: PathBuf = if source_mode {
                output_dir.join(file_stem(filename))
            } else {
                output_dir.to_path_buf()
            };
            match stage_one(runtime, extractor, layout, filename, &target) {
                Ok(()) => true,
                Err(e) => {
                    error!("Error extracting {}: {:#}", filename, e);
                    false
                }
            }
        })
        .cloned()
        .collect()
}

fn stage_one<R: Runtime, E: Extractor>(
    runtime: &R,
    extractor: &E,
    layout: &CacheLayout,
    filename: &str,
    target: &Path,
) -> Result<()> {
    let cpio = layout.cpio_path(filename);
    if !runtime.exists(&cpio) {
        extractor
            .extract(&layout.package_path(filename), &layout.extracted_dir())
            .with_context(|| format!("Failed to unpack payload of {}", filename))?;
    }

    info!("Extracting {}", filename);
    extractor
        .extract(&cpio, target)
        .with_context(|| format!("Failed to unpack {:?}", cpio))
}
