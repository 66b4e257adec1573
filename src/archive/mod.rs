//! Unpacking downloaded packages and packing the result back up.

mod seven_zip;
mod staging;
mod zip;

use anyhow::Result;
use std::path::Path;

pub use seven_zip::SevenZipExtractor;
pub use staging::stage_packages;
pub use self::zip::make_zip;

/// Unpacks one archive into a directory.
///
/// An `.rpm` unpacks to a single `.cpio` payload; the `.cpio` unpacks to the
/// package's file tree.
#[cfg_attr(test, mockall::automock)]
pub trait Extractor: Send + Sync {
    fn extract(&self, archive: &Path, output_dir: &Path) -> Result<()>;
}
