//! Files produced next to the extracted tree: metadata and the zip name.

mod metadata;
mod tree;

pub use metadata::{normalize_capability, render_metadata, write_metadata};
pub use tree::{base_directory, clean_extracted, set_executable_bits};

use crate::resolve::normalize_name;

/// Name shared by the zip and metadata outputs of a run.
///
/// `mingw32-zlib-1.2.8-1.noarch.rpm` becomes `zlib-1.2.8-1`.
pub fn package_basename(filename: &str) -> String {
    let name = normalize_name(filename).replace(".noarch", "");
    name.strip_suffix(crate::repository::PACKAGE_SUFFIX)
        .unwrap_or(name.as_str())
        .to_string()
}
