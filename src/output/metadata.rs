use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::repository::Package;
use crate::resolve::normalize_name;
use crate::runtime::Runtime;

/// `mingw32(zlib1.dll)` -> `zlib1.dll`, then any leading `mingw32-`/`mingw64-` is dropped.
pub fn normalize_capability(capability: &str) -> &str {
    let unwrapped = ["mingw32(", "mingw64("]
        .iter()
        .find_map(|prefix| {
            capability
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(')'))
        })
        .unwrap_or(capability);
    normalize_name(unwrapped)
}

/// One `provides:` line per capability, then one `requires:` line per requirement,
/// for each package in order. Lines end with CRLF.
pub fn render_metadata<'a, I>(packages: I) -> String
where
    I: IntoIterator<Item = &'a Package>,
{
    let mut out = String::new();
    for package in packages {
        for capability in &package.provides {
            let _ = write!(out, "provides:{}\r\n", normalize_capability(capability));
        }
        for capability in &package.requires {
            let _ = write!(out, "requires:{}\r\n", normalize_capability(capability));
        }
    }
    out
}

/// Writes `<base_dir>/<basename>.metadata` and returns its path.
#[tracing::instrument(skip(runtime, packages))]
pub fn write_metadata<'a, R, I>(
    runtime: &R,
    base_dir: &Path,
    basename: &str,
    packages: I,
) -> Result<PathBuf>
where
    R: Runtime,
    I: IntoIterator<Item = &'a Package>,
{
    let path = base_dir.join(format!("{}.metadata", basename));
    runtime.create_dir_all(base_dir)?;
    runtime.write(&path, render_metadata(packages).as_bytes())?;
    Ok(path)
}
