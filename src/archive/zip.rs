use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::runtime::Runtime;

/// Deflates every file below `base_dir` into `zip_path`.
///
/// Entry names are relative to `base_dir` with `/` separators, in sorted
/// order, and keep each file's permission bits. Symlinked directories are not
/// descended into and dangling links are left out. Returns the number of files
/// written.
#[tracing::instrument(skip(runtime))]
pub fn make_zip<R: Runtime>(runtime: &R, base_dir: &Path, zip_path: &Path) -> Result<usize> {
    let mut files = Vec::new();
    collect_files(runtime, base_dir, &mut files)?;
    files.retain(|path| path != zip_path);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for path in &files {
        let name = entry_name(base_dir, path)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(runtime.permissions(path)?);

        let mut contents = Vec::new();
        runtime
            .open(path)?
            .read_to_end(&mut contents)
            .with_context(|| format!("Failed to read {:?}", path))?;

        debug!("Adding {}", name);
        writer
            .start_file(name, options)
            .with_context(|| format!("Failed to add {:?} to zip", path))?;
        writer.write_all(&contents)?;
    }

    let buffer = writer.finish().context("Failed to finish zip archive")?;
    runtime.write(zip_path, &buffer.into_inner())?;
    info!("Created {:?} with {} files", zip_path, files.len());

    Ok(files.len())
}

fn collect_files<R: Runtime>(runtime: &R, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = runtime.read_dir(dir)?;
    entries.sort();
    for entry in entries {
        if runtime.is_symlink(&entry) && (runtime.is_dir(&entry) || !runtime.exists(&entry)) {
            debug!("Skipping link {:?}", entry);
        } else if runtime.is_dir(&entry) {
            collect_files(runtime, &entry, files)?;
        } else {
            files.push(entry);
        }
    }
    Ok(())
}

fn entry_name(base_dir: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base_dir)
        .with_context(|| format!("{:?} is not below {:?}", path, base_dir))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
