use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

const SYSROOTS: [&str; 2] = [
    "usr/i686-w64-mingw32/sys-root/mingw",
    "usr/x86_64-w64-mingw32/sys-root/mingw",
];

const EXECUTABLE_MODE: u32 = 0o755;

/// The MinGW sys-root inside `output_dir`, 32-bit first, else `output_dir` itself.
pub fn base_directory<R: Runtime>(runtime: &R, output_dir: &Path) -> PathBuf {
    SYSROOTS
        .iter()
        .map(|sysroot| output_dir.join(sysroot))
        .find(|candidate| runtime.is_dir(candidate))
        .unwrap_or_else(|| output_dir.to_path_buf())
}

/// Removes `<output_dir>/usr` left over from an earlier run.
pub fn clean_extracted<R: Runtime>(runtime: &R, output_dir: &Path) -> Result<()> {
    let usr = output_dir.join("usr");
    if runtime.exists(&usr) {
        debug!("Removing {:?}", usr);
        runtime.remove_dir_all(&usr)?;
    }
    Ok(())
}

/// Marks every directory, `.dll` and `.exe` below `base_dir` as executable.
/// Symlinked directories are left alone and not descended into. Returns how
/// many paths were changed.
#[tracing::instrument(skip(runtime))]
pub fn set_executable_bits<R: Runtime>(runtime: &R, base_dir: &Path) -> Result<usize> {
    let mut changed = 0;
    for entry in runtime.read_dir(base_dir)? {
        if runtime.is_dir(&entry) {
            if runtime.is_symlink(&entry) {
                debug!("Not following link {:?}", entry);
                continue;
            }
            runtime.set_permissions(&entry, EXECUTABLE_MODE)?;
            changed += 1 + set_executable_bits(runtime, &entry)?;
        } else if is_windows_executable(&entry) {
            runtime.set_permissions(&entry, EXECUTABLE_MODE)?;
            changed += 1;
        }
    }
    Ok(changed)
}

fn is_windows_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dll") || ext.eq_ignore_ascii_case("exe"))
}
