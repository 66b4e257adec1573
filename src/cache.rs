use anyhow::Result;
use std::path::PathBuf;

use crate::repository::file_stem;
use crate::runtime::Runtime;

/// Directory layout below the cache root.
///
/// ```text
/// <root>/repository/   decompressed primary metadata
/// <root>/package/      downloaded .rpm files
/// <root>/extracted/    intermediate .cpio payloads
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<user cache dir>/rpmfetch`, if the platform has a cache directory.
    pub fn default_root<R: Runtime>(runtime: &R) -> Option<PathBuf> {
        runtime.cache_dir().map(|dir| dir.join("rpmfetch"))
    }

    pub fn repository_dir(&self) -> PathBuf {
        self.root.join("repository")
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root.join("package")
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.root.join("extracted")
    }

    pub fn package_path(&self, filename: &str) -> PathBuf {
        self.package_dir().join(filename)
    }

    pub fn cpio_path(&self, filename: &str) -> PathBuf {
        self.extracted_dir()
            .join(format!("{}.cpio", file_stem(filename)))
    }

    pub fn ensure<R: Runtime>(&self, runtime: &R) -> Result<()> {
        for dir in [
            self.repository_dir(),
            self.package_dir(),
            self.extracted_dir(),
        ] {
            runtime.create_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_layout_paths() {
        let layout = CacheLayout::new("/cache/rpmfetch");

        assert_eq!(layout.repository_dir(), PathBuf::from("/cache/rpmfetch/repository"));
        assert_eq!(
            layout.package_path("mingw32-zlib-1.2.8-1.noarch.rpm"),
            PathBuf::from("/cache/rpmfetch/package/mingw32-zlib-1.2.8-1.noarch.rpm")
        );
        assert_eq!(
            layout.cpio_path("mingw32-zlib-1.2.8-1.noarch.rpm"),
            PathBuf::from("/cache/rpmfetch/extracted/mingw32-zlib-1.2.8-1.noarch.cpio")
        );
    }

    #[test]
    fn test_default_root_under_user_cache() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_cache_dir()
            .returning(|| Some(PathBuf::from("/home/user/.cache")));

        assert_eq!(
            CacheLayout::default_root(&runtime),
            Some(PathBuf::from("/home/user/.cache/rpmfetch"))
        );
    }

    #[test]
    fn test_ensure_creates_every_directory() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().times(3).returning(|_| Ok(()));

        CacheLayout::new("/cache").ensure(&runtime).unwrap();
    }
}
