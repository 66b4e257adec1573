use log::debug;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Partial files and directories to remove if the run is interrupted.
#[derive(Debug, Default)]
pub struct CleanupContext {
    paths: BTreeSet<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.paths.insert(path);
    }

    pub fn remove(&mut self, path: &Path) {
        self.paths.remove(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Removes every registered path, best effort, and forgets them.
    pub fn cleanup(&mut self) {
        for path in std::mem::take(&mut self.paths) {
            debug!("Cleaning up: {:?}", path);
            if path.is_dir() {
                let _ = std::fs::remove_dir_all(&path);
            } else {
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

/// Locks the context even if another task panicked while holding it.
pub fn lock(ctx: &SharedCleanupContext) -> MutexGuard<'_, CleanupContext> {
    ctx.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps a path registered for cleanup until [`CleanupGuard::success`] is called.
///
/// Dropping the guard without calling `success` leaves the path registered, so
/// an interrupted download is still removed by the Ctrl-C handler.
pub struct CleanupGuard {
    ctx: SharedCleanupContext,
    path: PathBuf,
}

impl CleanupGuard {
    pub fn new(ctx: SharedCleanupContext, path: PathBuf) -> Self {
        lock(&ctx).add(path.clone());
        Self { ctx, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn success(self) {
        lock(&self.ctx).remove(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_add_is_deduplicated() {
        let mut ctx = CleanupContext::new();
        let path = PathBuf::from("/tmp/zlib.rpm.part");

        ctx.add(path.clone());
        ctx.add(path.clone());
        assert_eq!(ctx.len(), 1);

        ctx.remove(&path);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_cleanup_removes_files_and_dirs() {
        let dir = tempdir().unwrap();
        let part = dir.path().join("zlib.rpm.part");
        fs::write(&part, "partial").unwrap();
        let extracted = dir.path().join("extracted");
        fs::create_dir(&extracted).unwrap();
        fs::write(extracted.join("zlib1.dll"), "dll").unwrap();

        let mut ctx = CleanupContext::new();
        ctx.add(part.clone());
        ctx.add(extracted.clone());
        ctx.add(dir.path().join("never-created"));
        ctx.cleanup();

        assert!(!part.exists());
        assert!(!extracted.exists());
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_guard_success_unregisters() {
        let ctx = new_shared();
        let guard = CleanupGuard::new(Arc::clone(&ctx), PathBuf::from("/tmp/a.part"));
        assert_eq!(guard.path(), Path::new("/tmp/a.part"));
        assert_eq!(lock(&ctx).len(), 1);

        guard.success();
        assert!(lock(&ctx).is_empty());
    }

    #[test]
    fn test_guard_dropped_keeps_path_registered() {
        let ctx = new_shared();
        {
            let _guard = CleanupGuard::new(Arc::clone(&ctx), PathBuf::from("/tmp/a.part"));
        }
        assert_eq!(lock(&ctx).len(), 1);
    }
}
