//! Repository model: packages, the per-architecture index, and the loader
//! that builds it from `repodata/` metadata.

mod index;
mod loader;
mod location;
pub mod metadata;
mod package;

pub use index::RepositoryIndex;
pub use loader::RepositoryLoader;
pub use location::{DEFAULT_PROJECT, DEFAULT_REPO_URL, DEFAULT_REPOSITORY, RepoLocation};
pub use package::{Arch, PACKAGE_SUFFIX, Package, PackageRecord, file_stem};
