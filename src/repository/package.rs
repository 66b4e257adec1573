use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Suffix that marks a request token as a literal artifact filename.
pub const PACKAGE_SUFFIX: &str = ".rpm";

/// Architecture filter applied when building a [`RepositoryIndex`](super::RepositoryIndex).
///
/// Cross-compiled MinGW packages are published as `noarch`; their sources as `src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Noarch,
    Src,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Noarch => "noarch",
            Arch::Src => "src",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<package>` entry as read from the primary metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageRecord {
    pub name: String,
    pub build_time: i64,
    /// Location of the artifact relative to the repository root.
    pub location: String,
    pub arch: String,
    pub provides: BTreeSet<String>,
    pub requires: BTreeSet<String>,
}

/// A package available for download. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub build_time: i64,
    pub download_url: String,
    /// Basename of the artifact; unique per artifact and used as the cache key.
    pub filename: String,
    pub provides: BTreeSet<String>,
    pub requires: BTreeSet<String>,
}

impl Package {
    /// Builds a package from a metadata record. `base_url` must end with `/`.
    pub fn from_record(record: PackageRecord, base_url: &str) -> Self {
        let filename = record
            .location
            .rsplit('/')
            .next()
            .unwrap_or(&record.location)
            .to_string();

        Self {
            download_url: format!("{}{}", base_url, record.location),
            name: record.name,
            build_time: record.build_time,
            filename,
            provides: record.provides,
            requires: record.requires,
        }
    }
}

/// Strips the final extension of an artifact filename.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}
