use std::collections::BTreeSet;

use super::{Arch, Package, PackageRecord};

/// Read-only set of packages available for one architecture.
///
/// Built once per run from the metadata loader's records and never mutated, so
/// it can be shared by reference between any number of resolutions.
#[derive(Debug, Clone)]
pub struct RepositoryIndex {
    arch: Arch,
    packages: Vec<Package>,
}

impl RepositoryIndex {
    /// Keeps the records whose architecture equals `arch`, in document order.
    pub fn build<I>(records: I, base_url: &str, arch: Arch) -> Self
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let packages = records
            .into_iter()
            .filter(|record| record.arch == arch.as_str())
            .map(|record| Package::from_record(record, base_url))
            .collect();

        Self { arch, packages }
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages whose name or filename equals `token`, newest build first.
    ///
    /// The sort is stable, so packages with equal build times keep index order.
    /// An empty result means "not found"; more than one entry is an ambiguity
    /// for the caller to report.
    pub fn find_by_name_or_filename(&self, token: &str) -> Vec<&Package> {
        let mut matches: Vec<&Package> = self
            .packages
            .iter()
            .filter(|p| p.name == token || p.filename == token)
            .collect();
        matches.sort_by(|a, b| b.build_time.cmp(&a.build_time));
        matches
    }

    /// Newest package for `token`, if any.
    pub fn newest(&self, token: &str) -> Option<&Package> {
        self.find_by_name_or_filename(token).into_iter().next()
    }

    /// Names of every package in the index that provides `capability`.
    pub fn providers_of(&self, capability: &str) -> BTreeSet<String> {
        self.packages
            .iter()
            .filter(|p| p.provides.contains(capability))
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn by_filename(&self, filename: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.filename == filename)
    }

    /// Looks `token` up as given, then with the `mingw32-` and `mingw64-` prefixes.
    pub fn find_with_prefix_fallback(&self, token: &str) -> Option<&Package> {
        self.newest(token)
            .or_else(|| self.newest(&format!("mingw32-{}", token)))
            .or_else(|| self.newest(&format!("mingw64-{}", token)))
    }
}
