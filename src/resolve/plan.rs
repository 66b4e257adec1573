use crate::repository::{Package, RepositoryIndex};

use super::ResolutionResult;

/// Packages to fetch and extract, ordered by filename.
#[derive(Debug, Clone, Default)]
pub struct FetchPlan<'a> {
    packages: Vec<&'a Package>,
}

impl<'a> FetchPlan<'a> {
    pub fn from_resolution(index: &'a RepositoryIndex, result: &ResolutionResult) -> Self {
        let packages = result
            .filenames
            .iter()
            .filter_map(|filename| index.by_filename(filename))
            .collect();
        Self { packages }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.packages.iter().copied()
    }

    pub fn filenames(&self) -> Vec<&'a str> {
        self.packages.iter().map(|p| p.filename.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
