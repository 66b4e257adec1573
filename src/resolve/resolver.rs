use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use log::{error, warn};

use crate::repository::{Package, RepositoryIndex};

use super::PackageMatcher;

/// Data-quality findings collected during resolution. None of them stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A requested token matched no package, even after fallback.
    NotFound { token: String },
    /// A token matched several packages; the newest one was taken.
    MultipleMatches {
        token: String,
        filenames: Vec<String>,
    },
    /// A requirement is provided only by packages outside the selection.
    AmbiguousProvider {
        package: String,
        capability: String,
        providers: BTreeSet<String>,
    },
    /// Nothing in the repository provides the capability.
    UnsatisfiedRequirement { package: String, capability: String },
}

impl Diagnostic {
    /// Emits the diagnostic at the level the command line reports it with.
    pub fn log(&self) {
        match self {
            Diagnostic::AmbiguousProvider { .. } => warn!("{}", self),
            _ => error!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NotFound { token } => write!(f, "Package {} not found", token),
            Diagnostic::MultipleMatches { token, filenames } => {
                write!(f, "multiple packages found for {}:", token)?;
                for filename in filenames {
                    write!(f, "\n  {}", filename)?;
                }
                Ok(())
            }
            Diagnostic::AmbiguousProvider {
                package,
                capability,
                providers,
            } => write!(
                f,
                "Package {} requires {}, provided by: {}",
                package,
                capability,
                providers.iter().cloned().collect::<Vec<_>>().join(",")
            ),
            Diagnostic::UnsatisfiedRequirement {
                package,
                capability,
            } => write!(
                f,
                "Package {} requires {}, not provided by any package",
                package, capability
            ),
        }
    }
}

/// Outcome of one resolution: artifacts to fetch plus what was noticed on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub filenames: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolutionResult {
    pub fn unsatisfied(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnsatisfiedRequirement { .. }))
    }

    pub fn not_found(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::NotFound { .. }))
    }
}

/// Expands a request into the set of artifacts that satisfy it.
///
/// Pure and synchronous: it only reads the index. Run it to completion before
/// fetching anything.
pub struct DependencyResolver<'a> {
    index: &'a RepositoryIndex,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: &'a RepositoryIndex) -> Self {
        Self { index }
    }

    /// Drains a work queue seeded with the expanded request.
    ///
    /// Requirements already provided by a selected name are satisfied. When
    /// `with_dependencies` is set, an unmet requirement pulls in the
    /// lexicographically smallest provider; otherwise it is only reported.
    pub fn resolve(&self, request: &BTreeSet<String>, with_dependencies: bool) -> ResolutionResult {
        let expanded = PackageMatcher::new(self.index).resolve_all(request);

        let mut seen = expanded.clone();
        // Literal filenames select a package by file; its name counts as selected too.
        for token in &expanded {
            if let Some(package) = self.index.by_filename(token) {
                seen.insert(package.name.clone());
            }
        }

        let mut queue: VecDeque<String> = expanded.into_iter().collect();
        let mut result = ResolutionResult::default();

        while let Some(token) = queue.pop_front() {
            let candidates = self.index.find_by_name_or_filename(&token);
            let Some(&package) = candidates.first() else {
                result.diagnostics.push(Diagnostic::NotFound { token });
                continue;
            };

            if candidates.len() > 1 {
                result.diagnostics.push(Diagnostic::MultipleMatches {
                    token: token.clone(),
                    filenames: candidates.iter().map(|p| p.filename.clone()).collect(),
                });
            }

            if result.filenames.contains(&package.filename) {
                continue;
            }
            seen.insert(package.name.clone());

            let pulled = self.check_requirements(
                package,
                with_dependencies,
                &mut seen,
                &mut result.diagnostics,
            );
            queue.extend(pulled);

            result.filenames.insert(package.filename.clone());
        }

        result
    }

    /// Reports every requirement not met by `seen` and, when pulling
    /// dependencies, returns one provider for each.
    ///
    /// `seen` grows as providers are picked so that two requirements with a
    /// common provider pull it in once.
    fn check_requirements(
        &self,
        package: &Package,
        with_dependencies: bool,
        seen: &mut BTreeSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<String> {
        let mut picked = Vec::new();

        for requirement in &package.requires {
            let providers = self.index.providers_of(requirement);
            if !providers.is_disjoint(seen) {
                continue;
            }

            let Some(first) = providers.first().cloned() else {
                diagnostics.push(Diagnostic::UnsatisfiedRequirement {
                    package: package.name.clone(),
                    capability: requirement.clone(),
                });
                continue;
            };

            diagnostics.push(Diagnostic::AmbiguousProvider {
                package: package.name.clone(),
                capability: requirement.clone(),
                providers,
            });
            if with_dependencies {
                seen.insert(first.clone());
                picked.push(first);
            }
        }

        picked
    }
}
