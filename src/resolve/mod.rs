//! Turning a user request into a concrete set of package files.

mod matcher;
mod plan;
mod resolver;

pub use matcher::{PackageMatcher, normalize_name};
pub use plan::FetchPlan;
pub use resolver::{DependencyResolver, Diagnostic, ResolutionResult};
