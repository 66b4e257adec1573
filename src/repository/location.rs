use std::fmt;

pub const DEFAULT_PROJECT: &str = "windows:mingw:win32";
pub const DEFAULT_REPOSITORY: &str = "openSUSE_13.2";
pub const DEFAULT_REPO_URL: &str = "http://download.opensuse.org/repositories/PROJECT/REPOSITORY/";

/// Root URL of an RPM repository; always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    base_url: String,
}

impl RepoLocation {
    pub fn new(url: impl Into<String>) -> Self {
        let mut base_url = url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    /// Expands a build-service URL template.
    ///
    /// `PROJECT` is replaced by the project name with every `:` turned into
    /// `:/` (the build service's directory layout), `REPOSITORY` by the
    /// repository name. Templates without placeholders are used verbatim.
    pub fn from_template(template: &str, project: &str, repository: &str) -> Self {
        let url = template
            .replace("PROJECT", &project.replace(':', ":/"))
            .replace("REPOSITORY", repository);
        Self::new(url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a repository-relative href.
    pub fn join(&self, href: &str) -> String {
        format!("{}{}", self.base_url, href.trim_start_matches('/'))
    }

    pub fn repomd_url(&self) -> String {
        self.join("repodata/repomd.xml")
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}
