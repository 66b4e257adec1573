use std::collections::BTreeSet;

use log::debug;

use crate::repository::{PACKAGE_SUFFIX, Package, RepositoryIndex};

const MINGW_PREFIXES: [&str; 2] = ["mingw32-", "mingw64-"];

/// Strips one leading `mingw32-` or `mingw64-` from a package name.
///
/// The build service publishes every MinGW package twice, once per target
/// prefix, so users select by the unprefixed logical name.
pub fn normalize_name(name: &str) -> &str {
    MINGW_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Turns request tokens into package names (or literal filenames).
pub struct PackageMatcher<'a> {
    index: &'a RepositoryIndex,
}

impl<'a> PackageMatcher<'a> {
    pub fn new(index: &'a RepositoryIndex) -> Self {
        Self { index }
    }

    /// Resolves one token.
    ///
    /// - `*.rpm` tokens are literal filenames and pass through unchanged.
    /// - Anything else is a case-sensitive shell glob matched against the
    ///   normalized name of every indexed package. `**` behaves like `*` and a
    ///   `[` without a closing `]` matches itself.
    /// - A token that matches nothing (or is not a valid glob) is kept as a
    ///   literal name, so the resolver can report it as missing.
    pub fn resolve_token(&self, token: &str) -> BTreeSet<String> {
        if token.ends_with(PACKAGE_SUFFIX) {
            return BTreeSet::from([token.to_string()]);
        }

        let matched: BTreeSet<String> = match glob::Pattern::new(&shell_pattern(token)) {
            Ok(pattern) => self
                .index
                .packages()
                .iter()
                .filter(|p| pattern.matches(normalize_name(&p.name)))
                .map(|p| p.name.clone())
                .collect(),
            Err(e) => {
                debug!("'{}' is not a valid pattern ({}), using it literally", token, e);
                BTreeSet::new()
            }
        };

        if matched.is_empty() {
            BTreeSet::from([token.to_string()])
        } else {
            matched
        }
    }

    /// The package whose filename names the zip and metadata outputs.
    ///
    /// An exact or prefixed name wins; otherwise the newest build of the first
    /// name the token expands to.
    pub fn primary_package(&self, token: &str) -> Option<&'a Package> {
        self.index.find_with_prefix_fallback(token).or_else(|| {
            self.resolve_token(token)
                .iter()
                .find_map(|name| self.index.newest(name))
        })
    }

    /// Union of [`resolve_token`](Self::resolve_token) over a whole request.
    pub fn resolve_all<'t, I>(&self, tokens: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'t String>,
    {
        tokens
            .into_iter()
            .flat_map(|token| self.resolve_token(token))
            .collect()
    }
}

/// Rewrites a shell pattern into `glob::Pattern` syntax. Runs of `*` collapse
/// to one and an unclosed `[` is escaped.
fn shell_pattern(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mut pattern = String::with_capacity(token.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                pattern.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    pattern.extend(&chars[i..=end]);
                    i = end;
                }
                None => pattern.push_str("[[]"),
            },
            c => pattern.push(c),
        }
        i += 1;
    }
    pattern
}

/// Index of the `]` closing the bracket class opened at `start`. A `]` right
/// after `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut first = start + 1;
    if chars.get(first) == Some(&'!') {
        first += 1;
    }
    if chars.get(first) == Some(&']') {
        first += 1;
    }
    chars
        .get(first..)?
        .iter()
        .position(|&c| c == ']')
        .map(|offset| first + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{index_from, pkg};

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("mingw32-foobar"), "foobar");
        assert_eq!(normalize_name("mingw64-foobar"), "foobar");
        assert_eq!(normalize_name("foobar"), "foobar");
        // Only a leading prefix is stripped, and only once.
        assert_eq!(normalize_name("mingw32-mingw64-x"), "mingw64-x");
        assert_eq!(normalize_name("lib-mingw32-x"), "lib-mingw32-x");
    }

    #[test]
    fn test_glob_matches_both_prefixed_variants() {
        let index = index_from(vec![
            pkg("mingw32-foobar", 1, &[], &[]),
            pkg("mingw64-foobar", 1, &[], &[]),
            pkg("mingw32-baz", 1, &[], &[]),
        ]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(
            matcher.resolve_token("foo*"),
            names(&["mingw32-foobar", "mingw64-foobar"])
        );
        assert_eq!(
            matcher.resolve_token("foobar"),
            names(&["mingw32-foobar", "mingw64-foobar"])
        );
    }

    #[test]
    fn test_glob_is_case_sensitive() {
        let index = index_from(vec![pkg("mingw32-SDL2", 1, &[], &[])]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(matcher.resolve_token("SDL*"), names(&["mingw32-SDL2"]));
        assert_eq!(matcher.resolve_token("sdl*"), names(&["sdl*"]));
    }

    #[test]
    fn test_rpm_filename_is_literal() {
        let index = index_from(vec![pkg("mingw32-zlib", 1, &[], &[])]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(
            matcher.resolve_token("mingw32-z*.rpm"),
            names(&["mingw32-z*.rpm"])
        );
    }

    #[test]
    fn test_unmatched_token_falls_back_to_literal() {
        let index = index_from(vec![pkg("mingw32-zlib", 1, &[], &[])]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(matcher.resolve_token("gtk3"), names(&["gtk3"]));
        // The prefixed name does not glob-match any normalized name but is
        // still found by exact name later on.
        assert_eq!(matcher.resolve_token("mingw32-zlib"), names(&["mingw32-zlib"]));
    }

    #[test]
    fn test_unclosed_bracket_matches_itself() {
        let index = index_from(vec![
            pkg("mingw32-zlib", 1, &[], &[]),
            pkg("mingw32-foo[", 1, &[], &[]),
        ]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(matcher.resolve_token("zlib["), names(&["zlib["]));
        assert_eq!(matcher.resolve_token("foo["), names(&["mingw32-foo["]));
        assert_eq!(matcher.resolve_token("f*["), names(&["mingw32-foo["]));
    }

    #[test]
    fn test_double_star_inside_name_globs() {
        let index = index_from(vec![
            pkg("mingw32-gtk3", 1, &[], &[]),
            pkg("mingw64-gtk2", 1, &[], &[]),
            pkg("mingw32-zlib", 1, &[], &[]),
        ]);
        let matcher = PackageMatcher::new(&index);

        assert_eq!(
            matcher.resolve_token("gtk**"),
            names(&["mingw32-gtk3", "mingw64-gtk2"])
        );
        assert_eq!(matcher.resolve_token("g**3"), names(&["mingw32-gtk3"]));
    }

    #[test]
    fn test_shell_pattern_rewrites() {
        assert_eq!(shell_pattern("gtk**"), "gtk*");
        assert_eq!(shell_pattern("a***b*"), "a*b*");
        assert_eq!(shell_pattern("foo["), "foo[[]");
        assert_eq!(shell_pattern("lib[0-9]*"), "lib[0-9]*");
        assert_eq!(shell_pattern("x[]]"), "x[]]");
        assert_eq!(shell_pattern("x[!]"), "x[[]!]");
    }

    #[test]
    fn test_primary_package_prefers_exact_then_glob() {
        let index = index_from(vec![
            pkg("mingw32-SDL2", 1, &[], &[]),
            pkg("mingw32-SDL2", 2, &[], &[]),
            pkg("mingw32-SDL2_image", 1, &[], &[]),
            pkg("mingw64-SDL2", 1, &[], &[]),
        ]);
        let matcher = PackageMatcher::new(&index);

        let exact = matcher.primary_package("mingw64-SDL2").unwrap();
        assert_eq!(exact.name, "mingw64-SDL2");

        let prefixed = matcher.primary_package("SDL2").unwrap();
        assert_eq!(prefixed.filename, "mingw32-SDL2-2.noarch.rpm");

        let globbed = matcher.primary_package("SDL2*").unwrap();
        assert_eq!(globbed.filename, "mingw32-SDL2-2.noarch.rpm");

        assert!(matcher.primary_package("gtk*").is_none());
    }

    #[test]
    fn test_resolve_all_unions_tokens() {
        let index = index_from(vec![
            pkg("mingw32-zlib", 1, &[], &[]),
            pkg("mingw32-libpng", 1, &[], &[]),
        ]);
        let matcher = PackageMatcher::new(&index);
        let request = vec!["zlib".to_string(), "lib*".to_string(), "zlib".to_string()];

        assert_eq!(
            matcher.resolve_all(&request),
            names(&["mingw32-libpng", "mingw32-zlib"])
        );
    }
}
