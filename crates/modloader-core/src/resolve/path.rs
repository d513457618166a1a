//! Relative dependency resolution.

use crate::domain::is_reserved;

/// Resolves `./` and `../` specifiers against the name of the module that
/// declares them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Absolute module name for `specifier` as seen from `requester`.
    ///
    /// Reserved names and specifiers not starting with `.` come back unchanged.
    /// `..` segments that climb above the requester's root are kept verbatim.
    pub fn resolve(&self, requester: &str, specifier: &str) -> String {
        if is_reserved(specifier) || !specifier.starts_with('.') {
            return specifier.to_string();
        }

        let mut base: Vec<&str> = requester.split('/').collect();
        base.pop();

        let mut segments: Vec<&str> = specifier.split('/').collect();
        let leaf = segments.pop().unwrap_or_default();

        for (index, segment) in segments.iter().enumerate() {
            match *segment {
                "." => {}
                ".." if base.is_empty() => {
                    base.extend_from_slice(&segments[index..]);
                    break;
                }
                ".." => {
                    base.pop();
                }
                other => base.push(other),
            }
        }

        base.push(leaf);
        base.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::parent("a/b/c", "../d", "a/d")]
    #[case::sibling("a/b/c", "./d", "a/b/d")]
    #[case::reserved_exports("a/b/c", "exports", "exports")]
    #[case::reserved_module("a/b/c", "module", "module")]
    #[case::absolute("a/b/c", "x/y", "x/y")]
    #[case::two_levels("a/b/c", "../../d", "d")]
    #[case::nested_leaf("a/b/c", "./x/y", "a/b/x/y")]
    #[case::mixed("a/b/c", "./../x/./y", "a/x/y")]
    #[case::top_level_sibling("a", "./b", "b")]
    #[case::above_root("a", "../b", "../b")]
    #[case::far_above_root("a/b", "../../../c", "../../c")]
    fn resolves_relative_specifiers(
        #[case] requester: &str,
        #[case] specifier: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(PathResolver::new().resolve(requester, specifier), expected);
    }
}
