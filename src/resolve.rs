//! Resolution of report-relative filenames against declared source roots.
//!
//! Every (source root, class) pair yields one candidate absolute path; only
//! candidates that exist on the local filesystem are kept. The existence
//! check is injected so tests run against a fake filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Coverage, ResolvedFile};

/// A bare drive designator: a single letter plus ":" and an optional
/// trailing separator, e.g. "C:" or "D:\" as written by Windows coverage
/// tools.
static DRIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]:[/\\]?$").unwrap());

/// Cross-product source roots with classes and keep the candidates that
/// exist. Collisions on the same absolute path are last-write-wins in
/// source-root document order; zero roots or zero classes yield an empty
/// mapping.
pub fn resolve<F>(coverage: &Coverage, exists: F) -> HashMap<PathBuf, ResolvedFile>
where
    F: Fn(&Path) -> bool,
{
    let mut resolved = HashMap::new();

    for root in &coverage.sources {
        for class in coverage.classes() {
            let candidate = join_candidate(root, &class.filename);
            if exists(&candidate) {
                resolved.insert(
                    candidate.clone(),
                    ResolvedFile {
                        path: candidate,
                        class: class.clone(),
                    },
                );
            }
        }
    }

    resolved
}

/// Join a source root with a report-relative filename using platform path
/// semantics. A bare drive designator is a filesystem root prefix, not a
/// relative path component.
fn join_candidate(root: &str, filename: &str) -> PathBuf {
    let relative = normalize_separators(filename);
    if DRIVE_RE.is_match(root) {
        let drive = &root[..2];
        PathBuf::from(format!("{drive}{MAIN_SEPARATOR}{relative}"))
    } else {
        Path::new(root).join(relative)
    }
}

/// Reports may use either separator convention regardless of the platform
/// they are consumed on.
fn normalize_separators(filename: &str) -> String {
    filename.replace(['\\', '/'], MAIN_SEPARATOR.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Class, Line, Package};

    fn coverage(sources: &[&str], filenames: &[&str]) -> Coverage {
        Coverage {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            packages: vec![Package {
                name: "app".to_string(),
                classes: filenames
                    .iter()
                    .map(|f| Class {
                        name: f.to_string(),
                        filename: f.to_string(),
                        lines: vec![Line {
                            number: 1,
                            hit_count: 1,
                        }],
                    })
                    .collect(),
            }],
        }
    }

    fn sep(path: &str) -> PathBuf {
        PathBuf::from(path.replace('/', MAIN_SEPARATOR.to_string().as_str()))
    }

    #[test]
    fn test_resolve_single_root() {
        let cov = coverage(&["/repo"], &["a.cpp"]);
        let resolved = resolve(&cov, |p| p == sep("/repo/a.cpp"));

        assert_eq!(resolved.len(), 1);
        let entry = &resolved[&sep("/repo/a.cpp")];
        assert_eq!(entry.class.filename, "a.cpp");
    }

    #[test]
    fn test_resolve_appears_exactly_once_despite_other_roots() {
        // Two roots produce candidates for the same class; only one exists,
        // so the mapping has exactly one entry.
        let cov = coverage(&["/repo", "/elsewhere"], &["a.cpp"]);
        let resolved = resolve(&cov, |p| p == sep("/repo/a.cpp"));

        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key(&sep("/repo/a.cpp")));
    }

    #[test]
    fn test_resolve_drive_designator_roots() {
        let cov = coverage(&["C:", "D:"], &["b.cpp"]);
        let resolved = resolve(&cov, |p| p == sep("D:/b.cpp"));

        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key(&sep("D:/b.cpp")));
    }

    #[test]
    fn test_resolve_backslash_filenames() {
        let cov = coverage(&["/repo"], &["sub\\b.cpp"]);
        let resolved = resolve(&cov, |p| p == sep("/repo/sub/b.cpp"));

        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_resolve_empty_inputs() {
        let no_roots = coverage(&[], &["a.cpp"]);
        assert!(resolve(&no_roots, |_| true).is_empty());

        let no_classes = coverage(&["/repo"], &[]);
        assert!(resolve(&no_classes, |_| true).is_empty());
    }

    #[test]
    fn test_resolve_last_root_wins_on_collision() {
        // Two different (root, class) pairs produce the same existing path:
        // /a + b/c.cpp and /a/b + c.cpp. The entry must come from the later
        // root in document order.
        let mut cov = coverage(&["/a", "/a/b"], &["b/c.cpp"]);
        cov.packages[0].classes.push(Class {
            name: "later".to_string(),
            filename: "c.cpp".to_string(),
            lines: vec![Line {
                number: 9,
                hit_count: 0,
            }],
        });

        let target = sep("/a/b/c.cpp");
        let resolved = resolve(&cov, |p| p == target);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[&target].class.name, "later");
    }

    #[test]
    fn test_resolve_idempotent() {
        let cov = coverage(&["/repo"], &["a.cpp", "sub/b.cpp"]);
        let exists = |p: &Path| p == sep("/repo/a.cpp") || p == sep("/repo/sub/b.cpp");

        let first = resolve(&cov, exists);
        let second = resolve(&cov, exists);

        assert_eq!(first.len(), 2);
        assert_eq!(first.len(), second.len());
        assert!(first.keys().all(|k| second.contains_key(k)));
    }
}
