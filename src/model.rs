//! Uniform in-memory representation of a parsed coverage report. The parser
//! produces a `Coverage` which is then resolved against the local filesystem
//! and queried by the view synchronizer.

use std::path::PathBuf;

/// A single line record from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number, as written in the report.
    pub number: u32,
    pub hit_count: u64,
}

impl Line {
    #[must_use]
    pub fn covered(&self) -> bool {
        self.hit_count > 0
    }
}

/// Coverage data for a single class (one source file in Cobertura terms).
///
/// Lines keep report order; duplicate line numbers are preserved, not merged.
#[derive(Debug, Clone, Default)]
pub struct Class {
    pub name: String,
    /// Report-relative filename, in the report's own separator convention.
    pub filename: String,
    pub lines: Vec<Line>,
}

impl Class {
    pub fn new(name: String, filename: String) -> Self {
        Self {
            name,
            filename,
            ..Default::default()
        }
    }

    /// Line numbers executed at least once.
    #[must_use]
    pub fn hit_lines(&self) -> Vec<u32> {
        self.lines
            .iter()
            .filter(|l| l.covered())
            .map(|l| l.number)
            .collect()
    }

    /// Line numbers never executed.
    #[must_use]
    pub fn miss_lines(&self) -> Vec<u32> {
        self.lines
            .iter()
            .filter(|l| !l.covered())
            .map(|l| l.number)
            .collect()
    }
}

/// A `<package>` grouping of classes.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    pub classes: Vec<Class>,
}

/// The complete result of parsing one report. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    /// Declared source roots, in document order.
    pub sources: Vec<String>,
    pub packages: Vec<Package>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All classes across all packages, in report order.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.packages.iter().flat_map(|p| p.classes.iter())
    }
}

/// A coverage class proven to exist on the local filesystem.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub class: Class,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss_lines() {
        let class = Class {
            name: "a".to_string(),
            filename: "a.cpp".to_string(),
            lines: vec![
                Line {
                    number: 1,
                    hit_count: 5,
                },
                Line {
                    number: 2,
                    hit_count: 0,
                },
                Line {
                    number: 3,
                    hit_count: 1,
                },
            ],
        };

        assert_eq!(class.hit_lines(), vec![1, 3]);
        assert_eq!(class.miss_lines(), vec![2]);
    }

    #[test]
    fn test_duplicate_line_numbers_preserved() {
        let class = Class {
            name: "a".to_string(),
            filename: "a.cpp".to_string(),
            lines: vec![
                Line {
                    number: 4,
                    hit_count: 2,
                },
                Line {
                    number: 4,
                    hit_count: 2,
                },
            ],
        };

        assert_eq!(class.lines.len(), 2);
        assert_eq!(class.hit_lines(), vec![4, 4]);
    }

    #[test]
    fn test_classes_iterates_all_packages() {
        let coverage = Coverage {
            sources: vec![],
            packages: vec![
                Package {
                    name: "p1".to_string(),
                    classes: vec![Class::new("a".to_string(), "a.cpp".to_string())],
                },
                Package {
                    name: "p2".to_string(),
                    classes: vec![
                        Class::new("b".to_string(), "b.cpp".to_string()),
                        Class::new("c".to_string(), "c.cpp".to_string()),
                    ],
                },
            ],
        };

        let names: Vec<_> = coverage.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
