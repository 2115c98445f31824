//! The single active report: load, lookup, invalidate.
//!
//! A report is only ever published fully built; a failed (re)load leaves the
//! previously active report untouched, so a bad reload never blanks out a
//! working one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Coverage, ResolvedFile};
use crate::parser;
use crate::resolve;

/// Filesystem collaborator. The core never reads the disk directly; tests
/// inject an in-memory fake.
pub trait Filesystem {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
    fn exists(&self, path: &Path) -> bool;
}

/// `std::fs`-backed implementation for real hosts.
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// A fully parsed and resolved report. Replaced wholesale on reload, never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct ActiveReport {
    pub location: PathBuf,
    pub coverage: Coverage,
    pub resolved: HashMap<PathBuf, ResolvedFile>,
}

impl ActiveReport {
    /// Read, parse and resolve a report file.
    pub fn load(location: &Path, fs: &dyn Filesystem) -> Result<Self> {
        let bytes = fs.read(location)?;
        let coverage = parser::parse(&bytes)?;
        let resolved = resolve::resolve(&coverage, |p| fs.exists(p));
        Ok(Self {
            location: location.to_path_buf(),
            coverage,
            resolved,
        })
    }

    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<&ResolvedFile> {
        self.resolved.get(path)
    }
}

/// Holder of the at-most-one active report.
#[derive(Debug, Default)]
pub struct ReportStore {
    active: Option<ActiveReport>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a report and atomically replace the active one. On error the
    /// prior report stays active.
    pub fn load(&mut self, location: &Path, fs: &dyn Filesystem) -> Result<&ActiveReport> {
        let report = ActiveReport::load(location, fs)?;
        tracing::info!(
            report = %location.display(),
            resolved = report.resolved.len(),
            "loaded coverage report"
        );
        Ok(self.active.insert(report))
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveReport> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<&ResolvedFile> {
        self.active.as_ref().and_then(|r| r.lookup(path))
    }

    /// Drop the active report entirely (backing file deleted, or explicit
    /// unload).
    pub fn invalidate(&mut self) {
        if let Some(report) = self.active.take() {
            tracing::info!(report = %report.location.display(), "cleared active report");
        }
    }

    /// A file-change event triggers a reload only for the exact path the
    /// active report was loaded from; other files matching the report glob
    /// are unrelated.
    #[must_use]
    pub fn wants_reload(&self, changed: &Path) -> bool {
        self.active.as_ref().is_some_and(|r| r.location == changed)
    }
}
