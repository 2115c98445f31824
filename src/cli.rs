//! Command handler functions for the covview CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Coverage;
use crate::parser;
use crate::stats::{self, MinimumCoverage};

fn read_report(path: &Path) -> Result<Coverage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    let coverage = parser::parse(&bytes)
        .with_context(|| format!("Failed to parse report {}", path.display()))?;
    Ok(coverage)
}

pub fn cmd_summary(report: &Path, minimum: MinimumCoverage) -> Result<String> {
    let coverage = read_report(report)?;

    let mut hits = 0usize;
    let mut misses = 0usize;
    for class in coverage.classes() {
        hits += class.hit_lines().len();
        misses += class.miss_lines().len();
    }

    let mut out = String::new();
    writeln!(out, "Report:     {}", report.display()).unwrap();
    writeln!(out, "Sources:    {}", coverage.sources.len()).unwrap();
    writeln!(out, "Files:      {}", coverage.classes().count()).unwrap();
    writeln!(out, "Lines:      {}/{}", hits, hits + misses).unwrap();
    match stats::percent(hits, misses) {
        Some(p) => {
            let marker = if minimum.meets(p) { "ok" } else { "warn" };
            writeln!(
                out,
                "Coverage:   {}% (minimum {}%, {})",
                stats::format_percent(p),
                stats::format_percent(minimum.value()),
                marker
            )
            .unwrap();
        }
        None => writeln!(out, "Coverage:   no data").unwrap(),
    }
    Ok(out)
}

pub fn cmd_files(
    report: &Path,
    minimum: MinimumCoverage,
    sort_by_coverage: bool,
) -> Result<String> {
    let coverage = read_report(report)?;

    let mut rows: Vec<(String, Option<f64>)> = coverage
        .classes()
        .map(|c| (c.filename.clone(), stats::class_percent(c)))
        .collect();

    if sort_by_coverage {
        rows.sort_by(|a, b| {
            a.1.unwrap_or(f64::MAX)
                .total_cmp(&b.1.unwrap_or(f64::MAX))
        });
    }

    let mut out = String::new();
    writeln!(out, "{:<60} {:>10}", "FILE", "COVERAGE").unwrap();
    writeln!(out, "{}", "-".repeat(72)).unwrap();
    for (filename, percent) in &rows {
        match percent {
            Some(p) => writeln!(
                out,
                "{:<60} {:>8}/{}",
                filename,
                stats::format_percent(*p),
                stats::format_percent(minimum.value())
            )
            .unwrap(),
            None => writeln!(out, "{:<60} {:>10}", filename, "no data").unwrap(),
        }
    }
    Ok(out)
}

pub fn cmd_lines(report: &Path, file: &str, uncovered: bool) -> Result<String> {
    let coverage = read_report(report)?;

    let class = coverage
        .classes()
        .find(|c| c.filename == file)
        .with_context(|| format!("No coverage data for '{}'", file))?;

    if uncovered {
        let misses = class.miss_lines();
        if misses.is_empty() {
            return Ok(format!("All reported lines are covered in '{}'\n", file));
        }
        let mut out = String::new();
        writeln!(out, "Uncovered lines in '{}':", file).unwrap();
        let rendered: Vec<String> = misses.iter().map(|n| n.to_string()).collect();
        writeln!(out, "  {}", rendered.join(", ")).unwrap();
        writeln!(out, "  ({} lines)", misses.len()).unwrap();
        return Ok(out);
    }

    let mut out = String::new();
    writeln!(out, "{:>6}  {:>10}", "LINE", "HITS").unwrap();
    writeln!(out, "{}", "-".repeat(18)).unwrap();
    for line in &class.lines {
        let marker = if line.covered() { "✓" } else { "✗" };
        writeln!(out, "{:>6}  {:>10}  {}", line.number, line.hit_count, marker).unwrap();
    }
    Ok(out)
}
