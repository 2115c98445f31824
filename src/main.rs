use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covview::cli;
use covview::stats::MinimumCoverage;

/// covview — inspect Cobertura coverage reports the way the editor
/// integration sees them.
#[derive(Parser)]
#[command(name = "covview", version, about)]
struct Cli {
    /// Minimum coverage percentage for the ok/warn verdict.
    #[arg(long, global = true, default_value_t = 80.0)]
    min_coverage: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an aggregate summary of a report.
    Summary {
        /// Path to the Cobertura XML report.
        report: PathBuf,
    },

    /// List per-file coverage for a report.
    Files {
        report: PathBuf,

        /// Sort by coverage rate ascending (show worst files first).
        #[arg(long)]
        sort_by_coverage: bool,
    },

    /// Show line-level coverage for one file in the report.
    Lines {
        report: PathBuf,

        /// The source file path as written in the report.
        file: String,

        /// Show only uncovered lines.
        #[arg(long)]
        uncovered: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let minimum = MinimumCoverage::new(cli.min_coverage)?;

    let out = match cli.command {
        Commands::Summary { report } => cli::cmd_summary(&report, minimum)?,
        Commands::Files {
            report,
            sort_by_coverage,
        } => cli::cmd_files(&report, minimum, sort_by_coverage)?,
        Commands::Lines {
            report,
            file,
            uncovered,
        } => cli::cmd_lines(&report, &file, uncovered)?,
    };
    print!("{out}");
    Ok(())
}
