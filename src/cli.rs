//! Command-line interface definitions.

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Scraping mode selected on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    WhatsNew,
    LatestVersions,
    Download,
    Pep,
}

impl Mode {
    /// The name as typed on the command line, also used in CSV file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How results are rendered. Without `--output` rows are printed line by line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    File,
}

/// Python documentation scraper.
///
/// # Examples
///
/// ```sh
/// pydocs_scrape latest-versions -o pretty
/// pydocs_scrape pep --output file
/// pydocs_scrape whats-new --clear-cache
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Scraping mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Clear the HTTP response cache before running
    #[arg(short, long)]
    pub clear_cache: bool,

    /// Additional output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Optional path to a YAML settings file
    #[arg(long, env = "PYDOCS_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,
}
