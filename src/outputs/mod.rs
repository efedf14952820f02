//! Output sinks for result tables.
//!
//! # Submodules
//!
//! - [`console`]: one line per row, cells separated by a space (default)
//! - [`pretty`]: bordered, left-aligned ASCII table (`--output pretty`)
//! - [`file`]: CSV file under the results directory (`--output file`)
//!
//! # Output Structure
//!
//! ```text
//! results/
//! ├── pep_2025-05-06_14-03-59.csv
//! └── latest-versions_2025-05-06_14-05-12.csv
//! ```

pub mod console;
pub mod file;
pub mod pretty;

use crate::cli::{Mode, OutputFormat};
use crate::config::Settings;
use crate::error::ScrapeError;
use crate::models::ResultTable;
use std::io;
use std::path::PathBuf;

/// Render `table` with the selected sink. Returns the CSV path for `file`.
pub fn control_output(
    table: &ResultTable,
    output: Option<OutputFormat>,
    mode: Mode,
    settings: &Settings,
) -> Result<Option<PathBuf>, ScrapeError> {
    let stdout = io::stdout();
    match output {
        Some(OutputFormat::Pretty) => {
            pretty::pretty_output(table, &mut stdout.lock())?;
            Ok(None)
        }
        Some(OutputFormat::File) => file::file_output(table, mode, settings).map(Some),
        None => {
            console::default_output(table, &mut stdout.lock())?;
            Ok(None)
        }
    }
}
