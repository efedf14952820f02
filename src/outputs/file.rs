//! CSV output.
//!
//! Files are written in the "unix" dialect: comma separated, every field
//! double-quoted, records terminated by `\n`, UTF-8.

use crate::cli::Mode;
use crate::config::Settings;
use crate::error::ScrapeError;
use crate::models::ResultTable;
use chrono::Local;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

/// `{mode}_{timestamp}.csv`
pub fn file_name(mode: Mode, datetime_format: &str) -> Result<String, ScrapeError> {
    let mut stamp = String::new();
    // chrono reports bad strftime patterns only when formatting.
    write!(stamp, "{}", Local::now().format(datetime_format))
        .map_err(|_| ScrapeError::InvalidDatetimeFormat(datetime_format.to_string()))?;
    Ok(format!("{mode}_{stamp}.csv"))
}

/// Write the table (header first) to a new CSV file in the results directory.
#[instrument(level = "info", skip_all, fields(%mode))]
pub fn file_output(table: &ResultTable, mode: Mode, settings: &Settings) -> Result<PathBuf, ScrapeError> {
    let results_dir = settings.results_path();
    fs::create_dir_all(&results_dir)?;
    let file_path = results_dir.join(file_name(mode, &settings.datetime_format)?);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_path(&file_path)?;
    for row in table.all_rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %file_path.display(), "Results saved to file");
    Ok(file_path)
}
