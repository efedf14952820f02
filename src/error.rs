//! Error taxonomy for the scraping modes.
//!
//! Three kinds of failure show up while scraping:
//!
//! - **Fetch failures** ([`FetchError`]): the network or the server let us down.
//!   Whether this aborts a mode or only skips one entry depends on the call site.
//! - **Structural faults** ([`ScrapeError::MissingElement`]): the page no longer has
//!   the markup we rely on. These always abort the mode.
//! - **Expectation mismatches**: not errors at all, they are data recorded by
//!   the PEP reconciler.
//!
//! Per-entry work returns a [`Step`] so the skip/fatal decision is visible in
//! the type instead of being buried in `match` arms.

use std::fmt;
use thiserror::Error;

/// A single page fetch that did not produce a usable response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// No canned response was registered (used by in-memory fetchers).
    #[error("no response available")]
    Unavailable,
}

/// Errors that abort a scraping mode.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Expected markup was not found; the upstream page layout changed.
    #[error("required element <{tag}> not found (attributes: {attrs})")]
    MissingElement { tag: String, attrs: String },

    #[error("list of Python versions not found in the sidebar")]
    VersionListMissing,

    #[error("cannot derive a file name from {0}")]
    InvalidDownloadUrl(String),

    #[error("invalid datetime format {0:?}")]
    InvalidDatetimeFormat(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cache entry error: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Why an entry was left out of a result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The meta-index row of the PEP table.
    PepZero,
    FetchFailed,
    StatusMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::PepZero => "PEP 0 is the index itself",
            SkipReason::FetchFailed => "page could not be fetched",
            SkipReason::StatusMissing => "no Status field on the page",
        };
        f.write_str(s)
    }
}

/// Outcome of one fetch-and-extract step.
#[derive(Debug)]
pub enum Step<T> {
    Done(T),
    Skip(SkipReason),
    Fatal(ScrapeError),
}
