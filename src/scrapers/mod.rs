//! Scraping modes.
//!
//! Each mode fetches one listing page, optionally follows links from it, and
//! returns a [`ResultTable`] for the output sinks.
//!
//! | Mode | Module | Source | Result |
//! |------|--------|--------|--------|
//! | `whats-new` | [`whats_new`] | docs.python.org/3/whatsnew/ | link, title, editors |
//! | `latest-versions` | [`latest_versions`] | docs.python.org/3/ sidebar | link, version, status |
//! | `download` | [`download`] | docs.python.org/3/download.html | saves the PDF archive, no table |
//! | `pep` | [`pep`] | peps.python.org/numerical/ | status histogram with total |
//!
//! All fetches are sequential. If the listing page itself cannot be fetched
//! the table modes log the failure and yield no result; the downloader fails.

pub mod download;
pub mod latest_versions;
pub mod pep;
pub mod whats_new;

use crate::cli::Mode;
use crate::config::Settings;
use crate::error::ScrapeError;
use crate::fetch::{Page, PageFetcher};
use crate::models::ResultTable;
use tracing::{error, info, instrument};

/// Fetch a mode's starting page; `None` means the mode has nothing to report.
pub(crate) async fn fetch_listing<F: PageFetcher>(fetcher: &F, url: &str) -> Option<Page> {
    match fetcher.fetch(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            error!(%url, error = %e, "Could not load listing page; no results");
            None
        }
    }
}

/// Run one scraping mode.
#[instrument(level = "info", skip(fetcher, settings))]
pub async fn run<F: PageFetcher>(
    mode: Mode,
    fetcher: &F,
    settings: &Settings,
) -> Result<Option<ResultTable>, ScrapeError> {
    match mode {
        Mode::WhatsNew => whats_new::whats_new(fetcher, settings).await,
        Mode::LatestVersions => latest_versions::latest_versions(fetcher, settings).await,
        Mode::Download => {
            let path = download::download(fetcher, settings).await?;
            info!(path = %path.display(), "Documentation archive saved");
            Ok(None)
        }
        Mode::Pep => pep::pep(fetcher, settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    #[tokio::test]
    async fn test_table_modes_yield_nothing_when_offline() {
        let settings = Settings {
            show_progress: false,
            ..Settings::default()
        };
        let fetcher = StaticFetcher::new();
        for mode in [Mode::WhatsNew, Mode::LatestVersions, Mode::Pep] {
            assert!(run(mode, &fetcher, &settings).await.unwrap().is_none(), "{mode:?}");
        }
    }

    #[tokio::test]
    async fn test_download_mode_fails_when_offline() {
        let fetcher = StaticFetcher::new();
        let err = run(Mode::Download, &fetcher, &Settings::default()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}
