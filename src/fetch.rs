//! Page fetching.
//!
//! The scraping modes only ever see the [`PageFetcher`] trait, so they run the
//! same against the live sites ([`HttpFetcher`]), the on-disk cache
//! ([`crate::cache::CachingFetcher`]) or canned documents in tests.

use crate::config::Settings;
use crate::error::{FetchError, ScrapeError, SkipReason, Step};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// A successfully fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Page {
    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.text())
    }
}

/// Anything that can GET a URL.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// Plain HTTP fetcher on top of a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?.to_vec();
        debug!(bytes = body.len(), status = status.as_u16(), "Fetched page");
        Ok(Page {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Fetch a page where failure only means "this item is missing".
///
/// The failure is logged and turned into [`SkipReason::FetchFailed`].
pub async fn fetch_or_skip<F: PageFetcher>(fetcher: &F, url: &str) -> Step<Page> {
    match fetcher.fetch(url).await {
        Ok(page) => Step::Done(page),
        Err(e) => {
            warn!(%url, error = %e, "Fetch failed; skipping");
            Step::Skip(SkipReason::FetchFailed)
        }
    }
}

/// Fetch a page whose failure aborts the current mode.
pub async fn fetch_required<F: PageFetcher>(fetcher: &F, url: &str) -> Result<Page, ScrapeError> {
    fetcher.fetch(url).await.map_err(|source| ScrapeError::Fetch {
        url: url.to_string(),
        source,
    })
}
