//! On-disk HTTP response cache.
//!
//! Repeated runs (the `pep` mode fetches several hundred detail pages) are
//! served from disk instead of hitting the sites again. The cache is
//! cleared only on request (`--clear-cache`); entries never expire.
//!
//! # Layout
//!
//! ```text
//! .http_cache/
//! ├── 3q2-7w...Qk.json   # one file per URL, named by SHA-256 of the URL
//! └── ...
//! ```
//!
//! Only successful responses are stored. An unreadable entry is treated as a
//! miss and overwritten by the next successful fetch.

use crate::error::FetchError;
use crate::fetch::{Page, PageFetcher};
use base64::{Engine, engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CachedResponse {
    url: String,
    status: u16,
    fetched_at: String,
    body: String,
}

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{}.json", URL_SAFE_NO_PAD.encode(digest)))
    }

    pub async fn get(&self, url: &str) -> Option<Page> {
        let path = self.entry_path(url);
        let raw = fs::read(&path).await.ok()?;
        let entry: CachedResponse = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                return None;
            }
        };
        // Hash collisions are practically impossible, but a renamed file is not.
        if entry.url != url {
            return None;
        }
        let body = STANDARD.decode(entry.body).ok()?;
        Some(Page {
            url: entry.url,
            status: entry.status,
            body,
        })
    }

    pub async fn put(&self, page: &Page) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let entry = CachedResponse {
            url: page.url.clone(),
            status: page.status,
            fetched_at: Utc::now().to_rfc3339(),
            body: STANDARD.encode(&page.body),
        };
        let json = serde_json::to_vec(&entry).map_err(io::Error::other)?;
        fs::write(self.entry_path(&page.url), json).await
    }

    /// Remove every cached response. Returns the number of entries removed.
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> io::Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        info!(removed, "Cleared response cache");
        Ok(removed)
    }
}

/// Serves pages from a [`ResponseCache`], falling back to the inner fetcher.
pub struct CachingFetcher<F> {
    inner: F,
    cache: ResponseCache,
}

impl<F: PageFetcher> CachingFetcher<F> {
    pub fn new(inner: F, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

impl<F: PageFetcher> PageFetcher for CachingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        if let Some(page) = self.cache.get(url).await {
            debug!(%url, "Cache hit");
            return Ok(page);
        }
        let page = self.inner.fetch(url).await?;
        if let Err(e) = self.cache.put(&page).await {
            warn!(%url, error = %e, "Failed to store response in cache");
        }
        Ok(page)
    }
}
