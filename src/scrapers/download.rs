//! Download of the zipped A4 PDF documentation archive.
//!
//! Unlike the table scrapers, every failure here is fatal: there is nothing
//! useful to return without the archive.

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::fetch::{PageFetcher, fetch_required};
use crate::markup::{Attr, find_required};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

static PDF_A4_ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r".+pdf-a4\.zip$").expect("valid archive regex"));

/// Absolute URL of the PDF (A4) zip in the downloads table.
pub fn archive_url(document: &Html, downloads_url: &Url) -> Result<Url, ScrapeError> {
    let main = find_required(document.root_element(), "div", &[Attr::Eq("role", "main")])?;
    let table = find_required(main, "table", &[Attr::Class("docutils")])?;
    let link = find_required(table, "a", &[Attr::Matches("href", &PDF_A4_ZIP)])?;
    let href = link.value().attr("href").unwrap_or_default();
    Ok(downloads_url.join(href)?)
}

/// Last path segment of the URL, used as the local file name.
pub fn file_name(url: &Url) -> Result<String, ScrapeError> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::InvalidDownloadUrl(url.to_string()))
}

/// Save the archive into the downloads directory and return its path.
#[instrument(level = "info", skip_all)]
pub async fn download<F: PageFetcher>(fetcher: &F, settings: &Settings) -> Result<PathBuf, ScrapeError> {
    let downloads_url = Url::parse(&settings.main_doc_url)?.join("download.html")?;
    let page = fetch_required(fetcher, downloads_url.as_str()).await?;
    let archive_url = archive_url(&page.html(), &downloads_url)?;

    let downloads_dir = settings.downloads_path();
    fs::create_dir_all(&downloads_dir).await?;
    let archive_path = downloads_dir.join(file_name(&archive_url)?);

    info!(url = %archive_url, path = %archive_path.display(), "Downloading archive");
    let archive = fetch_required(fetcher, archive_url.as_str()).await?;
    fs::write(&archive_path, &archive.body).await?;

    info!(path = %archive_path.display(), bytes = archive.body.len(), "Archive downloaded and saved");
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const DOWNLOADS: &str = r#"
        <html><body><div class="body" role="main">
          <table class="docutils align-default"><tbody>
            <tr><td>PDF (US-Letter paper size)</td><td><a href="archives/python-3.13-docs-pdf-letter.zip">Download</a></td></tr>
            <tr><td>PDF (A4 paper size)</td><td><a href="archives/python-3.13-docs-pdf-a4.zip">Download</a></td></tr>
            <tr><td>HTML</td><td><a href="archives/python-3.13-docs-html.zip">Download</a></td></tr>
          </tbody></table>
        </div></body></html>
    "#;

    const ARCHIVE_URL: &str = "https://docs.test/3/archives/python-3.13-docs-pdf-a4.zip";

    #[test]
    fn test_archive_url_picks_a4_zip() {
        let base = Url::parse("https://docs.test/3/download.html").unwrap();
        let url = archive_url(&Html::parse_document(DOWNLOADS), &base).unwrap();
        assert_eq!(url.as_str(), ARCHIVE_URL);
        assert_eq!(file_name(&url).unwrap(), "python-3.13-docs-pdf-a4.zip");
    }

    #[test]
    fn test_file_name_needs_a_segment() {
        let url = Url::parse("https://docs.test/archives/").unwrap();
        assert!(matches!(file_name(&url), Err(ScrapeError::InvalidDownloadUrl(_))));
    }

    #[tokio::test]
    async fn test_download_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            main_doc_url: "https://docs.test/3/".into(),
            base_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let body: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0xff];
        let fetcher = StaticFetcher::new()
            .with_page("https://docs.test/3/download.html", DOWNLOADS)
            .with_page(ARCHIVE_URL, body.clone());

        let path = download(&fetcher, &settings).await.unwrap();

        assert_eq!(path, dir.path().join("downloads").join("python-3.13-docs-pdf-a4.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), body);

        // An existing downloads directory is fine.
        assert!(download(&fetcher, &settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_archive_fetch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            main_doc_url: "https://docs.test/3/".into(),
            base_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let fetcher = StaticFetcher::new().with_page("https://docs.test/3/download.html", DOWNLOADS);

        let err = download(&fetcher, &settings).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { ref url, .. } if url == ARCHIVE_URL));
    }
}
