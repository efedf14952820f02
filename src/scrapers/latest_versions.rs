//! Python versions listed in the documentation sidebar.
//!
//! The sidebar of <https://docs.python.org/3/> has a list headed
//! "All versions" with links like `Python 3.13 (stable)`. Each link becomes
//! one row of `(link, version, status)`.

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::markup::{Attr, find_all, find_required, text_of};
use crate::models::ResultTable;
use crate::scrapers::fetch_listing;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::{info, instrument};

static VERSION_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").expect("valid version regex"));

/// Split `Python 3.12 (security-fixes)` into version and status.
///
/// Text that does not fit the pattern is returned whole as the version with
/// an empty status.
pub fn split_version(text: &str) -> (String, String) {
    match VERSION_STATUS.captures(text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (text.to_string(), String::new()),
    }
}

pub fn parse_versions(document: &Html) -> Result<ResultTable, ScrapeError> {
    let sidebar = find_required(document.root_element(), "div", &[Attr::Class("sphinxsidebarwrapper")])?;
    let list = find_all(sidebar, "ul", &[])
        .into_iter()
        .find(|ul| text_of(*ul).contains("All versions"))
        .ok_or(ScrapeError::VersionListMissing)?;

    let mut table = ResultTable::new(["Documentation link", "Version", "Status"]);
    for link in find_all(list, "a", &[]) {
        let href = link.value().attr("href").unwrap_or_default();
        let (version, status) = split_version(&text_of(link));
        table.push_row([href.to_string(), version, status]);
    }
    Ok(table)
}

#[instrument(level = "info", skip_all, fields(url = %settings.main_doc_url))]
pub async fn latest_versions<F: PageFetcher>(
    fetcher: &F,
    settings: &Settings,
) -> Result<Option<ResultTable>, ScrapeError> {
    let Some(page) = fetch_listing(fetcher, &settings.main_doc_url).await else {
        return Ok(None);
    };
    let table = parse_versions(&page.html())?;
    info!(count = table.len(), "Collected Python versions");
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const SIDEBAR: &str = r#"
        <html><body><div class="sphinxsidebar"><div class="sphinxsidebarwrapper">
          <h3>Navigation</h3>
          <ul><li><a href="/3/index.html">Index</a></li></ul>
          <ul>
            <li><a href="https://docs.python.org/3.14/">Python 3.14 (in development)</a></li>
            <li><a href="https://docs.python.org/3.13/">Python 3.13 (stable)</a></li>
            <li><a href="https://www.python.org/doc/versions/">All versions</a></li>
          </ul>
        </div></div></body></html>
    "#;

    #[test]
    fn test_split_version_keeps_fallback_shape() {
        assert_eq!(split_version("Python 3.12 (security-fixes)"), ("3.12".into(), "security-fixes".into()));
        assert_eq!(split_version("All versions"), ("All versions".into(), String::new()));
        assert_eq!(split_version("Python 2.7 (EOL)"), ("2.7".into(), "EOL".into()));
    }

    #[test]
    fn test_parse_versions_reads_the_all_versions_list() {
        let table = parse_versions(&Html::parse_document(SIDEBAR)).unwrap();

        assert_eq!(table.header(), ["Documentation link", "Version", "Status"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], ["https://docs.python.org/3.13/", "3.13", "stable"]);
        assert_eq!(table.rows()[2], ["https://www.python.org/doc/versions/", "All versions", ""]);
    }

    #[test]
    fn test_missing_version_list_is_fatal() {
        let html = r#"<div class="sphinxsidebarwrapper"><ul><li>Nothing</li></ul></div>"#;
        let err = parse_versions(&Html::parse_document(html)).unwrap_err();
        assert!(matches!(err, ScrapeError::VersionListMissing));

        let err = parse_versions(&Html::parse_document("<p>no sidebar</p>")).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement { .. }));
    }

    #[tokio::test]
    async fn test_latest_versions_mode() {
        let settings = Settings {
            main_doc_url: "https://docs.test/3/".into(),
            ..Settings::default()
        };
        let fetcher = StaticFetcher::new().with_page("https://docs.test/3/", SIDEBAR);

        let table = latest_versions(&fetcher, &settings).await.unwrap().unwrap();
        assert_eq!(table.rows()[0][1], "3.14");

        let offline = StaticFetcher::new();
        assert!(latest_versions(&offline, &settings).await.unwrap().is_none());
    }
}
