//! "What's New" articles for every Python release.

use crate::config::Settings;
use crate::error::{ScrapeError, Step};
use crate::fetch::{PageFetcher, fetch_or_skip};
use crate::markup::{Attr, find_all, find_required, text_of};
use crate::models::ResultTable;
use crate::progress;
use crate::scrapers::fetch_listing;
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

/// Absolute links to the per-version articles, in page order.
pub fn article_links(document: &Html, base: &Url) -> Result<Vec<String>, ScrapeError> {
    let section = find_required(document.root_element(), "section", &[Attr::Id("what-s-new-in-python")])?;
    let wrapper = find_required(section, "div", &[Attr::Class("toctree-wrapper")])?;

    find_all(wrapper, "li", &[Attr::Class("toctree-l1")])
        .into_iter()
        .map(|item| -> Result<String, ScrapeError> {
            let link = find_required(item, "a", &[])?;
            let href = link.value().attr("href").unwrap_or_default();
            Ok(base.join(href)?.to_string())
        })
        .collect()
}

/// Title and editor/author line of one article.
pub fn parse_article(document: &Html) -> Result<(String, String), ScrapeError> {
    let root = document.root_element();
    let h1 = find_required(root, "h1", &[])?;
    let dl = find_required(root, "dl", &[])?;
    Ok((text_of(h1), text_of(dl).replace('\n', " ")))
}

/// Fetch one article; an unreachable page is skipped, changed markup is fatal.
pub async fn fetch_article<F: PageFetcher>(fetcher: &F, link: &str) -> Step<(String, String)> {
    let page = match fetch_or_skip(fetcher, link).await {
        Step::Done(page) => page,
        Step::Skip(reason) => return Step::Skip(reason),
        Step::Fatal(e) => return Step::Fatal(e),
    };
    match parse_article(&page.html()) {
        Ok(fields) => Step::Done(fields),
        Err(e) => Step::Fatal(e),
    }
}

#[instrument(level = "info", skip_all)]
pub async fn whats_new<F: PageFetcher>(fetcher: &F, settings: &Settings) -> Result<Option<ResultTable>, ScrapeError> {
    let whats_new_url = Url::parse(&settings.main_doc_url)?.join("whatsnew/")?;
    let Some(page) = fetch_listing(fetcher, whats_new_url.as_str()).await else {
        return Ok(None);
    };
    let links = article_links(&page.html(), &whats_new_url)?;
    info!(count = links.len(), "Found What's New articles");

    let mut table = ResultTable::new(["Documentation link", "Title", "Editor, author"]);
    let pb = progress::bar(links.len(), settings.show_progress);
    for link in links {
        pb.inc(1);
        let (title, authors) = match fetch_article(fetcher, &link).await {
            Step::Done(fields) => fields,
            Step::Skip(reason) => {
                debug!(%link, %reason, "Skipping article");
                continue;
            }
            Step::Fatal(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        table.push_row([link, title, authors]);
    }
    pb.finish_and_clear();

    Ok(Some(table))
}
