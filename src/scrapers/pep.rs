//! PEP status cross-check.
//!
//! The numerical index at <https://peps.python.org/numerical/> shows a two
//! letter marker per PEP (type + status, e.g. `SF` for Standards Track /
//! Final). The status letter is only a preview; the authoritative status is
//! on each PEP's own page. This module fetches every detail page, compares
//! the two, logs disagreements and counts the real statuses.
//!
//! # Skip policy
//!
//! | Situation | Effect |
//! |-----------|--------|
//! | index page cannot be fetched | mode yields no result |
//! | `section#numerical-index` missing | mode fails |
//! | PEP 0 (the index itself) | skipped, not fetched |
//! | detail page cannot be fetched | skipped, not counted |
//! | detail page has no `Status` field | skipped, not counted |
//! | status outside the expected set | counted and logged as a mismatch |

use crate::config::Settings;
use crate::error::{ScrapeError, SkipReason, Step};
use crate::fetch::{PageFetcher, fetch_or_skip};
use crate::markup::{Attr, find_all, find_all_of, find_first, find_required, nearest_enclosing, next_sibling_of_kind, text_of};
use crate::models::{PepIndexEntry, ReconciliationOutcome, ResultTable, StatusHistogram};
use crate::progress;
use crate::scrapers::fetch_listing;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

static PEP_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"pep-\d{4}/").expect("valid PEP link regex"));

/// Status letter on the index page → statuses the detail page may show.
pub const EXPECTED_STATUS: &[(&str, &[&str])] = &[
    ("A", &["Active", "Accepted"]),
    ("D", &["Deferred"]),
    ("F", &["Final", "April Fool!"]),
    ("P", &["Provisional"]),
    ("R", &["Rejected", "April Fool!"]),
    ("S", &["Superseded"]),
    ("W", &["Withdrawn"]),
    ("", &["Draft", "Active"]),
];

/// Expected statuses for a preview code; unknown codes expect nothing.
pub fn expected_statuses(code: &str) -> &'static [&'static str] {
    EXPECTED_STATUS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, statuses)| *statuses)
        .unwrap_or(&[])
}

/// Status letter from an index row's marker: the second of exactly two
/// characters, otherwise empty.
pub fn preview_status(marker: Option<&str>) -> String {
    let Some(marker) = marker.map(str::trim) else {
        return String::new();
    };
    let mut chars = marker.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(_), Some(status), None) => status.to_string(),
        _ => String::new(),
    }
}

/// Collect the PEP links of the numerical index, in document order.
///
/// PEP 0 is kept here; [`reconcile`] skips it so it shows up in the counts.
pub fn parse_index(document: &Html, root: &Url) -> Result<Vec<PepIndexEntry>, ScrapeError> {
    let section = find_required(document.root_element(), "section", &[Attr::Id("numerical-index")])?;

    let mut entries = Vec::new();
    for link in find_all(section, "a", &[Attr::Matches("href", &PEP_HREF)]) {
        let number = text_of(link);
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let marker = nearest_enclosing(link, "tr")
            .and_then(|row| find_first(row, "abbr", &[]))
            .map(text_of);
        let href = link.value().attr("href").unwrap_or_default();
        entries.push(PepIndexEntry {
            number: number.trim().to_string(),
            detail_url: root.join(href)?.to_string(),
            preview_status: preview_status(marker.as_deref()),
        });
    }
    Ok(entries)
}

/// The value next to the first `dt`/`th` whose text contains `Status`.
pub fn extract_status(document: &Html) -> Option<String> {
    let term = find_all_of(document.root_element(), &["dt", "th"])
        .into_iter()
        .find(|tag| text_of(*tag).contains("Status"))?;
    let value = next_sibling_of_kind(term, &["dd", "td"])?;
    Some(text_of(value).trim().to_string())
}

async fn actual_status<F: PageFetcher>(fetcher: &F, entry: &PepIndexEntry) -> Step<String> {
    if entry.number == "0" {
        return Step::Skip(SkipReason::PepZero);
    }
    let page = match fetch_or_skip(fetcher, &entry.detail_url).await {
        Step::Done(page) => page,
        Step::Skip(reason) => return Step::Skip(reason),
        Step::Fatal(e) => return Step::Fatal(e),
    };
    match extract_status(&page.html()) {
        Some(status) => Step::Done(status),
        None => {
            debug!(url = %entry.detail_url, "No Status field on PEP page");
            Step::Skip(SkipReason::StatusMissing)
        }
    }
}

/// Everything learned from one pass over the index.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub histogram: StatusHistogram,
    pub mismatches: Vec<ReconciliationOutcome>,
    pub processed: usize,
    pub skipped: usize,
}

/// Fetch each entry's detail page and compare it against its preview code.
pub async fn reconcile<F: PageFetcher>(
    fetcher: &F,
    entries: &[PepIndexEntry],
    show_progress: bool,
) -> Result<Reconciliation, ScrapeError> {
    let mut result = Reconciliation::default();
    let pb = progress::bar(entries.len(), show_progress);

    for entry in entries {
        result.processed += 1;
        let status = match actual_status(fetcher, entry).await {
            Step::Done(status) => status,
            Step::Skip(_) => {
                result.skipped += 1;
                pb.inc(1);
                continue;
            }
            Step::Fatal(e) => {
                pb.abandon();
                return Err(e);
            }
        };

        let expected = expected_statuses(&entry.preview_status);
        if !expected.contains(&status.as_str()) {
            result.mismatches.push(ReconciliationOutcome {
                url: entry.detail_url.clone(),
                actual_status: status.clone(),
                expected_statuses: expected,
            });
        }
        result.histogram.record(&status);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(result)
}

/// One log record per mismatch, preceded by a count when there are any.
pub fn report_mismatches(mismatches: &[ReconciliationOutcome]) {
    if mismatches.is_empty() {
        return;
    }
    info!(count = mismatches.len(), "Mismatched statuses");
    for outcome in mismatches {
        info!(
            url = %outcome.url,
            actual = %outcome.actual_status,
            expected = ?outcome.expected_statuses,
            "Status on PEP page differs from index preview"
        );
    }
}

/// `pep` mode: status histogram of all PEPs with a `Total` row.
#[instrument(level = "info", skip_all, fields(url = %settings.peps_url))]
pub async fn pep<F: PageFetcher>(fetcher: &F, settings: &Settings) -> Result<Option<ResultTable>, ScrapeError> {
    let Some(page) = fetch_listing(fetcher, &settings.peps_url).await else {
        return Ok(None);
    };
    let root = Url::parse(&settings.peps_root_url)?;
    let entries = parse_index(&page.html(), &root)?;
    info!(count = entries.len(), "Indexed PEP links");

    let result = reconcile(fetcher, &entries, settings.show_progress).await?;

    report_mismatches(&result.mismatches);
    info!(
        processed = result.processed,
        skipped = result.skipped,
        total = result.histogram.total(),
        "PEP statuses counted"
    );

    Ok(Some(result.histogram.to_table()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use std::io;
    use std::sync::{Arc, Mutex};

    const INDEX_URL: &str = "https://peps.test/numerical/";
    const ROOT: &str = "https://peps.test/";

    fn row(marker: Option<&str>, number: &str) -> String {
        let marker = marker.map(|m| format!("<abbr title=\"x\">{m}</abbr>")).unwrap_or_default();
        format!(
            "<tr><td class=\"num\">{marker}</td>\
             <td class=\"num\"><a class=\"pep reference internal\" href=\"../pep-{number:0>4}/\">{number}</a></td>\
             <td><a href=\"../pep-{number:0>4}/\">Title {number}</a></td></tr>"
        )
    }

    fn index(rows: &[String]) -> String {
        format!(
            "<html><body><section id=\"numerical-index\"><table><tbody>{}</tbody></table></section>\
             <a href=\"../pep-0999/\">999</a></body></html>",
            rows.concat()
        )
    }

    fn detail(status: &str) -> String {
        format!(
            "<html><body><dl class=\"rfc2822 field-list\">\
             <dt class=\"field-odd\">Author<span>:</span></dt><dd>Someone</dd>\
             <dt class=\"field-even\">Status<span>:</span></dt>\n<dd class=\"field-even\"><abbr>{status}</abbr> </dd>\
             </dl></body></html>"
        )
    }

    fn settings() -> Settings {
        Settings {
            peps_url: INDEX_URL.to_string(),
            peps_root_url: ROOT.to_string(),
            show_progress: false,
            ..Settings::default()
        }
    }

    fn pep_url(n: u32) -> String {
        format!("{ROOT}pep-{n:04}/")
    }

    #[test]
    fn test_every_known_code_expects_something() {
        for (code, _) in EXPECTED_STATUS {
            assert!(!expected_statuses(code).is_empty(), "code {code:?}");
        }
        assert_eq!(expected_statuses("A"), ["Active", "Accepted"]);
        assert_eq!(expected_statuses(""), ["Draft", "Active"]);
        assert!(expected_statuses("X").is_empty());
        assert!(expected_statuses("AF").is_empty());
    }

    #[test]
    fn test_preview_status_normalization() {
        assert_eq!(preview_status(Some("SF")), "F");
        assert_eq!(preview_status(Some(" IA \n")), "A");
        assert_eq!(preview_status(Some("I")), "");
        assert_eq!(preview_status(Some("ABC")), "");
        assert_eq!(preview_status(None), "");
    }

    #[test]
    fn test_parse_index_keeps_only_numeric_pep_links_in_section() {
        let html = Html::parse_document(&index(&[row(Some("IA"), "0"), row(Some("SF"), "8"), row(None, "12")]));
        let entries = parse_index(&html, &Url::parse(ROOT).unwrap()).unwrap();

        let numbers: Vec<_> = entries.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, ["0", "8", "12"]);
        assert_eq!(entries[1].detail_url, pep_url(8));
        assert_eq!(entries[1].preview_status, "F");
        assert_eq!(entries[2].preview_status, "");
    }

    #[test]
    fn test_parse_index_requires_section() {
        let html = Html::parse_document("<html><body><table></table></body></html>");
        let err = parse_index(&html, &Url::parse(ROOT).unwrap()).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement { .. }));
    }

    #[test]
    fn test_extract_status_reads_neighbouring_value() {
        assert_eq!(extract_status(&Html::parse_document(&detail("Final"))).as_deref(), Some("Final"));

        let table = "<table><tr><th>Status</th><td> Draft </td></tr></table>";
        assert_eq!(extract_status(&Html::parse_document(table)).as_deref(), Some("Draft"));

        assert_eq!(extract_status(&Html::parse_document("<dl><dt>Type</dt><dd>X</dd></dl>")), None);
    }

    #[tokio::test]
    async fn test_matching_status_is_counted_without_mismatch() {
        let fetcher = StaticFetcher::new()
            .with_page(INDEX_URL, index(&[row(Some("IA"), "1")]))
            .with_page(&pep_url(1), detail("Active"));

        let table = pep(&fetcher, &settings()).await.unwrap().unwrap();

        assert_eq!(table.rows(), [vec!["Active".to_string(), "1".to_string()], vec!["Total".into(), "1".into()]]);
    }

    #[tokio::test]
    async fn test_deferred_preview_with_final_page_is_a_mismatch() {
        let fetcher = StaticFetcher::new().with_page(&pep_url(3), detail("Final"));
        let entries = vec![PepIndexEntry {
            number: "3".into(),
            detail_url: pep_url(3),
            preview_status: "D".into(),
        }];

        let result = reconcile(&fetcher, &entries, false).await.unwrap();

        assert_eq!(
            result.mismatches,
            [ReconciliationOutcome {
                url: pep_url(3),
                actual_status: "Final".into(),
                expected_statuses: &["Deferred"],
            }]
        );
        assert_eq!(result.histogram.count("Final"), 1);
    }

    #[tokio::test]
    async fn test_empty_code_rejects_rejected() {
        let fetcher = StaticFetcher::new()
            .with_page(&pep_url(5), detail("Rejected"))
            .with_page(&pep_url(6), detail("Draft"));
        let html = Html::parse_document(&index(&[row(Some("P"), "5"), row(None, "6")]));
        let entries = parse_index(&html, &Url::parse(ROOT).unwrap()).unwrap();

        let result = reconcile(&fetcher, &entries, false).await.unwrap();

        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].actual_status, "Rejected");
        assert_eq!(result.mismatches[0].expected_statuses, ["Draft", "Active"]);
    }

    #[tokio::test]
    async fn test_skips_are_not_counted_and_pep_zero_is_never_fetched() {
        let rows = [
            row(Some("IA"), "0"),
            row(Some("SF"), "8"),
            row(Some("SA"), "20"),
            row(Some("SW"), "42"),
        ];
        let fetcher = StaticFetcher::new()
            .with_page(INDEX_URL, index(&rows))
            .with_page(&pep_url(8), detail("Final"))
            .with_page(&pep_url(42), "<html><body><p>no fields</p></body></html>");

        let table = pep(&fetcher, &settings()).await.unwrap().unwrap();

        assert!(!fetcher.requested().contains(&pep_url(0)));
        assert!(fetcher.requested().contains(&pep_url(20)));
        let last = table.rows().last().unwrap();
        // 4 entries processed, minus PEP 0, the failed fetch and the page without status.
        assert_eq!(last, &vec!["Total".to_string(), "1".to_string()]);
    }

    #[tokio::test]
    async fn test_total_equals_processed_minus_skipped() {
        let html = Html::parse_document(&index(&[
            row(Some("IA"), "0"),
            row(Some("SA"), "1"),
            row(Some("SA"), "2"),
            row(Some("IX"), "3"),
        ]));
        let entries = parse_index(&html, &Url::parse(ROOT).unwrap()).unwrap();
        let fetcher = StaticFetcher::new()
            .with_page(&pep_url(1), detail("Accepted"))
            .with_page(&pep_url(3), detail("Active"));

        let result = reconcile(&fetcher, &entries, false).await.unwrap();

        assert_eq!(result.processed, 4);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.histogram.total(), result.processed - result.skipped);
        // "X" is not a known code, so even a plausible status is reported.
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].url, pep_url(3));
        assert!(result.mismatches[0].expected_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_rows_sorted_before_total() {
        let fetcher = StaticFetcher::new()
            .with_page(INDEX_URL, index(&[row(Some("SW"), "1"), row(Some("SA"), "2"), row(Some("SF"), "3")]))
            .with_page(&pep_url(1), detail("Withdrawn"))
            .with_page(&pep_url(2), detail("Accepted"))
            .with_page(&pep_url(3), detail("Final"));

        let table = pep(&fetcher, &settings()).await.unwrap().unwrap();

        let statuses: Vec<_> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(statuses, ["Accepted", "Final", "Withdrawn", "Total"]);
        assert_eq!(table.rows()[3][1], "3");
    }

    #[tokio::test]
    async fn test_unreachable_index_gives_no_result() {
        let fetcher = StaticFetcher::new();
        assert!(pep(&fetcher, &settings()).await.unwrap().is_none());
        assert_eq!(fetcher.requested(), [INDEX_URL]);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            io::Write::write(&mut *self.0.lock().unwrap(), buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn log_of(mismatches: &[ReconciliationOutcome]) -> String {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || report_mismatches(mismatches));
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_one_log_record_per_mismatch() {
        let mismatches = vec![
            ReconciliationOutcome {
                url: pep_url(3),
                actual_status: "Final".into(),
                expected_statuses: expected_statuses("D"),
            },
            ReconciliationOutcome {
                url: pep_url(7),
                actual_status: "Rejected".into(),
                expected_statuses: expected_statuses(""),
            },
        ];

        let log = log_of(&mismatches);
        let records: Vec<_> = log.lines().filter(|l| l.contains("differs from index preview")).collect();

        assert_eq!(records.len(), 2);
        assert!(records[0].contains(&pep_url(3)) && records[0].contains("Final"));
        assert!(records[1].contains(&pep_url(7)) && records[1].contains("Rejected"));
        assert_eq!(log.lines().filter(|l| l.contains("Mismatched statuses")).count(), 1);
    }

    #[test]
    fn test_no_mismatches_logs_nothing() {
        assert!(log_of(&[]).is_empty());
    }
}
