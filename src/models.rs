//! Data passed between the scrapers and the output sinks.
//!
//! - [`ResultTable`]: header plus rows, the only thing output sinks see
//! - [`PepIndexEntry`], [`ReconciliationOutcome`], [`StatusHistogram`]: working
//!   state of the `pep` mode, rebuilt on every run

use std::collections::BTreeMap;

/// A header row followed by data rows. Every cell is already text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(row.into_iter().map(|c| c.to_string()).collect());
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Header first, then the data rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of the PEP numerical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PepIndexEntry {
    /// Link text, digits only.
    pub number: String,
    pub detail_url: String,
    /// Second letter of the row's status marker, or empty.
    pub preview_status: String,
}

/// A PEP whose detail page disagrees with its index preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub url: String,
    pub actual_status: String,
    pub expected_statuses: &'static [&'static str],
}

/// Occurrences of each actual PEP status.
///
/// Backed by a `BTreeMap`, so iteration is already in ascending status order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusHistogram {
    counts: BTreeMap<String, usize>,
}

impl StatusHistogram {
    pub fn record(&mut self, status: &str) {
        *self.counts.entry(status.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, status: &str) -> usize {
        self.counts.get(status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(s, c)| (s.as_str(), *c))
    }

    /// `("Status", "Count")` header, one row per status, then `("Total", N)`.
    pub fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(["Status", "Count"]);
        for (status, count) in self.iter() {
            table.push_row([status.to_string(), count.to_string()]);
        }
        table.push_row(["Total".to_string(), self.total().to_string()]);
        table
    }
}
