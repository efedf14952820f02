//! Bordered ASCII table.
//!
//! ```text
//! +--------+-------+
//! | Status | Count |
//! +--------+-------+
//! | Active | 31    |
//! | Total  | 31    |
//! +--------+-------+
//! ```

use crate::models::ResultTable;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Width of each column in characters, header included.
fn column_widths(table: &ResultTable) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in table.all_rows() {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn render_row(row: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, &w) in widths.iter().enumerate() {
        let cell = row.get(i).map(String::as_str).unwrap_or("");
        let _ = write!(line, " {cell:<w$} |");
    }
    line
}

pub fn render(table: &ResultTable) -> String {
    let widths = column_widths(table);
    let border = border(&widths);
    let mut lines = vec![border.clone(), render_row(table.header(), &widths), border.clone()];
    lines.extend(table.rows().iter().map(|row| render_row(row, &widths)));
    if !table.is_empty() {
        lines.push(border);
    }
    lines.join("\n")
}

pub fn pretty_output<W: Write>(table: &ResultTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", render(table))?;
    out.flush()
}
