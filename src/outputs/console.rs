//! Plain console output.

use crate::models::ResultTable;
use itertools::Itertools;
use std::io::{self, Write};

/// Print the header and every row, cells joined by a single space.
pub fn default_output<W: Write>(table: &ResultTable, out: &mut W) -> io::Result<()> {
    for row in table.all_rows() {
        writeln!(out, "{}", row.iter().join(" "))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_lines() {
        let mut table = ResultTable::new(["Status", "Count"]);
        table.push_row(["Active", "3"]);
        table.push_row(["Total", "3"]);

        let mut buf = Vec::new();
        default_output(&table, &mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "Status Count\nActive 3\nTotal 3\n");
    }
}
