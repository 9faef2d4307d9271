// src/io/tables.rs

use crate::error::PlannerError;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Which of the three planner inputs a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Rates,
    Calendar,
    Demand,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Rates => "rates",
            TableKind::Calendar => "calendar",
            TableKind::Demand => "demand",
        };
        f.write_str(name)
    }
}

/// A parsed table of string cells. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The three raw tables handed to the planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTables {
    pub rates: Table,
    pub calendar: Table,
    pub demand: Table,
}

impl Table {
    /// Builds a table from literal cells; handy for tests and embedding callers.
    pub fn from_cells(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Parses CSV text with a header row.
    pub fn from_reader<R: Read>(kind: TableKind, reader: R) -> Result<Self, PlannerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::collect(kind, &mut rdr)
    }

    pub fn from_path(kind: TableKind, path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| PlannerError::Read {
                table: kind.to_string(),
                source,
            })?;
        Self::collect(kind, &mut rdr)
    }

    fn collect<R: Read>(kind: TableKind, rdr: &mut csv::Reader<R>) -> Result<Self, PlannerError> {
        let read_err = |source: csv::Error| PlannerError::Read {
            table: kind.to_string(),
            source,
        };

        let headers = rdr
            .headers()
            .map_err(read_err)?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(read_err)?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Index of the first header matching any alias, ignoring case, whitespace,
    /// underscores and hyphens.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        self.headers.iter().position(|header| {
            let header = canonical(header);
            aliases.iter().any(|alias| canonical(alias) == header)
        })
    }

    /// Trimmed cell content, `None` when the cell is absent or blank.
    pub fn cell(row: &[String], index: usize) -> Option<&str> {
        row.get(index).map(|c| c.trim()).filter(|c| !c.is_empty())
    }
}

fn canonical(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_ignores_case_and_separators() {
        let table = Table::from_cells(&[" Line ", "MONTH", "Available Time"], &[]);
        assert_eq!(table.column(&["line"]), Some(0));
        assert_eq!(table.column(&["month"]), Some(1));
        assert_eq!(table.column(&["available_time"]), Some(2));
        assert_eq!(table.column(&["availableTime"]), Some(2));
        assert_eq!(table.column(&["rate"]), None);
    }

    #[test]
    fn reads_csv_with_short_rows() {
        let text = "product,line,rate\nA, L1 ,10\nB,L2\n";
        let table = Table::from_reader(TableKind::Rates, text.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["product", "line", "rate"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(Table::cell(&table.rows[0], 1), Some("L1"));
        assert_eq!(Table::cell(&table.rows[1], 2), None);
    }

    #[test]
    fn blank_cells_read_as_missing() {
        let row = vec!["A".to_string(), "   ".to_string()];
        assert_eq!(Table::cell(&row, 0), Some("A"));
        assert_eq!(Table::cell(&row, 1), None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Table::from_path(TableKind::Demand, "/nonexistent/demand.csv").unwrap_err();
        assert!(matches!(err, PlannerError::Read { ref table, .. } if table == "demand"));
    }
}
