//! Table types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell: integers stay numeric in the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Whole number (army points, SWC, objective points)
    Number(u64),
    /// Anything else, verbatim
    Text(String),
}

impl Cell {
    /// Build a cell from raw text, keeping pure digit strings numeric.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<u64>() {
                return Cell::Number(n);
            }
        }
        Cell::Text(trimmed.to_string())
    }

    /// Numeric value, if any.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n)
    }
}

/// One table row: column name to cell, in column order.
pub type Row = IndexMap<String, Cell>;

/// An ordered sequence of rows sharing one column set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names (based on first row).
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|r| r.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when every row carries exactly the first row's columns, in order.
    pub fn has_consistent_columns(&self) -> bool {
        let columns = self.columns();
        self.rows
            .iter()
            .all(|r| r.keys().map(String::as_str).eq(columns.iter().copied()))
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Cell)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("300"), Cell::Number(300));
        assert_eq!(Cell::parse(" 24 in x 8 in "), Cell::Text("24 in x 8 in".into()));
        assert_eq!(Cell::parse(""), Cell::Text(String::new()));
    }

    #[test]
    fn test_table_columns() {
        let mut table = Table::new();
        assert!(table.columns().is_empty());

        table.add_row(row(&[("side", "A".into()), ("points", 300.into())]));
        table.add_row(row(&[("side", "B".into()), ("points", 400.into())]));

        assert_eq!(table.columns(), vec!["side", "points"]);
        assert!(table.has_consistent_columns());

        table.add_row(row(&[("side", "C".into())]));
        assert!(!table.has_consistent_columns());
    }

    #[test]
    fn test_table_serializes_as_array() {
        let table: Table = vec![row(&[("objective", "Kill".into()), ("points", 2.into())])]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"objective":"Kill","points":2}]"#);
    }
}
