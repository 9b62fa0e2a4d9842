//! Table detection on extracted text lines.
//!
//! Page text has lost its geometry, so tables are recognized from the shape of
//! individual lines: objective point lists (`label ..... 2 OP`) and deployment
//! rows (`A and B 300 6 48 in x 48 in 24 in x 12 in`). Cells are tokenized by a
//! measurement-aware pattern so that `24 in x 12 in` stays one cell.

use lazy_static::lazy_static;
use regex::Regex;

use super::text::{marker_len, to_key, visible_len};
use crate::model::{Cell, Row};

lazy_static! {
    static ref POINT_ROW: Regex = Regex::new(
        r"(?i)^\s*(?P<label>[a-z][^.:]*?)\s*(?:\.{2,}|…+|:|[-–—])?\s*(?P<points>\d{1,3})\s*(?:OP|objective\s+points?|points?|pts?)?\.?\s*$"
    )
    .unwrap();
    static ref CELL: Regex = Regex::new(
        r"(?i)radius\s+of\s+\d+\s*(?:in|cm)\b|\d+\s*(?:in|cm)?\s*x\s*\d+\s*(?:in|cm)\b|\d+\s*(?:in|cm)\b|\b[a-z]\s+and\s+[a-z]\b|\d+|[^\s\d]+(?:[ \t]+[^\s\d]+)*"
    )
    .unwrap();
    static ref MEASUREMENT: Regex = Regex::new(r"(?i)^(?:radius\s+of\s+)?\d+\s*(?:in|cm)\b").unwrap();
    static ref HEADER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:army\s+points|game\s+table\s+size|table\s+size|deployment\s+zone|swc|points|sides?|zone)\b"
    )
    .unwrap();
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of consecutive lines to consider as table
    pub min_rows: usize,
    /// Longest label, in words, a point row may carry
    pub max_label_words: usize,
    /// Share of a header line that must be recognized column labels
    pub min_header_coverage: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            max_label_words: 8,
            min_header_coverage: 0.6,
        }
    }
}

/// A run of consecutive `label … points` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRun {
    /// Index of the first line of the run
    pub start: usize,
    /// Index one past the last line of the run
    pub end: usize,
    /// Label and points per line
    pub rows: Vec<(String, u64)>,
}

impl PointRun {
    /// Convert into table rows with `objective` and `points` columns.
    pub fn to_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|(label, points)| {
                let mut row = Row::new();
                row.insert("objective".to_string(), Cell::Text(label.clone()));
                row.insert("points".to_string(), Cell::Number(*points));
                row
            })
            .collect()
    }
}

/// Detects tables in lines of text.
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self {
            config: TableDetectorConfig::default(),
        }
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Parse a single `label … points` line.
    pub fn point_row(&self, line: &str) -> Option<(String, u64)> {
        if marker_len(line).is_some() {
            return None;
        }
        let caps = POINT_ROW.captures(line)?;
        let label = caps.name("label")?.as_str().trim();
        if label.is_empty() || label.split_whitespace().count() > self.config.max_label_words {
            return None;
        }
        let points = caps.name("points")?.as_str().parse().ok()?;
        Some((label.to_string(), points))
    }

    /// Find runs of at least `min_rows` consecutive point lines.
    pub fn detect_point_runs(&self, lines: &[&str]) -> Vec<PointRun> {
        let mut runs = Vec::new();
        let mut current: Option<PointRun> = None;

        for (i, line) in lines.iter().enumerate() {
            match self.point_row(line) {
                Some(row) => match current.as_mut() {
                    Some(run) => {
                        run.end = i + 1;
                        run.rows.push(row);
                    }
                    None => {
                        current = Some(PointRun {
                            start: i,
                            end: i + 1,
                            rows: vec![row],
                        })
                    }
                },
                None => {
                    if let Some(run) = current.take() {
                        self.keep_run(run, &mut runs);
                    }
                }
            }
        }
        if let Some(run) = current.take() {
            self.keep_run(run, &mut runs);
        }

        log::debug!("TableDetector: found {} point runs", runs.len());
        runs
    }

    fn keep_run(&self, run: PointRun, runs: &mut Vec<PointRun>) {
        if run.rows.len() >= self.config.min_rows {
            runs.push(run);
        }
    }

    /// Split a line into cells, keeping measurements and `A and B` labels whole.
    pub fn split_cells(line: &str) -> Vec<String> {
        CELL.find_iter(line)
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Check if a tokenized line looks like a deployment row: an army point
    /// total, a zone measurement and at most one free-text cell.
    pub fn is_deployment_row(cells: &[String]) -> bool {
        let has_points = cells.iter().any(|c| is_army_points(c));
        let has_measurement = cells.iter().any(|c| is_measurement(c));
        let word_cells = cells
            .iter()
            .filter(|c| !is_measurement(c) && !is_number(c))
            .count();
        has_points && has_measurement && word_cells <= 1
    }

    /// Column names from a header line, if its recognized labels account for
    /// `expected` cells. A missing leading label is taken as the side column.
    pub fn header_columns(&self, line: &str, expected: usize) -> Option<Vec<String>> {
        let labels: Vec<&str> = HEADER_LABEL.find_iter(line).map(|m| m.as_str()).collect();
        if labels.len() < 2 {
            return None;
        }
        let covered: usize = labels.iter().map(|l| visible_len(l)).sum();
        let line_visible = visible_len(line);
        if line_visible == 0
            || (covered as f32) / (line_visible as f32) < self.config.min_header_coverage
        {
            return None;
        }

        let mut columns: Vec<String> = labels.iter().map(|l| to_key(l)).collect();
        if columns.len() + 1 == expected && !columns.iter().any(|c| c.starts_with("side")) {
            columns.insert(0, "side".to_string());
        }
        if columns.len() != expected {
            log::debug!(
                "TableDetector: header '{}' has {} labels, row has {} cells",
                line,
                columns.len(),
                expected
            );
            return None;
        }
        Some(dedup_columns(columns))
    }

    /// Infer column names from the cells of the first row.
    pub fn infer_columns(cells: &[String]) -> Vec<String> {
        let last_measurement = cells.iter().rposition(|c| is_measurement(c));
        let mut seen_points = false;
        let mut seen_side = false;

        let columns = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if is_measurement(cell) {
                    if Some(i) == last_measurement {
                        "zone".to_string()
                    } else {
                        "table_size".to_string()
                    }
                } else if is_army_points(cell) && !seen_points {
                    seen_points = true;
                    "points".to_string()
                } else if is_number(cell) && seen_points {
                    "swc".to_string()
                } else if !is_number(cell) && !seen_side {
                    seen_side = true;
                    "side".to_string()
                } else {
                    format!("column_{}", i + 1)
                }
            })
            .collect();

        dedup_columns(columns)
    }

    /// Zip column names with cells.
    pub fn build_row(columns: &[String], cells: &[String]) -> Row {
        columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| (column.clone(), Cell::parse(cell)))
            .collect()
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_number(cell: &str) -> bool {
    !cell.is_empty() && cell.bytes().all(|b| b.is_ascii_digit())
}

fn is_army_points(cell: &str) -> bool {
    is_number(cell) && (3..=4).contains(&cell.len())
}

fn is_measurement(cell: &str) -> bool {
    MEASUREMENT.is_match(cell)
}

fn dedup_columns(columns: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        let mut name = column.clone();
        let mut n = 2;
        while result.contains(&name) {
            name = format!("{}_{}", column, n);
            n += 1;
        }
        result.push(name);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_row_forms() {
        let detector = TableDetector::new();
        assert_eq!(
            detector.point_row("Dominate the Zone ........ 3 OP"),
            Some(("Dominate the Zone".to_string(), 3))
        );
        assert_eq!(
            detector.point_row("Kill the Lieutenant: 2 Objective Points"),
            Some(("Kill the Lieutenant".to_string(), 2))
        );
        assert_eq!(
            detector.point_row("Acquire the Console - 1"),
            Some(("Acquire the Console".to_string(), 1))
        );
        assert!(detector.point_row("^ Kill more Lieutenants than the adversary").is_none());
        assert!(detector
            .point_row("Have more Supply Boxes than the adversary at the end (3 Objective Points).")
            .is_none());
    }

    #[test]
    fn test_single_point_line_is_not_a_run() {
        let detector = TableDetector::new();
        let lines = vec!["Some prose.", "Dominate the Zone 3", "More prose here."];
        assert!(detector.detect_point_runs(&lines).is_empty());
    }

    #[test]
    fn test_custom_min_rows() {
        let detector = TableDetector::with_config(TableDetectorConfig {
            min_rows: 1,
            ..Default::default()
        });
        let lines = vec!["Some prose.", "Dominate the Zone 3", "More prose here."];
        let runs = detector.detect_point_runs(&lines);
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (1, 2));
    }

    #[test]
    fn test_point_run() {
        let detector = TableDetector::new();
        let lines = vec![
            "Objective points:",
            "Dominate the Zone ... 3",
            "Kill the Lieutenant ... 2",
            "Have the Console ... 1",
            "Each player has 2 Classified Objectives.",
        ];
        let runs = detector.detect_point_runs(&lines);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start, 1);
        assert_eq!(runs[0].end, 4);
        let rows = runs[0].to_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["points"], Cell::Number(2));
    }

    #[test]
    fn test_split_cells() {
        let cells = TableDetector::split_cells("A and B 300 6 48 in x 48 in Radius of 8 in");
        assert_eq!(cells, vec!["A and B", "300", "6", "48 in x 48 in", "Radius of 8 in"]);
    }

    #[test]
    fn test_deployment_row() {
        let row = TableDetector::split_cells("A 300 24 in x 12 in");
        assert!(TableDetector::is_deployment_row(&row));

        let prose = TableDetector::split_cells("Deploy within 300 metres of the table 12 in from edge");
        assert!(!TableDetector::is_deployment_row(&prose));
    }

    #[test]
    fn test_infer_columns() {
        let cells = TableDetector::split_cells("A and B 300 6 48 in x 48 in 24 in x 12 in");
        assert_eq!(
            TableDetector::infer_columns(&cells),
            vec!["side", "points", "swc", "table_size", "zone"]
        );

        let cells = TableDetector::split_cells("A 300 24 in x 12 in");
        assert_eq!(
            TableDetector::infer_columns(&cells),
            vec!["side", "points", "zone"]
        );
    }

    #[test]
    fn test_header_columns() {
        let detector = TableDetector::new();
        let header = "Army Points SWC Game Table Size Deployment Zone";
        assert_eq!(
            detector.header_columns(header, 5),
            Some(vec![
                "side".to_string(),
                "army_points".to_string(),
                "swc".to_string(),
                "game_table_size".to_string(),
                "deployment_zone".to_string(),
            ])
        );
        assert!(detector.header_columns(header, 3).is_none());
        assert!(detector
            .header_columns("Players choose sides and points before deploying", 2)
            .is_none());
    }

    #[test]
    fn test_build_row_keeps_numbers() {
        let columns = vec!["side".to_string(), "points".to_string()];
        let cells = vec!["A and B".to_string(), "300".to_string()];
        let row = TableDetector::build_row(&columns, &cells);
        assert_eq!(row["points"], Cell::Number(300));
        assert_eq!(row["side"], Cell::Text("A and B".into()));
    }
}
