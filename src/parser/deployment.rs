//! Forces and deployment block parsing.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::table_detector::TableDetector;
use super::text::{collapse_whitespace, visible_len};
use crate::model::{DeploymentInfo, Parsed, Row, Table, Warning};

lazy_static! {
    static ref SIDE_LITERAL: Regex = Regex::new(r"(?i)\bSIDE\s+A\s+and\s+SIDE\s+B\b").unwrap();
    static ref SIDES_AB: Regex = Regex::new(r"(?i)\bSIDES?\s+A\s+and\s+B\b").unwrap();
    static ref NAMED_SIDES: Regex =
        Regex::new(r"\b[A-Z][A-Za-z]*\s+SIDE\s+(?i:and)\s+[A-Z][A-Za-z]*\s+SIDE\b").unwrap();
    static ref ROW_LABEL: Regex = Regex::new(r"(?i)\bA\s+and\s+B\b").unwrap();
    static ref STRICT_ROW: Regex = Regex::new(
        r"(?i)A\s+and\s+B\s+(\d{3,4})\s+(\d+)\s+(\d+\s+in\s+x\s+\d+\s+in)\s+((?:\d+\s+in\s+x\s+\d+\s+in)|(?:Radius\s+of\s+\d+\s+in))"
    )
    .unwrap();
}

const CANONICAL_SIDES: &str = "SIDE A and SIDE B";
const STRICT_COLUMNS: [&str; 5] = ["side", "points", "swc", "table_size", "zone"];

#[derive(Debug, Clone, Copy)]
enum SidePattern {
    Literal,
    Abbreviated,
    Named,
    RowLabel,
}

/// Line state while the block is taken apart.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Prose, still available for notes
    Free(String),
    /// Kept as a note on its own
    Standalone(String),
    /// Used by the sides declaration or the table
    Consumed,
}

/// Parses the body of a FORCES AND DEPLOYMENT span.
pub struct DeploymentParser {
    detector: TableDetector,
}

impl DeploymentParser {
    /// Create a new deployment parser.
    pub fn new() -> Self {
        Self {
            detector: TableDetector::new(),
        }
    }

    /// Parse a deployment span body.
    pub fn parse(&self, body: &str) -> Parsed<DeploymentInfo> {
        let mut parsed = Parsed::new(DeploymentInfo::default());
        let mut lines: Vec<Line> = body.lines().map(|l| Line::Free(l.to_string())).collect();

        let offsets = line_offsets(body);
        match detect_sides(body) {
            Some((sides, pattern, range)) => {
                parsed.value.sides = sides;
                if !matches!(pattern, SidePattern::RowLabel) {
                    consume_sides_line(&mut lines, &offsets, body, range);
                }
            }
            None => parsed.warn(Warning::MissingField {
                field: "sides".to_string(),
            }),
        }

        let table = self.line_rows(&mut lines, &mut parsed);
        let table = if table.is_empty() {
            strict_rows(body, &offsets, &mut lines)
        } else {
            table
        };
        log::debug!("deployment table: {} rows", table.row_count());

        parsed.value.deployment_table = table;
        parsed.value.special_notes = notes(&lines);
        parsed
    }

    fn line_rows(&self, lines: &mut [Line], parsed: &mut Parsed<DeploymentInfo>) -> Table {
        let mut table = Table::new();
        let mut columns: Vec<String> = Vec::new();

        for i in 0..lines.len() {
            let Line::Free(text) = &lines[i] else {
                continue;
            };
            let cells = TableDetector::split_cells(text);
            if !TableDetector::is_deployment_row(&cells) {
                continue;
            }

            if columns.is_empty() {
                let header = match i.checked_sub(1).map(|h| &lines[h]) {
                    Some(Line::Free(above)) if !above.trim().is_empty() => {
                        self.detector.header_columns(above, cells.len())
                    }
                    _ => None,
                };
                columns = match header {
                    Some(names) => {
                        lines[i - 1] = Line::Consumed;
                        names
                    }
                    None => TableDetector::infer_columns(&cells),
                };
                table.add_row(TableDetector::build_row(&columns, &cells));
                lines[i] = Line::Consumed;
            } else if columns.len() == cells.len() {
                table.add_row(TableDetector::build_row(&columns, &cells));
                lines[i] = Line::Consumed;
            } else {
                let row = text.trim().to_string();
                parsed.warn(Warning::MalformedTableRow {
                    table: "deployment_table".to_string(),
                    expected: columns.len(),
                    found: cells.len(),
                    row: row.clone(),
                });
                lines[i] = Line::Standalone(row);
            }
        }

        table
    }
}

impl Default for DeploymentParser {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_sides(body: &str) -> Option<(String, SidePattern, Range<usize>)> {
    let patterns: [(&Regex, SidePattern); 4] = [
        (&*SIDE_LITERAL, SidePattern::Literal),
        (&*SIDES_AB, SidePattern::Abbreviated),
        (&*NAMED_SIDES, SidePattern::Named),
        (&*ROW_LABEL, SidePattern::RowLabel),
    ];

    patterns.iter().find_map(|(regex, pattern)| {
        regex.find(body).map(|m| {
            let sides = match pattern {
                SidePattern::Literal | SidePattern::Named => collapse_whitespace(m.as_str()),
                SidePattern::Abbreviated | SidePattern::RowLabel => CANONICAL_SIDES.to_string(),
            };
            log::debug!("sides '{}' via {:?}", sides, pattern);
            (sides, *pattern, m.range())
        })
    })
}

/// Byte offset of the start of every line.
fn line_offsets(body: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        offsets.push(offset);
        offset += line.len();
    }
    offsets
}

fn line_index(offsets: &[usize], pos: usize) -> usize {
    match offsets.binary_search(&pos) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    }
}

/// Drop the line carrying the sides declaration when the declaration is
/// most of it.
fn consume_sides_line(lines: &mut [Line], offsets: &[usize], body: &str, range: Range<usize>) {
    let index = line_index(offsets, range.start);
    let Some(Line::Free(text)) = lines.get(index) else {
        return;
    };
    let line_visible = visible_len(text);
    let covered = visible_len(&body[range]);
    if line_visible > 0 && covered as f32 / line_visible as f32 >= 0.6 {
        lines[index] = Line::Consumed;
    }
}

/// Scan the whole block with the strict five-cell row pattern, cutting
/// matched text out of the remaining lines.
fn strict_rows(body: &str, offsets: &[usize], lines: &mut [Line]) -> Table {
    let mut table = Table::new();
    let mut cuts: Vec<(usize, usize)> = Vec::new();

    for caps in STRICT_ROW.captures_iter(body) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let cells: Vec<String> = std::iter::once("A and B".to_string())
            .chain((1..=4).map(|i| collapse_whitespace(&caps[i])))
            .collect();
        let columns: Vec<String> = STRICT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let row: Row = TableDetector::build_row(&columns, &cells);
        table.add_row(row);
        cuts.push((whole.start(), whole.end()));
    }

    if cuts.is_empty() {
        return table;
    }
    log::debug!("deployment rows found by strict pattern: {}", cuts.len());

    for (i, line) in lines.iter_mut().enumerate() {
        let Line::Free(_) = line else {
            continue;
        };
        let start = offsets[i];
        let end = offsets.get(i + 1).copied().unwrap_or(body.len());

        let mut residual = String::new();
        let mut pos = start;
        for &(cut_start, cut_end) in &cuts {
            if cut_end <= start || cut_start >= end {
                continue;
            }
            let from = cut_start.max(start);
            residual.push_str(&body[pos..from.max(pos)]);
            pos = cut_end.min(end).max(pos);
        }
        if pos == start {
            continue;
        }
        residual.push_str(&body[pos..end]);

        *line = if residual.trim().is_empty() {
            Line::Consumed
        } else {
            Line::Free(residual.trim_end_matches(['\n', '\r']).to_string())
        };
    }

    table
}

/// Group remaining lines into whitespace-collapsed notes.
fn notes(lines: &[Line]) -> Vec<String> {
    let mut notes = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut previous_closed = false;

    for line in lines {
        match line {
            Line::Consumed => push_note(&mut current, &mut notes),
            Line::Standalone(text) => {
                push_note(&mut current, &mut notes);
                current.push(text.as_str());
                push_note(&mut current, &mut notes);
            }
            Line::Free(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    push_note(&mut current, &mut notes);
                    continue;
                }
                if previous_closed && starts_paragraph(trimmed) {
                    push_note(&mut current, &mut notes);
                }
                current.push(trimmed);
                previous_closed = trimmed.ends_with(['.', ':', '!', '?']);
            }
        }
    }
    push_note(&mut current, &mut notes);

    notes
}

fn push_note(current: &mut Vec<&str>, notes: &mut Vec<String>) {
    let note = collapse_whitespace(&current.join(" "));
    if note.chars().any(|c| c.is_alphanumeric()) {
        notes.push(note);
    }
    current.clear();
}

fn starts_paragraph(line: &str) -> bool {
    line.chars()
        .next()
        .map(|c| c.is_uppercase() || c.is_ascii_digit() || c == '•')
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    fn parse(body: &str) -> Parsed<DeploymentInfo> {
        DeploymentParser::new().parse(body)
    }

    #[test]
    fn test_two_row_three_column_table() {
        let body = "\nSIDE A and SIDE B\nA 300 24 in x 12 in\nB 400 24 in x 12 in\n\
It is not allowed to deploy in base contact with the Console.";
        let parsed = parse(body);
        assert!(parsed.is_clean());

        let info = parsed.value;
        assert_eq!(info.sides, "SIDE A and SIDE B");
        let table = &info.deployment_table;
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns(), vec!["side", "points", "zone"]);
        assert!(table.has_consistent_columns());
        assert_eq!(table.rows()[1]["points"], Cell::Number(400));
        assert_eq!(
            info.special_notes,
            vec!["It is not allowed to deploy in base contact with the Console."]
        );
    }

    #[test]
    fn test_header_line_names_columns() {
        let body = "SIDE A and SIDE B\nArmy Points SWC Game Table Size Deployment Zone\n\
A and B 300 6 48 in x 48 in 48 in x 12 in\nA and B 400 8 48 in x 48 in 48 in x 12 in\n";
        let info = parse(body).value;
        assert_eq!(
            info.deployment_table.columns(),
            vec!["side", "army_points", "swc", "game_table_size", "deployment_zone"]
        );
        assert_eq!(
            info.deployment_table.rows()[0]["deployment_zone"],
            Cell::Text("48 in x 12 in".into())
        );
        assert!(info.special_notes.is_empty());
    }

    #[test]
    fn test_malformed_row_becomes_note() {
        let body = "SIDE A and SIDE B\nA and B 300 6 48 in x 48 in 48 in x 12 in\n\
A and B 400 48 in x 48 in\n";
        let parsed = parse(body);
        assert_eq!(parsed.value.deployment_table.row_count(), 1);
        assert_eq!(parsed.value.special_notes, vec!["A and B 400 48 in x 48 in"]);
        assert!(matches!(
            parsed.warnings[0],
            Warning::MalformedTableRow {
                expected: 5,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_strict_fallback_across_lines() {
        let body = "Table: A and B 300 6\n48 in x 48 in Radius of 8 in and more text.\n";
        let info = parse(body).value;
        assert_eq!(info.sides, "SIDE A and SIDE B");
        assert_eq!(info.deployment_table.row_count(), 1);
        let row = &info.deployment_table.rows()[0];
        assert_eq!(row["swc"], Cell::Number(6));
        assert_eq!(row["zone"], Cell::Text("Radius of 8 in".into()));
        assert_eq!(info.special_notes, vec!["Table: and more text."]);
    }

    #[test]
    fn test_named_sides() {
        let info = parse("ATTACKER SIDE and DEFENDER SIDE\nThe Defender deploys first.").value;
        assert_eq!(info.sides, "ATTACKER SIDE and DEFENDER SIDE");
        assert_eq!(info.special_notes, vec!["The Defender deploys first."]);
    }

    #[test]
    fn test_missing_sides_warns() {
        let parsed = parse("Deploy anywhere on the table.");
        assert_eq!(parsed.value.sides, "");
        assert_eq!(
            parsed.warnings,
            vec![Warning::MissingField {
                field: "sides".into()
            }]
        );
    }

    #[test]
    fn test_note_paragraphs() {
        let body = "SIDE A and SIDE B\nExclusion Zone. The Exclusion Zone is\n12 in deep.\n\
Players may not deploy there:\n• Troopers in Hidden Deployment.";
        let info = parse(body).value;
        assert_eq!(
            info.special_notes,
            vec![
                "Exclusion Zone. The Exclusion Zone is 12 in deep.",
                "Players may not deploy there:",
                "• Troopers in Hidden Deployment.",
            ]
        );
    }
}
