//! Objective block parsing.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::table_detector::TableDetector;
use super::text::{collapse_whitespace, is_caps_line, marker_len, split_sentences, strip_marker};
use crate::model::{ObjectiveSet, Parsed, Table};

lazy_static! {
    static ref SUB_HEADING: Regex = Regex::new(
        r"(?i)^\s*(?P<sub>main|secondary|classified)\s+objectives?\b\s*:?\s*(?P<rest>.*)$"
    )
    .unwrap();
}

/// Objectives plus any point tables lifted out of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveBlock {
    /// Main and secondary objective entries
    pub objectives: ObjectiveSet,
    /// Point tables keyed `<sub-section>_points`
    pub tables: IndexMap<String, Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Main,
    Secondary,
}

struct SubSpan<'a> {
    target: Target,
    name: String,
    lines: Vec<&'a str>,
}

/// Parses the body of a MISSION OBJECTIVES span.
pub struct ObjectiveParser {
    max_entry_chars: usize,
    detector: TableDetector,
}

impl ObjectiveParser {
    /// Create a parser with the given maximum entry length.
    pub fn new(max_entry_chars: usize) -> Self {
        Self {
            max_entry_chars,
            detector: TableDetector::new(),
        }
    }

    /// Parse an objectives span body.
    pub fn parse(&self, body: &str) -> Parsed<ObjectiveBlock> {
        let mut block = ObjectiveBlock::default();

        for sub in split_sub_spans(body) {
            let prose = self.lift_point_tables(&sub, &mut block.tables);
            let entries = if prose.iter().any(|l| marker_len(l).is_some()) {
                marker_entries(&prose)
            } else {
                self.paragraph_entries(&prose)
            };

            log::debug!("{} objectives: {} entries", sub.name, entries.len());
            match sub.target {
                Target::Main => block.objectives.main_objectives.extend(entries),
                Target::Secondary => block.objectives.secondary_objectives.extend(entries),
            }
        }

        Parsed::new(block)
    }

    /// Move point runs into `tables`, leaving blank lines in their place.
    fn lift_point_tables<'a>(
        &self,
        sub: &SubSpan<'a>,
        tables: &mut IndexMap<String, Table>,
    ) -> Vec<&'a str> {
        let mut lines = sub.lines.clone();

        for run in self.detector.detect_point_runs(&sub.lines) {
            let base = format!("{}_points", sub.name);
            let mut key = base.clone();
            let mut n = 2;
            while tables.contains_key(&key) {
                key = format!("{}_{}", base, n);
                n += 1;
            }

            log::debug!("lifting {} point rows into '{}'", run.rows.len(), key);
            tables.insert(key, run.to_rows().into_iter().collect());
            for line in lines.iter_mut().take(run.end).skip(run.start) {
                *line = "";
            }
        }

        lines
    }

    fn paragraph_entries(&self, lines: &[&str]) -> Vec<String> {
        let mut entries = Vec::new();
        for paragraph in lines.split(|l| l.trim().is_empty()) {
            if paragraph.is_empty() {
                continue;
            }
            let text = collapse_whitespace(&paragraph.join(" "));
            if text.chars().count() > self.max_entry_chars {
                entries.extend(pack_sentences(&text, self.max_entry_chars));
            } else {
                entries.push(text);
            }
        }
        entries.retain(|e| has_content(e));
        entries
    }
}

impl Default for ObjectiveParser {
    fn default() -> Self {
        Self::new(400)
    }
}

fn split_sub_spans(body: &str) -> Vec<SubSpan<'_>> {
    let mut spans = vec![SubSpan {
        target: Target::Main,
        name: "main".to_string(),
        lines: Vec::new(),
    }];

    for line in body.lines() {
        if let Some(caps) = SUB_HEADING.captures(line) {
            let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");
            if rest.is_empty() || is_caps_line(line) {
                let name = caps["sub"].to_lowercase();
                let target = if name == "main" {
                    Target::Main
                } else {
                    Target::Secondary
                };
                let mut lines = Vec::new();
                if !rest.is_empty() {
                    lines.push(rest);
                }
                spans.push(SubSpan {
                    target,
                    name,
                    lines,
                });
                continue;
            }
        }
        if let Some(current) = spans.last_mut() {
            current.lines.push(line);
        }
    }

    spans
}

/// One entry per marker line; unmarked lines continue the previous entry.
fn marker_entries(lines: &[&str]) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut current, &mut entries);
        } else if marker_len(trimmed).is_some() {
            flush(&mut current, &mut entries);
            current.push_str(strip_marker(trimmed));
        } else if is_caps_line(trimmed) {
            flush(&mut current, &mut entries);
            current.push_str(trimmed);
            flush(&mut current, &mut entries);
        } else {
            current.push(' ');
            current.push_str(trimmed);
        }
    }
    flush(&mut current, &mut entries);

    entries
}

fn flush(current: &mut String, entries: &mut Vec<String>) {
    let text = collapse_whitespace(current);
    if has_content(&text) {
        entries.push(text);
    }
    current.clear();
}

/// Split an over-long paragraph at sentence boundaries, packing sentences up
/// to `max` characters per entry.
fn pack_sentences(text: &str, max: usize) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if !current.is_empty() && current.chars().count() + 1 + sentence.chars().count() > max {
            entries.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
    }
    if !current.is_empty() {
        entries.push(current);
    }
    entries
}

fn has_content(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    fn parse(body: &str) -> ObjectiveBlock {
        ObjectiveParser::default().parse(body).value
    }

    #[test]
    fn test_main_and_secondary() {
        let body = "\nMAIN OBJECTIVES\n1. Kill more Lieutenants than the adversary.\n\
2. Dominate the Exclusion Zone at the end\nof each Game Round.\n3. Acquire the Console.\n\
CLASSIFIED OBJECTIVES\n• Retrieve the HVT.\n• Secure the Antenna.\n";
        let block = parse(body);
        assert_eq!(
            block.objectives.main_objectives,
            vec![
                "Kill more Lieutenants than the adversary.",
                "Dominate the Exclusion Zone at the end of each Game Round.",
                "Acquire the Console.",
            ]
        );
        assert_eq!(block.objectives.secondary_objectives.len(), 2);
        assert!(block.tables.is_empty());
    }

    #[test]
    fn test_text_before_subheading_is_main() {
        let block = parse("^ Kill the Lieutenant.\nSECONDARY OBJECTIVES\n^ Acquire the Console.");
        assert_eq!(block.objectives.main_objectives, vec!["Kill the Lieutenant."]);
        assert_eq!(block.objectives.secondary_objectives, vec!["Acquire the Console."]);
    }

    #[test]
    fn test_paragraph_entries() {
        let body = "Have more Supply Boxes than the adversary\nat the end of the battle.\n\nKill the enemy Lieutenant.";
        let block = parse(body);
        assert_eq!(
            block.objectives.main_objectives,
            vec![
                "Have more Supply Boxes than the adversary at the end of the battle.",
                "Kill the enemy Lieutenant.",
            ]
        );
    }

    #[test]
    fn test_long_paragraph_split_at_sentences() {
        let body = "Kill more troopers than the adversary. Dominate more quadrants. Hold the beacon.";
        let block = ObjectiveParser::new(45).parse(body).value;
        assert_eq!(
            block.objectives.main_objectives,
            vec![
                "Kill more troopers than the adversary.",
                "Dominate more quadrants. Hold the beacon.",
            ]
        );
    }

    #[test]
    fn test_point_table_lifted() {
        let body = "MAIN OBJECTIVES\n^ Score points as follows.\nDominate the Zone ..... 3\n\
Kill the Lieutenant ..... 2\nCLASSIFIED OBJECTIVES\n^ Each player has 1 Classified Objective.";
        let block = parse(body);
        assert_eq!(block.objectives.main_objectives, vec!["Score points as follows."]);
        let table = &block.tables["main_points"];
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0]["objective"], Cell::Text("Dominate the Zone".into()));
        assert_eq!(table.rows()[0]["points"], Cell::Number(3));
    }

    #[test]
    fn test_empty_body() {
        let block = parse("\n   \n");
        assert!(block.objectives.is_empty());
    }
}
