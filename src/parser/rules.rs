//! Scenario special rules parsing.
//!
//! The span is cut at rule-name lines (caps-styled, isolated). Each body is
//! then classified: two or more distinct field markers make a skill,
//! anything else stays plain text.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::heading::{HeadingMatcher, HeadingRule};
use super::text::{collapse_whitespace, is_caps_line, strip_marker, to_key};
use crate::model::{Parsed, RuleEntry, SkillRule, Warning};

lazy_static! {
    static ref ISOLATED_MARKER: Regex = Regex::new(
        r"(?i)^(?:•\s*)?(short\s+movement\s+skill|short\s+skill|long\s+skill|entire\s+order|requirements?|effects?|cancell?ations?)\s*[:.]?$"
    )
    .unwrap();
    static ref PREFIX_MARKER: Regex = Regex::new(
        r"(?i)^(?:•\s*)?(type|requirements?|effects?|cancell?ations?)\s*:\s*(.+)$"
    )
    .unwrap();
}

const SKILL_TYPES: [&str; 4] = ["short movement skill", "short skill", "long skill", "entire order"];

/// Key for prose printed before the first rule name.
pub const GENERAL_RULE_KEY: &str = "general";

/// Longest line that still merges into the previous rule name.
const MAX_NAME_CONTINUATION: usize = 50;

/// Lines after a skill type marker that are read as labels.
const MAX_LABEL_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    SkillType,
    Requirements,
    Effects,
    Cancelation,
}

struct Marker<'a> {
    field: Field,
    /// Skill type named by an isolated marker line
    label: Option<String>,
    /// Value printed after a `Label:` prefix
    rest: &'a str,
}

fn field_marker(line: &str) -> Option<Marker<'_>> {
    if let Some(caps) = ISOLATED_MARKER.captures(line) {
        let word = collapse_whitespace(&caps[1]).to_lowercase();
        let field = field_for(&word);
        let label = (field == Field::SkillType).then_some(word);
        return Some(Marker {
            field,
            label,
            rest: "",
        });
    }

    let caps = PREFIX_MARKER.captures(line)?;
    let word = caps[1].to_lowercase();
    let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    Some(Marker {
        field: field_for(&word),
        label: None,
        rest,
    })
}

fn field_for(word: &str) -> Field {
    if word.starts_with("requirement") {
        Field::Requirements
    } else if word.starts_with("effect") {
        Field::Effects
    } else if word.starts_with("cancel") {
        Field::Cancelation
    } else {
        Field::SkillType
    }
}

struct Candidate {
    name: String,
    heading_line: usize,
    body_start: usize,
}

struct FieldSegment<'a> {
    field: Option<Field>,
    label: Option<String>,
    lines: Vec<&'a str>,
}

/// Parses the body of a SCENARIO SPECIAL RULES span.
pub struct RuleParser {
    headings: HeadingMatcher,
}

impl RuleParser {
    /// Create a parser that ignores lines matching the given section headings.
    pub fn new(headings: &[HeadingRule]) -> Self {
        Self {
            headings: HeadingMatcher::new(headings),
        }
    }

    /// Parse a special rules span body into an ordered rule map.
    pub fn parse(&self, body: &str) -> Parsed<IndexMap<String, RuleEntry>> {
        let mut parsed = Parsed::new(IndexMap::new());
        let lines: Vec<&str> = body.lines().collect();
        let candidates = self.find_candidates(&lines);

        let intro_end = candidates.first().map(|c| c.heading_line).unwrap_or(lines.len());
        let intro = lines[..intro_end].join("\n");
        if !intro.trim().is_empty() {
            parsed
                .value
                .insert(GENERAL_RULE_KEY.to_string(), RuleEntry::Plain(intro.trim().to_string()));
        }

        for (i, candidate) in candidates.iter().enumerate() {
            let end = candidates
                .get(i + 1)
                .map(|next| next.heading_line)
                .unwrap_or(lines.len());
            let text = lines[candidate.body_start.min(end)..end].join("\n");

            if text.trim().is_empty() {
                parsed.warn(Warning::EmptyRule {
                    name: candidate.name.clone(),
                });
                continue;
            }

            let key = to_key(&candidate.name);
            let entry = self.classify(&candidate.name, &text);
            log::debug!(
                "rule '{}' -> {}",
                key,
                if entry.is_skill() { "skill" } else { "plain" }
            );

            if parsed.value.contains_key(&key) {
                parsed.warn(Warning::DuplicateRule { key: key.clone() });
            }
            parsed.value.insert(key, entry);
        }

        parsed
    }

    /// Classify one rule body as a skill or plain text.
    ///
    /// Unlabelled text before the first skill field becomes the effects when
    /// the body has no EFFECTS field, and is prepended to them otherwise.
    pub fn classify(&self, name: &str, body: &str) -> RuleEntry {
        let segments = split_fields(body);

        let mut fields: Vec<Field> = segments.iter().filter_map(|s| s.field).collect();
        fields.sort_by_key(|f| *f as u8);
        fields.dedup();
        if fields.len() < 2 {
            return RuleEntry::Plain(body.trim().to_string());
        }

        let mut skill = SkillRule::new(name.trim());
        let mut lead = String::new();

        for segment in segments {
            match segment.field {
                None => lead = field_value(&segment.lines),
                Some(Field::SkillType) => {
                    let value = skill_type(segment.label, &segment.lines);
                    append(&mut skill.skill_type, &value, ", ");
                }
                Some(Field::Requirements) => {
                    append(&mut skill.requirements, &field_value(&segment.lines), " ")
                }
                Some(Field::Effects) => append(&mut skill.effects, &field_value(&segment.lines), " "),
                Some(Field::Cancelation) => {
                    append(&mut skill.cancelation, &field_value(&segment.lines), " ")
                }
            }
        }

        if !lead.is_empty() {
            skill.effects = if skill.effects.is_empty() {
                lead
            } else {
                format!("{} {}", lead, skill.effects)
            };
        }

        RuleEntry::Skill(skill)
    }

    fn find_candidates(&self, lines: &[&str]) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut labels_left = 0;
        let mut previous_was_name = false;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                labels_left = 0;
                previous_was_name = false;
                continue;
            }
            if let Some(marker) = field_marker(trimmed) {
                labels_left = if marker.label.is_some() { MAX_LABEL_LINES } else { 0 };
                previous_was_name = false;
                continue;
            }
            if labels_left > 0 {
                labels_left -= 1;
                previous_was_name = false;
                continue;
            }
            if !self.is_rule_name(trimmed) {
                previous_was_name = false;
                continue;
            }

            let name = strip_marker(trimmed).trim();
            match candidates.last_mut() {
                Some(last)
                    if previous_was_name && name.chars().count() < MAX_NAME_CONTINUATION =>
                {
                    last.name.push(' ');
                    last.name.push_str(name);
                    last.body_start = i + 1;
                }
                _ => candidates.push(Candidate {
                    name: name.to_string(),
                    heading_line: i,
                    body_start: i + 1,
                }),
            }
            previous_was_name = true;
        }

        log::debug!("found {} rule headings", candidates.len());
        candidates
    }

    fn is_rule_name(&self, line: &str) -> bool {
        let name = strip_marker(line).trim();
        name.chars().count() >= 3
            && name.chars().next().map(char::is_alphabetic).unwrap_or(false)
            && is_caps_line(name)
            && name.split_whitespace().count() <= 10
            && self.headings.match_line(line).is_none()
    }
}

fn split_fields(body: &str) -> Vec<FieldSegment<'_>> {
    let mut segments = vec![FieldSegment {
        field: None,
        label: None,
        lines: Vec::new(),
    }];

    for line in body.lines() {
        match field_marker(line.trim()) {
            Some(marker) => {
                let mut lines = Vec::new();
                if !marker.rest.is_empty() {
                    lines.push(marker.rest);
                }
                segments.push(FieldSegment {
                    field: Some(marker.field),
                    label: marker.label,
                    lines,
                });
            }
            None => {
                if let Some(current) = segments.last_mut() {
                    current.lines.push(line);
                }
            }
        }
    }

    segments
}

/// Join field lines, keep bullets as ` • ` separators, collapse whitespace.
fn field_value(lines: &[&str]) -> String {
    let joined = lines.join(" ").replace(['►', '•'], " • ");
    collapse_whitespace(&joined)
}

/// Build `"short skill, Attack, No LoF"` from a marker and its label lines.
fn skill_type(label: Option<String>, lines: &[&str]) -> String {
    let joined = lines.join(" ");
    let mut items: Vec<String> = joined
        .split([',', '.', '•', '►'])
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect();

    match label {
        Some(label) => items.insert(0, label),
        None => {
            if let Some(first) = items.first_mut() {
                let lower = first.to_lowercase();
                if SKILL_TYPES.contains(&lower.as_str()) {
                    *first = lower;
                }
            }
        }
    }
    items.join(", ")
}

fn append(target: &mut String, value: &str, separator: &str) {
    if value.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str(separator);
    }
    target.push_str(value);
}
