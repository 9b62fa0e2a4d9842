//! Warnings and completeness reporting.
//!
//! Parsing stages never fail on content. They return a [`Parsed`] value that
//! carries whatever was recovered plus the irregularities met on the way; the
//! document assembler folds those into an [`ExtractionReport`].

use super::{MissionType, SectionKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal irregularity found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An expected section heading was not found
    MissingSection { section: SectionKey },

    /// A scalar or sub-field could not be extracted
    MissingField { field: String },

    /// A line matched headings of different sections
    AmbiguousHeading {
        line: String,
        chosen: SectionKey,
        rejected: SectionKey,
    },

    /// A section heading appeared again after its span was opened
    DuplicateHeading { section: SectionKey, line: String },

    /// Two special rules share a key; the later one was kept
    DuplicateRule { key: String },

    /// A rule heading had no body
    EmptyRule { name: String },

    /// A table row did not match the table's column count
    MalformedTableRow {
        table: String,
        expected: usize,
        found: usize,
        row: String,
    },

    /// The table of contents listed a mission name twice
    DuplicateMission { name: String, renamed: String },

    /// The mission's pages could not be read at all
    UnreadableMission { reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingSection { section } => {
                write!(f, "section '{}' not found", section.heading())
            }
            Warning::MissingField { field } => write!(f, "field '{}' not found", field),
            Warning::AmbiguousHeading {
                line,
                chosen,
                rejected,
            } => write!(
                f,
                "heading '{}' matched {} and {}; using {}",
                line, chosen, rejected, chosen
            ),
            Warning::DuplicateHeading { section, line } => {
                write!(f, "repeated {} heading '{}' kept as text", section, line)
            }
            Warning::DuplicateRule { key } => {
                write!(f, "special rule '{}' defined twice; later definition kept", key)
            }
            Warning::EmptyRule { name } => write!(f, "special rule '{}' has no text", name),
            Warning::MalformedTableRow {
                table,
                expected,
                found,
                row,
            } => write!(
                f,
                "{} row has {} columns, expected {}; kept as note: '{}'",
                table, found, expected, row
            ),
            Warning::DuplicateMission { name, renamed } => {
                write!(f, "mission '{}' listed twice; renamed to '{}'", name, renamed)
            }
            Warning::UnreadableMission { reason } => {
                write!(f, "mission text could not be read: {}", reason)
            }
        }
    }
}

/// A best-effort value plus the warnings recorded while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    /// The recovered value
    pub value: T,
    /// Irregularities, in the order they were met
    pub warnings: Vec<Warning>,
}

impl<T> Parsed<T> {
    /// Wrap a value with no warnings.
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: Warning) {
        log::debug!("warning: {}", warning);
        self.warnings.push(warning);
    }

    /// Take another stage's warnings and hand back its value.
    pub fn absorb<U>(&mut self, other: Parsed<U>) -> U {
        self.warnings.extend(other.warnings);
        other.value
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Split into value and warnings.
    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }

    /// Check if nothing was recorded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl<T: Default> Default for Parsed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Completeness record for one mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReport {
    /// Mission name
    pub mission: String,

    /// Mission category
    #[serde(rename = "type")]
    pub mission_type: MissionType,

    /// Expected sections that were not found
    pub absent_sections: Vec<SectionKey>,

    /// Warnings recorded for this mission
    pub warnings: Vec<Warning>,
}

impl MissionReport {
    /// Create an empty report.
    pub fn new(mission: impl Into<String>, mission_type: MissionType) -> Self {
        Self {
            mission: mission.into(),
            mission_type,
            absent_sections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when every expected section was found.
    pub fn is_complete(&self) -> bool {
        self.absent_sections.is_empty()
    }
}

/// Aggregated completeness report for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Per-mission records, in document order
    pub missions: Vec<MissionReport>,

    /// Warnings not tied to a single mission
    pub document_warnings: Vec<Warning>,
}

impl ExtractionReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one mission's record in.
    pub fn push(mut self, report: MissionReport) -> Self {
        self.missions.push(report);
        self
    }

    /// Total warnings across the run.
    pub fn warning_count(&self) -> usize {
        self.document_warnings.len()
            + self.missions.iter().map(|m| m.warnings.len()).sum::<usize>()
    }

    /// Missions with at least one absent section.
    pub fn incomplete_missions(&self) -> Vec<&MissionReport> {
        self.missions.iter().filter(|m| !m.is_complete()).collect()
    }

    /// How many missions lack the given section.
    pub fn absent_count(&self, section: SectionKey) -> usize {
        self.missions
            .iter()
            .filter(|m| m.absent_sections.contains(&section))
            .count()
    }

    /// True when no mission is incomplete and nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0 && self.incomplete_missions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_map_keeps_warnings() {
        let mut parsed = Parsed::new("3");
        parsed.warn(Warning::DuplicateRule { key: "a".into() });

        let mapped = parsed.map(|s| s.len());
        assert_eq!(mapped.value, 1);
        assert_eq!(mapped.warnings.len(), 1);
    }

    #[test]
    fn test_parsed_absorb() {
        let mut outer = Parsed::new(());
        let mut inner = Parsed::new(3);
        inner.warn(Warning::DuplicateRule { key: "a".into() });

        let value = outer.absorb(inner);
        assert_eq!(value, 3);
        assert_eq!(outer.warnings.len(), 1);
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::MissingSection {
            section: SectionKey::EndOfMission,
        };
        assert_eq!(w.to_string(), "section 'END OF THE MISSION' not found");
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let w = Warning::DuplicateRule {
            key: "console".into(),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"kind":"duplicate_rule","key":"console"}"#);
    }

    #[test]
    fn test_report_fold() {
        let mut first = MissionReport::new("A", MissionType::ItsScenario);
        first.absent_sections.push(SectionKey::EndOfMission);
        first.warnings.push(Warning::MissingSection {
            section: SectionKey::EndOfMission,
        });
        let second = MissionReport::new("B", MissionType::DirectAction);

        let report = ExtractionReport::new().push(first).push(second);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.incomplete_missions().len(), 1);
        assert_eq!(report.absent_count(SectionKey::EndOfMission), 1);
        assert_eq!(report.absent_count(SectionKey::Objectives), 0);
        assert!(!report.is_clean());
    }
}
