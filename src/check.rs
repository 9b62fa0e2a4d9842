//! Structure check for previously written output.
//!
//! Reads mission JSON back and verifies every mission carries the expected
//! keys, then summarizes the shape each section took per mission type. The
//! summary makes format drift between yearly documents visible at a glance.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

/// Keys every mission object must have.
pub const EXPECTED_MISSION_KEYS: [&str; 8] = [
    "name",
    "type",
    "tactical_support_options",
    "suitable_for_reinforcements",
    "mission_objectives",
    "forces_and_deployment",
    "scenario_special_rules",
    "end_of_mission",
];

/// Sections whose shape is summarized.
pub const REQUIRED_SECTIONS: [&str; 4] = [
    "mission_objectives",
    "forces_and_deployment",
    "scenario_special_rules",
    "end_of_mission",
];

/// Shape of one JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Null,
    Bool,
    Number,
    String { chars: usize },
    List { len: usize, item: Option<&'static str> },
    Dict { keys: Vec<String> },
}

impl Shape {
    /// Describe a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Bool,
            Value::Number(_) => Shape::Number,
            Value::String(s) => Shape::String {
                chars: s.chars().count(),
            },
            Value::Array(items) => Shape::List {
                len: items.len(),
                item: items.first().map(|first| Shape::of(first).kind()),
            },
            Value::Object(map) => Shape::Dict {
                keys: map.keys().cloned().collect(),
            },
        }
    }

    /// Coarse kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Number => "number",
            Shape::String { .. } => "string",
            Shape::List { .. } => "list",
            Shape::Dict { .. } => "dict",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::String { chars } => write!(f, "string ({} chars)", chars),
            Shape::List { item: None, .. } => write!(f, "empty list"),
            Shape::List {
                len,
                item: Some(item),
            } => write!(f, "list of {} {}(s)", len, item),
            Shape::Dict { keys } if keys.is_empty() => write!(f, "empty dict"),
            Shape::Dict { keys } => write!(f, "dict with {} keys: {}", keys.len(), keys.join(", ")),
            other => f.write_str(other.kind()),
        }
    }
}

/// A mission that failed the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionFailure {
    /// Mission name, or "UNKNOWN"
    pub mission: String,
    /// Expected keys that were absent
    pub missing_keys: Vec<String>,
}

/// Missions grouped by mission type, then section, then shape kind.
pub type ShapeSummary = BTreeMap<String, BTreeMap<String, BTreeMap<&'static str, Vec<String>>>>;

/// Outcome of a structure check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    /// Number of missions inspected
    pub mission_count: usize,
    /// Missions lacking expected keys
    pub failures: Vec<MissionFailure>,
    /// Section shapes per mission type
    pub shapes: ShapeSummary,
}

impl StructureReport {
    /// True when there was at least one mission and none failed.
    pub fn passed(&self) -> bool {
        self.mission_count > 0 && self.failures.is_empty()
    }

    /// Sections that took more than one shape within a mission type.
    pub fn inconsistent_sections(&self) -> Vec<(&str, &str)> {
        self.shapes
            .iter()
            .flat_map(|(mission_type, sections)| {
                sections
                    .iter()
                    .filter(|(_, kinds)| kinds.len() > 1)
                    .map(move |(section, _)| (mission_type.as_str(), section.as_str()))
            })
            .collect()
    }
}

/// Check a parsed output value.
pub fn check_value(value: &Value) -> StructureReport {
    let mut report = StructureReport::default();
    let missions = match value.get("missions").and_then(Value::as_array) {
        Some(missions) => missions,
        None => {
            log::debug!("no missions array in checked document");
            return report;
        }
    };
    report.mission_count = missions.len();

    for mission in missions {
        let name = mission
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        let mission_type = mission
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();

        let missing_keys: Vec<String> = EXPECTED_MISSION_KEYS
            .iter()
            .filter(|key| mission.get(*key).is_none())
            .map(|key| key.to_string())
            .collect();

        for section in REQUIRED_SECTIONS {
            if let Some(data) = mission.get(section) {
                report
                    .shapes
                    .entry(mission_type.clone())
                    .or_default()
                    .entry(section.to_string())
                    .or_default()
                    .entry(Shape::of(data).kind())
                    .or_default()
                    .push(name.clone());
            }
        }

        if !missing_keys.is_empty() {
            log::debug!("mission '{}' lacks {:?}", name, missing_keys);
            report.failures.push(MissionFailure {
                mission: name,
                missing_keys,
            });
        }
    }

    report
}

/// Check output JSON text.
pub fn check_json(json: &str) -> Result<StructureReport> {
    let value: Value = serde_json::from_str(json)?;
    Ok(check_value(&value))
}

/// Check an output JSON file.
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<StructureReport> {
    check_json(&fs::read_to_string(path)?)
}
