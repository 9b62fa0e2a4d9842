//! Mission-level types.

use super::{RuleEntry, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mission category, taken from the table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionType {
    /// Listed under "ITS SCENARIOS"
    #[serde(rename = "ITS Scenario")]
    ItsScenario,
    /// Listed under "ITS DIRECT ACTION"
    #[serde(rename = "Direct Action")]
    DirectAction,
}

impl MissionType {
    /// Display label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionType::ItsScenario => "ITS Scenario",
            MissionType::DirectAction => "Direct Action",
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main and secondary objectives, in the order they are printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSet {
    /// Main objectives
    #[serde(default)]
    pub main_objectives: Vec<String>,

    /// Secondary (classified) objectives
    #[serde(default)]
    pub secondary_objectives: Vec<String>,
}

impl ObjectiveSet {
    /// Check if no objective was extracted.
    pub fn is_empty(&self) -> bool {
        self.main_objectives.is_empty() && self.secondary_objectives.is_empty()
    }

    /// Total number of objectives.
    pub fn len(&self) -> usize {
        self.main_objectives.len() + self.secondary_objectives.len()
    }
}

/// Forces and deployment block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    /// Sides declaration, e.g. "SIDE A and SIDE B"
    #[serde(default)]
    pub sides: String,

    /// Army points / zone configurations
    #[serde(default)]
    pub deployment_table: Table,

    /// Free-text deployment notes
    #[serde(default)]
    pub special_notes: Vec<String>,
}

/// One scenario or direct action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Mission name as listed in the table of contents
    pub name: String,

    /// Mission category
    #[serde(rename = "type")]
    pub mission_type: MissionType,

    /// Number of tactical support options
    #[serde(default)]
    pub tactical_support_options: u32,

    /// Whether reinforcements may be used
    #[serde(default)]
    pub suitable_for_reinforcements: bool,

    /// Objectives block
    #[serde(default)]
    pub mission_objectives: ObjectiveSet,

    /// Deployment block
    #[serde(default)]
    pub forces_and_deployment: DeploymentInfo,

    /// Special rules keyed by snake_case rule name
    #[serde(default)]
    pub scenario_special_rules: IndexMap<String, RuleEntry>,

    /// End-of-mission conditions
    #[serde(default)]
    pub end_of_mission: String,

    /// Additional tables lifted out of prose
    #[serde(default)]
    pub tables: IndexMap<String, Table>,
}

impl Mission {
    /// Create a mission with every field defaulted.
    pub fn new(name: impl Into<String>, mission_type: MissionType) -> Self {
        Self {
            name: name.into(),
            mission_type,
            tactical_support_options: 0,
            suitable_for_reinforcements: false,
            mission_objectives: ObjectiveSet::default(),
            forces_and_deployment: DeploymentInfo::default(),
            scenario_special_rules: IndexMap::new(),
            end_of_mission: String::new(),
            tables: IndexMap::new(),
        }
    }

    /// Get a special rule by key.
    pub fn rule(&self, key: &str) -> Option<&RuleEntry> {
        self.scenario_special_rules.get(key)
    }

    /// Number of special rules that are skills.
    pub fn skill_count(&self) -> usize {
        self.scenario_special_rules
            .values()
            .filter(|r| r.is_skill())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_new_is_fully_defaulted() {
        let mission = Mission::new("SUPPLIES", MissionType::ItsScenario);
        assert_eq!(mission.tactical_support_options, 0);
        assert!(mission.mission_objectives.is_empty());
        assert!(mission.forces_and_deployment.deployment_table.is_empty());
        assert!(mission.scenario_special_rules.is_empty());
        assert_eq!(mission.end_of_mission, "");

        let json = serde_json::to_string(&mission).unwrap();
        assert!(!json.contains("null"));
        assert!(json.contains(r#""type":"ITS Scenario""#));
    }

    #[test]
    fn test_mission_type_serialization() {
        let json = serde_json::to_string(&MissionType::DirectAction).unwrap();
        assert_eq!(json, "\"Direct Action\"");
        let parsed: MissionType = serde_json::from_str("\"ITS Scenario\"").unwrap();
        assert_eq!(parsed, MissionType::ItsScenario);
    }

    #[test]
    fn test_field_order_is_stable() {
        let json = serde_json::to_string(&Mission::new("X", MissionType::DirectAction)).unwrap();
        let name = json.find("\"name\"").unwrap();
        let rules = json.find("\"scenario_special_rules\"").unwrap();
        let end = json.find("\"end_of_mission\"").unwrap();
        assert!(name < rules && rules < end);
    }
}
