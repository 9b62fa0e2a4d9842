//! Document-level types.

use super::Mission;
use serde::{Deserialize, Serialize};

/// An extracted ruleset document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document name (e.g. "ITS Season 17")
    pub name: String,

    /// Document version (e.g. "v1.0.1")
    pub version: String,

    /// Missions in page order
    pub missions: Vec<Mission>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            missions: Vec::new(),
        }
    }

    /// Get the number of missions.
    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }

    /// Check if the document has any missions.
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// Add a mission at the end.
    pub fn add_mission(&mut self, mission: Mission) {
        self.missions.push(mission);
    }

    /// Find a mission by name.
    pub fn get_mission(&self, name: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.name == name)
    }

    /// Mission names in order.
    pub fn mission_names(&self) -> Vec<&str> {
        self.missions.iter().map(|m| m.name.as_str()).collect()
    }
}
