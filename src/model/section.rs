//! Canonical mission section keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized section of a mission's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    /// "TACTICAL SUPPORT OPTIONS"
    TacticalSupport,
    /// "SUITABLE FOR REINFORCEMENTS"
    Reinforcements,
    /// "MISSION OBJECTIVES"
    Objectives,
    /// "FORCES AND DEPLOYMENT"
    Deployment,
    /// "SCENARIO SPECIAL RULES"
    SpecialRules,
    /// "END OF THE MISSION"
    EndOfMission,
}

impl SectionKey {
    /// Sections every complete mission is expected to carry.
    pub const EXPECTED: [SectionKey; 5] = [
        SectionKey::TacticalSupport,
        SectionKey::Objectives,
        SectionKey::Deployment,
        SectionKey::SpecialRules,
        SectionKey::EndOfMission,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::TacticalSupport => "tactical_support",
            SectionKey::Reinforcements => "reinforcements",
            SectionKey::Objectives => "objectives",
            SectionKey::Deployment => "deployment",
            SectionKey::SpecialRules => "special_rules",
            SectionKey::EndOfMission => "end_of_mission",
        }
    }

    /// Heading as printed in the rulebook.
    pub fn heading(&self) -> &'static str {
        match self {
            SectionKey::TacticalSupport => "TACTICAL SUPPORT OPTIONS",
            SectionKey::Reinforcements => "SUITABLE FOR REINFORCEMENTS",
            SectionKey::Objectives => "MISSION OBJECTIVES",
            SectionKey::Deployment => "FORCES AND DEPLOYMENT",
            SectionKey::SpecialRules => "SCENARIO SPECIAL RULES",
            SectionKey::EndOfMission => "END OF THE MISSION",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
