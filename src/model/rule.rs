//! Scenario special rule entries.

use serde::{Deserialize, Serialize};

/// A special rule: either plain prose or a structured skill.
///
/// Serialized untagged, so a plain rule is a JSON string and a skill is an
/// object with `name`, `skill_type`, `requirements` and `effects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    /// Rule text kept verbatim
    Plain(String),
    /// Rule with labelled sub-fields
    Skill(SkillRule),
}

impl RuleEntry {
    /// Check if this entry is a skill.
    pub fn is_skill(&self) -> bool {
        matches!(self, RuleEntry::Skill(_))
    }

    /// Get the skill record, if any.
    pub fn as_skill(&self) -> Option<&SkillRule> {
        match self {
            RuleEntry::Skill(skill) => Some(skill),
            RuleEntry::Plain(_) => None,
        }
    }

    /// Get the plain text, if any.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            RuleEntry::Plain(text) => Some(text),
            RuleEntry::Skill(_) => None,
        }
    }
}

/// A skill definition (e.g. "Short Skill" with requirements and effects).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRule {
    /// Rule title as printed
    pub name: String,

    /// Skill type and labels, e.g. "short skill, Attack, No LoF"
    #[serde(default)]
    pub skill_type: String,

    /// Requirements text
    #[serde(default)]
    pub requirements: String,

    /// Effects text
    #[serde(default)]
    pub effects: String,

    /// Cancelation conditions (omitted when the skill has none)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cancelation: String,
}

impl SkillRule {
    /// Create an empty skill with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
