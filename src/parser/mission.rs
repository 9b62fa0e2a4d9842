//! Mission assembly: segmentation plus the block parsers.

use super::deployment::DeploymentParser;
use super::objectives::ObjectiveParser;
use super::options::ParseOptions;
use super::rules::RuleParser;
use super::scalars;
use super::segmenter::Segmenter;
use crate::model::{Mission, MissionReport, MissionType, Parsed, SectionKey, Warning};

/// One mission's text, already isolated by page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionInput {
    /// Mission name from the table of contents
    pub name: String,
    /// Category from the table of contents
    pub mission_type: MissionType,
    /// Normalized mission text
    pub text: String,
}

impl MissionInput {
    /// Create a new mission input.
    pub fn new(name: impl Into<String>, mission_type: MissionType, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mission_type,
            text: text.into(),
        }
    }
}

/// A parsed mission with its completeness record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionOutcome {
    /// The assembled mission, fully defaulted where sections were absent
    pub mission: Mission,
    /// Absent sections and warnings
    pub report: MissionReport,
    /// Pre-segmentation text, when capture was requested
    pub raw_text: Option<String>,
}

impl MissionOutcome {
    /// Outcome for a mission whose text could not be obtained.
    pub fn unreadable(name: impl Into<String>, mission_type: MissionType, reason: impl Into<String>) -> Self {
        let name = name.into();
        let mut report = MissionReport::new(name.clone(), mission_type);
        report.absent_sections = SectionKey::EXPECTED.to_vec();
        report.warnings.push(Warning::UnreadableMission {
            reason: reason.into(),
        });
        Self {
            mission: Mission::new(name, mission_type),
            report,
            raw_text: None,
        }
    }
}

/// Turns one mission's text into a [`Mission`].
///
/// Never fails: absent sections yield defaults and are listed in the report.
pub struct MissionParser {
    segmenter: Segmenter,
    objectives: ObjectiveParser,
    deployment: DeploymentParser,
    rules: RuleParser,
    capture_raw_text: bool,
}

impl MissionParser {
    /// Create a parser from parse options.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            segmenter: Segmenter::new(&options.section_headings),
            objectives: ObjectiveParser::new(options.max_entry_chars),
            deployment: DeploymentParser::new(),
            rules: RuleParser::new(&options.section_headings),
            capture_raw_text: options.capture_raw_text,
        }
    }

    /// Parse a mission and build its completeness record.
    pub fn parse(&self, input: &MissionInput) -> MissionOutcome {
        let parsed = self.parse_text(&input.name, input.mission_type, &input.text);
        let (mission, warnings) = parsed.into_parts();

        let mut report = MissionReport::new(mission.name.clone(), mission.mission_type);
        report.absent_sections = warnings
            .iter()
            .filter_map(|w| match w {
                Warning::MissingSection { section } => Some(*section),
                _ => None,
            })
            .collect();
        report.warnings = warnings;

        log::debug!(
            "mission '{}': {} objectives, {} rules, {} warnings",
            mission.name,
            mission.mission_objectives.len(),
            mission.scenario_special_rules.len(),
            report.warnings.len()
        );

        MissionOutcome {
            mission,
            report,
            raw_text: self.capture_raw_text.then(|| input.text.clone()),
        }
    }

    /// Parse mission text into a mission plus warnings.
    pub fn parse_text(&self, name: &str, mission_type: MissionType, text: &str) -> Parsed<Mission> {
        let mut parsed = Parsed::new(Mission::new(name, mission_type));
        let segments = parsed.absorb(self.segmenter.segment(text));

        let tactical = scalars::tactical_support(segments.body(SectionKey::TacticalSupport), text);
        for key in SectionKey::EXPECTED {
            let present = match key {
                SectionKey::TacticalSupport => segments.contains(key) || tactical.is_some(),
                _ => segments.contains(key),
            };
            if !present {
                parsed.warn(Warning::MissingSection { section: key });
            }
        }

        match tactical {
            Some(n) => parsed.value.tactical_support_options = n,
            None => parsed.warn(Warning::MissingField {
                field: "tactical_support_options".to_string(),
            }),
        }

        match scalars::reinforcements(text) {
            Some(suitable) => parsed.value.suitable_for_reinforcements = suitable,
            None => parsed.warn(Warning::MissingField {
                field: "suitable_for_reinforcements".to_string(),
            }),
        }

        if let Some(body) = segments.body(SectionKey::Objectives) {
            let block = parsed.absorb(self.objectives.parse(body));
            parsed.value.mission_objectives = block.objectives;
            parsed.value.tables.extend(block.tables);
        }

        if let Some(body) = segments.body(SectionKey::Deployment) {
            parsed.value.forces_and_deployment = parsed.absorb(self.deployment.parse(body));
        }

        if let Some(body) = segments.body(SectionKey::SpecialRules) {
            parsed.value.scenario_special_rules = parsed.absorb(self.rules.parse(body));
        }

        if let Some(body) = segments.body(SectionKey::EndOfMission) {
            parsed.value.end_of_mission = scalars::end_of_mission(body);
        }

        parsed
    }
}

impl Default for MissionParser {
    fn default() -> Self {
        Self::new(&ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "SUPPLIES\nTACTICAL SUPPORT OPTIONS 1\nSUITABLE FOR REINFORCEMENTS YES\n\
MISSION OBJECTIVES\nMAIN OBJECTIVES\n^ Have more Supply Boxes than the adversary.\n\
FORCES AND DEPLOYMENT\nSIDE A and SIDE B\nA and B 300 6 48 in x 48 in 48 in x 12 in\n\
SCENARIO SPECIAL RULES\nSUPPLY BOX\nThere are 3 Supply Boxes.\n\
END OF THE MISSION\nThis scenario has a time limit of 3 Game Rounds.";

    #[test]
    fn test_complete_mission() {
        let outcome = MissionParser::default().parse(&MissionInput::new(
            "SUPPLIES",
            MissionType::ItsScenario,
            TEXT,
        ));
        assert!(outcome.report.is_complete());
        assert!(outcome.report.warnings.is_empty());
        assert!(outcome.raw_text.is_none());

        let mission = outcome.mission;
        assert_eq!(mission.tactical_support_options, 1);
        assert!(mission.suitable_for_reinforcements);
        assert_eq!(mission.mission_objectives.main_objectives.len(), 1);
        assert_eq!(mission.forces_and_deployment.deployment_table.row_count(), 1);
        assert!(mission.rule("supply_box").is_some());
        assert_eq!(
            mission.end_of_mission,
            "This scenario has a time limit of 3 Game Rounds."
        );
    }

    #[test]
    fn test_empty_text_is_defaulted() {
        let outcome = MissionParser::default().parse(&MissionInput::new(
            "GHOST",
            MissionType::DirectAction,
            "",
        ));
        assert_eq!(outcome.report.absent_sections, SectionKey::EXPECTED.to_vec());
        assert_eq!(outcome.mission.tactical_support_options, 0);
        assert!(!outcome.mission.suitable_for_reinforcements);
    }

    #[test]
    fn test_raw_text_capture() {
        let parser = MissionParser::new(&ParseOptions::new().with_raw_text(true));
        let outcome = parser.parse(&MissionInput::new("X", MissionType::ItsScenario, TEXT));
        assert_eq!(outcome.raw_text.as_deref(), Some(TEXT));
    }

    #[test]
    fn test_unreadable_outcome() {
        let outcome = MissionOutcome::unreadable("X", MissionType::ItsScenario, "page 9 missing");
        assert!(!outcome.report.is_complete());
        assert!(matches!(
            outcome.report.warnings[0],
            Warning::UnreadableMission { .. }
        ));
    }
}
