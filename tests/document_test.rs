//! Integration tests for whole-document extraction over in-memory pages.

use its_missions::error::Result;
use its_missions::{
    DocumentAssembler, Error, MemorySource, MissionExtractor, MissionType, PageSource,
    Cell, ParseOptions, SectionKey, Warning,
};

const CONTENTS: &str = "CONTENTS\nEXTRAS 3\nITS SCENARIOS 3\nSUPPLIES 3\nFIREFIGHT 5\n\
ITS DIRECT ACTION 6\nCLASSIFIED OBJECTIVES 6\nHIGHLY CLASSIFIED 6\nRESILIENCE OPERATIONS 7";

const SUPPLIES_1: &str = "SUPPLIES\nTACTICAL SUPPORT OPTIONS 1\nSUITABLE FOR REINFORCEMENTS YES\n\
MISSION OBJECTIVES\nMAIN OBJECTIVES\n^ Have more Supply Boxes than the adversary.\n\n17\nITS SCENARIOS";

const SUPPLIES_2: &str = "FORCES AND DEPLOYMENT\nSIDE A and SIDE B\nA 300 24 in x 12 in\nB 400 24 in x 12 in\n\
SCENARIO SPECIAL RULES\nSUPPLY BOX\nThere are 3 Supply Boxes.\n\
END OF THE MISSION\nThis scenario has a time limit of 3 Game Rounds.";

const FIREFIGHT: &str = "FIREFIGHT\nTACTICAL SUPPORT OPTIONS: 2\nNOT SUITABLE FOR REINFORCEMENTS\n\
MISSION OBJECTIVES\n^ Kill more troopers than the adversary.\n\
END OF THE MISSION\nThis scenario has a time limit of 3 Game Rounds.";

const HIGHLY_CLASSIFIED: &str = "HIGHLY CLASSIFIED\nTACTICAL SUPPORT OPTIONS 0\n\
MISSION OBJECTIVES\n^ Accomplish Classified Objectives.\nEND OF THE MISSION\nTwo rounds.";

fn source() -> MemorySource {
    MemorySource::from_pages([
        "ITS SEASON 17 RULES v1.0.1",
        CONTENTS,
        SUPPLIES_1,
        SUPPLIES_2,
        FIREFIGHT,
        HIGHLY_CLASSIFIED,
        "RESILIENCE OPERATIONS",
    ])
}

/// Page source that fails on selected pages.
struct FlakySource {
    inner: MemorySource,
    broken: Vec<u32>,
}

impl PageSource for FlakySource {
    fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        if self.broken.contains(&page) {
            return Err(Error::PdfParse(format!("page {}: bad stream", page)));
        }
        self.inner.page_text(page)
    }
}

#[test]
fn test_missions_in_contents_order() {
    let extraction = MissionExtractor::new()
        .with_name("ITS Season 17")
        .extract(&source())
        .unwrap();
    let doc = &extraction.document;

    assert_eq!(doc.name, "ITS Season 17");
    assert_eq!(doc.version, "v1.0.1");
    assert_eq!(
        doc.mission_names(),
        vec!["SUPPLIES", "FIREFIGHT", "HIGHLY CLASSIFIED"]
    );
    assert_eq!(doc.missions[1].mission_type, MissionType::ItsScenario);
    assert_eq!(doc.missions[2].mission_type, MissionType::DirectAction);
}

#[test]
fn test_mission_spans_pages() {
    let extraction = MissionExtractor::new().extract(&source()).unwrap();
    let supplies = extraction.document.get_mission("SUPPLIES").unwrap();

    assert_eq!(supplies.tactical_support_options, 1);
    assert!(supplies.suitable_for_reinforcements);
    assert_eq!(supplies.mission_objectives.main_objectives.len(), 1);
    assert_eq!(supplies.forces_and_deployment.deployment_table.row_count(), 2);
    assert!(supplies.rule("supply_box").is_some());
    assert_eq!(
        supplies.end_of_mission,
        "This scenario has a time limit of 3 Game Rounds."
    );
    assert!(extraction.report.missions[0].is_complete());
}

#[test]
fn test_report_marks_absent_sections() {
    let extraction = MissionExtractor::new().extract(&source()).unwrap();
    let firefight = &extraction.report.missions[1];

    assert_eq!(firefight.mission, "FIREFIGHT");
    assert_eq!(
        firefight.absent_sections,
        vec![SectionKey::Deployment, SectionKey::SpecialRules]
    );
    assert_eq!(extraction.report.absent_count(SectionKey::Deployment), 2);
    assert!(!extraction.report.is_clean());
}

#[test]
fn test_parallel_matches_sequential() {
    let source = source();
    let parallel = ParseOptions::default();
    let sequential = ParseOptions::default().sequential();

    let a = DocumentAssembler::new(&source, &parallel)
        .assemble("ITS", None)
        .unwrap();
    let b = DocumentAssembler::new(&source, &sequential)
        .assemble("ITS", None)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_explicit_version_wins() {
    let extraction = MissionExtractor::new()
        .with_version("v2.0")
        .extract(&source())
        .unwrap();
    assert_eq!(extraction.document.version, "v2.0");
}

#[test]
fn test_strict_mode_aborts_on_unreadable_page() {
    let source = FlakySource {
        inner: source(),
        broken: vec![5],
    };
    let result = MissionExtractor::new().extract(&source);
    assert!(matches!(result, Err(Error::PdfParse(_))));
}

#[test]
fn test_lenient_mode_keeps_unreadable_mission() {
    let source = FlakySource {
        inner: source(),
        broken: vec![5],
    };
    let extraction = MissionExtractor::new().lenient().extract(&source).unwrap();
    assert_eq!(extraction.document.mission_count(), 3);

    let firefight = extraction.document.get_mission("FIREFIGHT").unwrap();
    assert_eq!(firefight.tactical_support_options, 0);

    let report = &extraction.report.missions[1];
    assert_eq!(report.absent_sections, SectionKey::EXPECTED.to_vec());
    assert!(matches!(
        report.warnings[0],
        Warning::UnreadableMission { .. }
    ));
}

#[test]
fn test_lenient_mode_skips_bad_page_within_mission() {
    let source = FlakySource {
        inner: source(),
        broken: vec![4],
    };
    let extraction = MissionExtractor::new().lenient().extract(&source).unwrap();
    let supplies = extraction.document.get_mission("SUPPLIES").unwrap();

    assert_eq!(supplies.tactical_support_options, 1);
    assert_eq!(supplies.end_of_mission, "");
    assert!(extraction.report.missions[0]
        .absent_sections
        .contains(&SectionKey::EndOfMission));
}

#[test]
fn test_missing_contents_is_fatal() {
    let source = MemorySource::from_pages(["cover", "welcome", "rules"]);
    let result = MissionExtractor::new().extract(&source);
    assert!(matches!(result, Err(Error::MissingTableOfContents(_))));
}

#[test]
fn test_raw_text_capture_and_write() {
    let extraction = MissionExtractor::new()
        .with_raw_text(true)
        .extract(&source())
        .unwrap();

    let raw = &extraction.raw_text["SUPPLIES"];
    assert!(raw.starts_with("SUPPLIES\nTACTICAL SUPPORT OPTIONS 1"));
    assert!(raw.contains("END OF THE MISSION"));
    assert!(!raw.contains("ITS SCENARIOS"));
    assert!(!raw.contains("\n17\n"));

    let dir = tempfile::tempdir().unwrap();
    let written = extraction.write_raw_text(dir.path()).unwrap();
    assert_eq!(written, 3);
    assert!(dir.path().join("highly_classified.txt").exists());

    let all = std::fs::read_to_string(dir.path().join("all_missions.txt")).unwrap();
    assert!(all.contains("=== FIREFIGHT ==="));

    let document = std::fs::read_to_string(dir.path().join("document.txt")).unwrap();
    assert!(document.starts_with("ITS SEASON 17 RULES v1.0.1\nCONTENTS"));
    assert!(document.contains("\n17\nITS SCENARIOS"));
    assert!(document.ends_with("RESILIENCE OPERATIONS\n"));
}

#[test]
fn test_values_on_their_own_lines_survive() {
    let source = MemorySource::from_pages([
        "cover",
        "ITS SCENARIOS 3 ACQUISITION 3 ITS DIRECT ACTION 4 RESILIENCE OPERATIONS 4",
        "ACQUISITION\nTACTICAL SUPPORT OPTIONS\n2\nSUITABLE FOR REINFORCEMENTS YES\n\
MISSION OBJECTIVES\n^ Acquire the Antenna.\nFORCES AND DEPLOYMENT\nSIDE A and SIDE B\n\
A and B\n300\n6\n48 in x 48 in\n48 in x 12 in\nEND OF THE MISSION\nThree rounds.\n21\nITS SCENARIOS",
        "RESILIENCE OPERATIONS",
    ]);
    let extraction = MissionExtractor::new().extract(&source).unwrap();
    let mission = extraction.document.get_mission("ACQUISITION").unwrap();

    assert_eq!(mission.tactical_support_options, 2);
    let table = &mission.forces_and_deployment.deployment_table;
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows()[0]["points"], Cell::Number(300));
    assert_eq!(table.rows()[0]["swc"], Cell::Number(6));
    assert_eq!(mission.end_of_mission, "Three rounds.");
}

#[test]
fn test_locate_page_ranges() {
    let locations = MissionExtractor::new().locate(&source()).unwrap();
    let ranges: Vec<_> = locations.iter().map(|l| l.pages()).collect();
    assert_eq!(ranges, vec![3..5, 5..6, 6..7]);
}
