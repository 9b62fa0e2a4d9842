//! Table-of-contents lookup and mission page ranges.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::MissionType;
use crate::parser::collapse_whitespace;

lazy_static! {
    static ref SCENARIO_BLOCK: Regex =
        Regex::new(r"(?i)ITS SCENARIOS\s+(\d+)\s+(.*?)\s+ITS DIRECT ACTION").unwrap();
    static ref DIRECT_ACTION_BLOCK: Regex = Regex::new(
        r"(?i)ITS DIRECT ACTION\s+(\d+)\s+(.*?)\s*(?:RESILIENCE OPERATIONS|CHANGELOG|$)"
    )
    .unwrap();
    static ref ENTRY: Regex = Regex::new(r"([A-Z][A-Z'\s\-]+?)\s+(\d+)").unwrap();
    static ref CLOSING: Regex = Regex::new(r"(?i)RESILIENCE OPERATIONS\s+(\d+)").unwrap();
    static ref VERSION: Regex = Regex::new(r"\bv\d+(?:\.\d+){1,2}\b").unwrap();
}

/// Shortest accepted mission name.
const MIN_NAME_LEN: usize = 4;

/// One `NAME page` pair from the contents page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Mission name as printed
    pub name: String,
    /// First page (1-indexed)
    pub page: u32,
    /// Category the entry was listed under
    pub mission_type: MissionType,
}

/// A mission with its half-open page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionLocation {
    /// Mission name as printed
    pub name: String,
    /// Mission category
    pub mission_type: MissionType,
    /// First page (1-indexed)
    pub start_page: u32,
    /// One past the last page
    pub end_page: u32,
}

impl MissionLocation {
    /// Pages covered by this mission.
    pub fn pages(&self) -> Range<u32> {
        self.start_page..self.end_page
    }

    /// Number of pages covered.
    pub fn page_count(&self) -> u32 {
        self.end_page.saturating_sub(self.start_page)
    }
}

/// Missions listed on the contents page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOfContents {
    /// Entries under "ITS SCENARIOS"
    pub scenarios: Vec<TocEntry>,
    /// Entries under "ITS DIRECT ACTION"
    pub direct_actions: Vec<TocEntry>,
    /// Page of the section that follows the missions, if listed
    pub closing_page: Option<u32>,
}

impl TableOfContents {
    /// Parse the text of a contents page.
    ///
    /// Names matching `excluded` (case-insensitive) are dropped.
    pub fn parse<S: AsRef<str>>(text: &str, excluded: &[S]) -> Self {
        let text = collapse_whitespace(text);

        let scenarios = SCENARIO_BLOCK
            .captures(&text)
            .and_then(|caps| caps.get(2))
            .map(|block| entries(block.as_str(), MissionType::ItsScenario, excluded))
            .unwrap_or_default();

        let direct_actions = DIRECT_ACTION_BLOCK
            .captures(&text)
            .and_then(|caps| caps.get(2))
            .map(|block| entries(block.as_str(), MissionType::DirectAction, excluded))
            .unwrap_or_default();

        let closing_page = CLOSING
            .captures(&text)
            .and_then(|caps| caps[1].parse().ok());

        log::debug!(
            "contents: {} scenarios, {} direct actions, closing page {:?}",
            scenarios.len(),
            direct_actions.len(),
            closing_page
        );

        Self {
            scenarios,
            direct_actions,
            closing_page,
        }
    }

    /// Total number of listed missions.
    pub fn len(&self) -> usize {
        self.scenarios.len() + self.direct_actions.len()
    }

    /// Check if no mission was listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute page ranges for every listed mission, scenarios first.
    ///
    /// `found_closing` is the first page found to contain the closing
    /// section; it is used only when the contents page does not list one.
    pub fn locate(&self, page_count: u32, found_closing: Option<u32>) -> Vec<MissionLocation> {
        let document_end = page_count.saturating_add(1);
        let closing = self.closing_page.or(found_closing);
        let first_direct_action = self.direct_actions.first().map(|e| e.page);

        let scenario_ends = following_starts(&self.scenarios)
            .map(|next| next.or(first_direct_action).or(closing).unwrap_or(document_end));
        let direct_action_ends = following_starts(&self.direct_actions)
            .map(|next| next.or(closing).unwrap_or(document_end));

        self.scenarios
            .iter()
            .zip(scenario_ends)
            .chain(self.direct_actions.iter().zip(direct_action_ends))
            .map(|(entry, end)| {
                let min_end = entry.page.saturating_add(1);
                MissionLocation {
                    name: entry.name.clone(),
                    mission_type: entry.mission_type,
                    start_page: entry.page,
                    end_page: end.max(min_end).min(document_end.max(min_end)),
                }
            })
            .collect()
    }
}

/// Start page of each entry's successor, `None` for the last one.
fn following_starts(entries: &[TocEntry]) -> impl Iterator<Item = Option<u32>> + '_ {
    (0..entries.len()).map(move |i| entries.get(i + 1).map(|e| e.page))
}

fn entries<S: AsRef<str>>(block: &str, mission_type: MissionType, excluded: &[S]) -> Vec<TocEntry> {
    ENTRY
        .captures_iter(block)
        .filter_map(|caps| {
            let name = caps[1].trim();
            let page = caps[2].parse().ok()?;
            if name.len() < MIN_NAME_LEN
                || excluded.iter().any(|x| x.as_ref().eq_ignore_ascii_case(name))
            {
                return None;
            }
            Some(TocEntry {
                name: name.to_string(),
                page,
                mission_type,
            })
        })
        .collect()
}

/// First `vN.N[.N]` token in `text`.
pub fn detect_version(text: &str) -> Option<String> {
    VERSION.find(text).map(|m| m.as_str().to_string())
}
