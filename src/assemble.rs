//! Document assembly.
//!
//! Locates missions through the table of contents, pulls their page text,
//! runs the mission parser over each one and folds the results into a
//! [`Document`] plus an [`ExtractionReport`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Document, ExtractionReport, Warning};
use crate::parser::{ErrorMode, MissionInput, MissionOutcome, MissionParser, Normalizer, ParseOptions};
use crate::source::{detect_version, MissionLocation, PageSource, TableOfContents};

/// Pages scanned for a contents page when the configured one has none.
const TOC_SCAN_PAGES: u32 = 6;

/// Heading of the section printed after the last mission.
const CLOSING_SECTION: &str = "RESILIENCE OPERATIONS";

/// Result of a whole-document run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The extracted document
    pub document: Document,
    /// Completeness record for every mission
    pub report: ExtractionReport,
    /// Pre-segmentation mission text keyed by mission name, when captured
    pub raw_text: IndexMap<String, String>,
    /// Text of every readable page in order, when captured
    pub document_text: Option<String>,
}

impl Extraction {
    /// Write captured mission text into `dir`.
    ///
    /// One `<mission>.txt` file per mission plus `all_missions.txt` holding
    /// every mission in order. The page text of the whole document goes to
    /// `document.txt`. Returns the number of mission files written.
    pub fn write_raw_text<P: AsRef<Path>>(&self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut all = String::new();
        for (name, text) in &self.raw_text {
            fs::write(dir.join(format!("{}.txt", file_stem(name))), text)?;
            all.push_str(&format!("=== {} ===\n{}\n\n", name, text));
        }
        fs::write(dir.join("all_missions.txt"), all)?;
        if let Some(ref text) = self.document_text {
            fs::write(dir.join("document.txt"), text)?;
        }

        log::debug!("wrote {} raw text files to {}", self.raw_text.len(), dir.display());
        Ok(self.raw_text.len())
    }
}

/// File-system safe stem for a mission name.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Drives the per-mission pipeline over a page source.
pub struct DocumentAssembler<'a, S: PageSource + ?Sized> {
    source: &'a S,
    options: &'a ParseOptions,
}

impl<'a, S: PageSource + ?Sized> DocumentAssembler<'a, S> {
    /// Create an assembler over `source`.
    pub fn new(source: &'a S, options: &'a ParseOptions) -> Self {
        Self { source, options }
    }

    /// Find and parse the contents page.
    ///
    /// The configured page is tried first, then the first few pages in order.
    pub fn table_of_contents(&self) -> Result<TableOfContents> {
        let page_count = self.source.page_count();
        let preferred = self.options.toc_page;
        let candidates = std::iter::once(preferred)
            .chain((1..=TOC_SCAN_PAGES).filter(|&p| p != preferred))
            .filter(|&p| p >= 1 && p <= page_count);

        for page in candidates {
            let text = match self.source.page_text(page) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Failed to read page {} while looking for contents: {}", page, e);
                    continue;
                }
            };
            let toc = TableOfContents::parse(&text, self.options.excluded_toc_entries.as_slice());
            if !toc.is_empty() {
                log::debug!("contents found on page {}", page);
                return Ok(toc);
            }
        }

        Err(Error::MissingTableOfContents(format!(
            "no mission listing found on page {} or the first {} pages",
            preferred, TOC_SCAN_PAGES
        )))
    }

    /// Compute the page range of every listed mission.
    pub fn locate(&self) -> Result<Vec<MissionLocation>> {
        let toc = self.table_of_contents()?;
        let page_count = self.source.page_count();

        let found_closing = match toc.closing_page {
            Some(_) => None,
            None => toc
                .direct_actions
                .last()
                .or(toc.scenarios.last())
                .and_then(|entry| self.source.find_page_containing(CLOSING_SECTION, entry.page)),
        };

        Ok(toc.locate(page_count, found_closing))
    }

    /// Joined and normalized text of one mission.
    ///
    /// In lenient mode unreadable pages are skipped; the call fails only when
    /// no page could be read.
    pub fn mission_text(&self, location: &MissionLocation) -> Result<String> {
        let mut pages = Vec::new();
        let mut last_error = None;

        for page in location.pages() {
            match self.source.page_text(page) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to extract text from page {}: {}", page, e);
                    last_error = Some(e);
                }
            }
        }

        if pages.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(Normalizer::new(self.options.normalize.clone()).process_pages(&pages))
    }

    /// Unprocessed text of every page, one after another.
    ///
    /// Unreadable pages are left out with a warning.
    pub fn document_text(&self) -> String {
        let mut text = String::new();
        for page in 1..=self.source.page_count() {
            match self.source.page_text(page) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    if !page_text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Err(e) => log::warn!("Failed to extract text from page {}: {}", page, e),
            }
        }
        text
    }

    /// Run the whole pipeline.
    ///
    /// `version` defaults to the first version token on page 1.
    pub fn assemble(&self, name: &str, version: Option<&str>) -> Result<Extraction> {
        let locations = self.locate()?;
        let mut report = ExtractionReport::new();

        let version = match version {
            Some(v) => v.to_string(),
            None => self
                .source
                .page_text(1)
                .ok()
                .and_then(|text| detect_version(&text))
                .unwrap_or_default(),
        };

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut pending = Vec::with_capacity(locations.len());
        for location in &locations {
            let count = seen.entry(location.name.clone()).or_insert(0);
            *count += 1;
            let mission_name = if *count > 1 {
                let renamed = format!("{} ({})", location.name, count);
                report.document_warnings.push(Warning::DuplicateMission {
                    name: location.name.clone(),
                    renamed: renamed.clone(),
                });
                renamed
            } else {
                location.name.clone()
            };

            let item = match self.mission_text(location) {
                Ok(text) => Ok(MissionInput::new(mission_name, location.mission_type, text)),
                Err(e) if self.options.is_lenient() => {
                    log::warn!("Mission '{}' could not be read: {}", mission_name, e);
                    Err(MissionOutcome::unreadable(
                        mission_name,
                        location.mission_type,
                        e.to_string(),
                    ))
                }
                Err(e) => return Err(e),
            };
            pending.push(item);
        }

        let parser = MissionParser::new(self.options);
        let parse = |item: std::result::Result<MissionInput, MissionOutcome>| match item {
            Ok(input) => parser.parse(&input),
            Err(outcome) => outcome,
        };
        let outcomes: Vec<MissionOutcome> = if self.options.parallel {
            pending.into_par_iter().map(parse).collect()
        } else {
            pending.into_iter().map(parse).collect()
        };

        let mut document = Document::new(name, version);
        let mut raw_text = IndexMap::new();
        for outcome in outcomes {
            if let Some(text) = outcome.raw_text {
                raw_text.insert(outcome.mission.name.clone(), text);
            }
            report = report.push(outcome.report);
            document.add_mission(outcome.mission);
        }

        log::debug!(
            "assembled {} missions with {} warnings",
            document.mission_count(),
            report.warning_count()
        );

        let document_text = if self.options.capture_raw_text {
            Some(self.document_text())
        } else {
            None
        };

        Ok(Extraction {
            document,
            report,
            raw_text,
            document_text,
        })
    }
}
