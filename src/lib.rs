//! # its-missions
//!
//! Mission data extraction for ITS tournament ruleset PDFs.
//!
//! This library locates every scenario and direct action listed in a
//! ruleset's table of contents and turns each mission's text into structured
//! data: objectives, deployment table, special rules (plain or skill-style),
//! end conditions and tactical support count. The result serializes to
//! stable JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use its_missions::{parse_file, render};
//!
//! fn main() -> its_missions::Result<()> {
//!     let doc = parse_file("its_rules.pdf")?;
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Never-fail mission parsing**: absent sections become defaults plus a
//!   completeness record, never an error
//! - **Skill rules**: `REQUIREMENTS` / `EFFECTS` / `CANCELATION` blocks are
//!   split into fields
//! - **Tables**: deployment rows and objective point runs are lifted into
//!   typed rows
//! - **Parallel processing**: missions are parsed with Rayon
//! - **Stable output**: ordered maps and no timestamps

pub mod assemble;
pub mod check;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use assemble::{DocumentAssembler, Extraction};
pub use check::{check_file, check_json, StructureReport};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    Cell, DeploymentInfo, Document, ExtractionReport, Mission, MissionReport, MissionType,
    ObjectiveSet, Parsed, Row, RuleEntry, SectionKey, SkillRule, Table, Warning,
};
pub use parser::{
    ErrorMode, HeadingRule, MissionInput, MissionOutcome, MissionParser, NormalizeOptions,
    ParseOptions,
};
pub use render::JsonFormat;
pub use source::{MemorySource, MissionLocation, PageSource, PdfSource, TableOfContents};

use std::path::Path;

/// Document name used when none is given and none can be derived.
pub const DEFAULT_DOCUMENT_NAME: &str = "ITS";

/// Extract every mission from a ruleset PDF.
///
/// The document is named after the file stem and its version is read from
/// the cover page.
///
/// # Example
///
/// ```no_run
/// use its_missions::parse_file;
///
/// let doc = parse_file("its_rules.pdf").unwrap();
/// println!("Missions: {}", doc.mission_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Extract every mission from a ruleset PDF with custom options.
///
/// # Example
///
/// ```no_run
/// use its_missions::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().sequential();
/// let doc = parse_file_with_options("its_rules.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    Ok(MissionExtractor::with_options(options).extract_file(path)?.document)
}

/// Extract every mission from PDF bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    Ok(MissionExtractor::new().extract_bytes(data)?.document)
}

/// Parse the text of a single mission.
///
/// Never fails; absent sections are defaulted and reported as warnings.
///
/// # Example
///
/// ```
/// use its_missions::{parse_mission, MissionType};
///
/// let parsed = parse_mission("SUPPLIES", MissionType::ItsScenario, "TACTICAL SUPPORT OPTIONS 2");
/// assert_eq!(parsed.value.tactical_support_options, 2);
/// assert!(!parsed.is_clean());
/// ```
pub fn parse_mission(name: &str, mission_type: MissionType, text: &str) -> Parsed<Mission> {
    MissionParser::default().parse_text(name, mission_type, text)
}

/// Builder for whole-document extraction.
///
/// # Example
///
/// ```no_run
/// use its_missions::MissionExtractor;
///
/// let extraction = MissionExtractor::new()
///     .with_name("ITS Season 17")
///     .lenient()
///     .with_raw_text(true)
///     .extract_file("its_rules.pdf")?;
/// extraction.write_raw_text("raw_text")?;
/// # Ok::<(), its_missions::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MissionExtractor {
    options: ParseOptions,
    name: Option<String>,
    version: Option<String>,
}

impl MissionExtractor {
    /// Create a new extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with custom parse options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Set the document name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the document version instead of reading it from the cover page.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Enable lenient mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Capture pre-segmentation mission text.
    pub fn with_raw_text(mut self, capture: bool) -> Self {
        self.options = self.options.with_raw_text(capture);
        self
    }

    /// Parse options in use.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Extract from a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let path = path.as_ref();
        let source = PdfSource::open(path)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
        self.extract_with_name(&source, fallback)
    }

    /// Extract from PDF bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Extraction> {
        let source = PdfSource::from_bytes(data)?;
        self.extract_with_name(&source, DEFAULT_DOCUMENT_NAME.to_string())
    }

    /// Extract from any page source.
    pub fn extract<S: PageSource + ?Sized>(&self, source: &S) -> Result<Extraction> {
        self.extract_with_name(source, DEFAULT_DOCUMENT_NAME.to_string())
    }

    /// Locate missions without parsing them.
    pub fn locate<S: PageSource + ?Sized>(&self, source: &S) -> Result<Vec<MissionLocation>> {
        DocumentAssembler::new(source, &self.options).locate()
    }

    fn extract_with_name<S: PageSource + ?Sized>(
        &self,
        source: &S,
        fallback_name: String,
    ) -> Result<Extraction> {
        let name = self.name.clone().unwrap_or(fallback_name);
        DocumentAssembler::new(source, &self.options).assemble(&name, self.version.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mission_defaults() {
        let parsed = parse_mission("GHOST", MissionType::DirectAction, "");
        assert_eq!(parsed.value.name, "GHOST");
        assert!(parsed
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::MissingSection { section: SectionKey::EndOfMission })));
    }

    #[test]
    fn test_extractor_builder() {
        let extractor = MissionExtractor::new().lenient().sequential().with_raw_text(true);
        assert!(extractor.options().is_lenient());
        assert!(!extractor.options().parallel);
        assert!(extractor.options().capture_raw_text);
    }

    #[test]
    fn test_extract_from_memory() {
        let source = MemorySource::from_pages([
            "ITS v3.1",
            "ITS SCENARIOS 3 SUPPLIES 3 ITS DIRECT ACTION 4 FIREFIGHT 4",
            "SUPPLIES",
            "FIREFIGHT",
        ]);
        let extraction = MissionExtractor::new()
            .with_name("Test")
            .extract(&source)
            .unwrap();
        assert_eq!(extraction.document.name, "Test");
        assert_eq!(extraction.document.version, "v3.1");
        assert_eq!(extraction.document.mission_count(), 2);
    }

    #[test]
    fn test_extract_bytes_rejects_non_pdf() {
        assert!(matches!(
            MissionExtractor::new().extract_bytes(b"hello"),
            Err(Error::UnknownFormat)
        ));
    }
}
