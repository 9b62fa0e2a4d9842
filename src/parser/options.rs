//! Parsing options and configuration.

use super::heading::{default_section_headings, HeadingRule};
use super::normalize::NormalizeOptions;

/// Options for extracting missions.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to parse missions in parallel
    pub parallel: bool,

    /// Whether to keep each mission's pre-segmentation text
    pub capture_raw_text: bool,

    /// Page holding the table of contents (1-indexed)
    pub toc_page: u32,

    /// Longest objective entry before it is split at sentence boundaries
    pub max_entry_chars: usize,

    /// Section heading rules, in priority order
    pub section_headings: Vec<HeadingRule>,

    /// Table-of-contents entries that are not missions
    pub excluded_toc_entries: Vec<String>,

    /// Text normalization applied to page text
    pub normalize: NormalizeOptions,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (unreadable missions are kept with defaults).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Keep the raw text of every mission.
    pub fn with_raw_text(mut self, capture: bool) -> Self {
        self.capture_raw_text = capture;
        self
    }

    /// Set the table of contents page (1-indexed).
    pub fn with_toc_page(mut self, page: u32) -> Self {
        self.toc_page = page;
        self
    }

    /// Set the maximum objective entry length.
    pub fn with_max_entry_chars(mut self, chars: usize) -> Self {
        self.max_entry_chars = chars;
        self
    }

    /// Replace the section heading rules.
    pub fn with_section_headings(mut self, rules: Vec<HeadingRule>) -> Self {
        self.section_headings = rules;
        self
    }

    /// Skip another table-of-contents entry.
    pub fn exclude_toc_entry(mut self, name: impl Into<String>) -> Self {
        self.excluded_toc_entries.push(name.into());
        self
    }

    /// Set normalization options.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Check if lenient mode is enabled.
    pub fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            capture_raw_text: false,
            toc_page: 2,
            max_entry_chars: 400,
            section_headings: default_section_headings(),
            excluded_toc_entries: vec![
                "EXTRAS".into(),
                "CLASSIFIED OBJECTIVES".into(),
                "ITS SCENARIOS".into(),
            ],
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Keep going; unreadable missions get defaults and a warning
    Lenient,
}
