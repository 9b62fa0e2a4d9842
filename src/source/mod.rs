//! Page text sources.
//!
//! The document assembler only needs page counts and per-page text, so the
//! PDF library stays behind the [`PageSource`] trait. [`MemorySource`] serves
//! tests and callers that already hold extracted text.

mod pdf;
mod toc;

pub use pdf::PdfSource;
pub use toc::{detect_version, MissionLocation, TableOfContents, TocEntry};

use crate::error::{Error, Result};

/// Random access to the text of numbered pages (1-indexed).
pub trait PageSource {
    /// Total number of pages.
    fn page_count(&self) -> u32;

    /// Text of one page.
    fn page_text(&self, page: u32) -> Result<String>;

    /// First page at or after `from` whose text contains `needle`.
    ///
    /// Pages that fail to extract are skipped.
    fn find_page_containing(&self, needle: &str, from: u32) -> Option<u32> {
        (from.max(1)..=self.page_count()).find(|&page| {
            self.page_text(page)
                .map(|text| text.contains(needle))
                .unwrap_or(false)
        })
    }
}

/// Pages held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySource {
    pages: Vec<String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from page texts, first page first.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a page.
    pub fn push_page(&mut self, text: impl Into<String>) {
        self.pages.push(text.into());
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }
}
