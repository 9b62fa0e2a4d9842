//! PDF page source backed by lopdf.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, ObjectId};

use super::PageSource;
use crate::detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
use crate::error::{Error, Result};

/// Text access to the pages of a PDF file.
pub struct PdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    format: PdfFormat,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self::with_document(doc, format))
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::with_document(doc, format))
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn with_document(doc: LopdfDocument, format: PdfFormat) -> Self {
        if doc.is_encrypted() {
            log::warn!("document is encrypted; page text may be unreadable");
        }
        let pages = doc.get_pages();
        log::debug!("opened {} with {} pages", format, pages.len());
        Self { doc, pages, format }
    }

    /// Detected PDF format.
    pub fn format(&self) -> &PdfFormat {
        &self.format
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        if !self.pages.contains_key(&page) {
            return Err(Error::PageOutOfRange(page, self.page_count()));
        }
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::PdfParse(format!("page {}: {}", page, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        assert!(matches!(
            PdfSource::from_bytes(b"not a pdf at all"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfSource::open("/nonexistent/ruleset.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
