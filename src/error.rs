//! Error types for its-missions.
//!
//! Only failures that make the whole run untrustworthy are errors. Content
//! irregularities inside a mission are reported as [`Warning`](crate::model::Warning)s.

use std::io;
use thiserror::Error;

/// Result type alias for its-missions operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort an extraction run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The table of contents could not be found or lists no missions.
    #[error("Table of contents not usable: {0}")]
    MissingTableOfContents(String),

    /// Error while rendering output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Malformed JSON handed to the structure checker.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
