//! Rendering module for writing extracted documents.

mod json;

pub use json::{report_to_json, to_json, write_json, JsonFormat};
