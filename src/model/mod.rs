//! Output model for extracted missions.
//!
//! These types are plain owned data: built once per run by the parser, never
//! mutated after assembly, and serialized with serde in declaration order.

mod document;
mod mission;
mod report;
mod rule;
mod section;
mod table;

pub use document::Document;
pub use mission::{DeploymentInfo, Mission, MissionType, ObjectiveSet};
pub use report::{ExtractionReport, MissionReport, Parsed, Warning};
pub use rule::{RuleEntry, SkillRule};
pub use section::SectionKey;
pub use table::{Cell, Row, Table};
