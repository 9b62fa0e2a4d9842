//! Mission text parsing module.
//!
//! Normalized mission text flows through the [`Segmenter`] into per-section
//! spans, which the block parsers turn into the mission model.

mod deployment;
mod heading;
mod mission;
mod normalize;
mod objectives;
mod options;
mod rules;
mod scalars;
mod segmenter;
mod table_detector;
mod text;

pub use deployment::DeploymentParser;
pub use heading::{default_section_headings, HeadingMatch, HeadingMatcher, HeadingRule, Isolation};
pub use mission::{MissionInput, MissionOutcome, MissionParser};
pub use normalize::{normalize, NormalizeOptions, Normalizer};
pub use objectives::{ObjectiveBlock, ObjectiveParser};
pub use options::{ErrorMode, ParseOptions};
pub use rules::{RuleParser, GENERAL_RULE_KEY};
pub use scalars::{end_of_mission, reinforcements, tactical_support};
pub use segmenter::{Segment, Segmenter, Segments};
pub use table_detector::{PointRun, TableDetector, TableDetectorConfig};
pub use text::{collapse_whitespace, to_key};
