//! Single-value extractions: tactical support, reinforcements, end of mission.

use lazy_static::lazy_static;
use regex::Regex;

use super::text::collapse_whitespace;

lazy_static! {
    static ref TACTICAL_SUPPORT: Regex =
        Regex::new(r"(?i)TACTICAL\s+SUPPORT\s+OPTIONS\s*:?\s*(\d+)").unwrap();
    static ref LEADING_NUMBER: Regex = Regex::new(r"^\s*:?\s*(\d+)").unwrap();
    static ref NOT_SUITABLE: Regex =
        Regex::new(r"(?i)\bNOT\s+SUITABLE\s+FOR\s+REINFORCEMENTS\b").unwrap();
    static ref SUITABLE: Regex =
        Regex::new(r"(?i)\bSUITABLE\s+FOR\s+REINFORCEMENTS\b\s*:?\s*(YES|NO)?\b").unwrap();
}

/// Number of tactical support options.
///
/// Looks in the tactical support span first (a number right after the
/// heading), then anywhere in the mission text.
pub fn tactical_support(span_body: Option<&str>, text: &str) -> Option<u32> {
    if let Some(body) = span_body {
        if let Some(caps) = LEADING_NUMBER.captures(body) {
            if let Ok(n) = caps[1].parse() {
                return Some(n);
            }
        }
    }
    TACTICAL_SUPPORT
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Reinforcement eligibility; `None` when the phrase is absent.
pub fn reinforcements(text: &str) -> Option<bool> {
    if NOT_SUITABLE.is_match(text) {
        return Some(false);
    }
    let caps = SUITABLE.captures(text)?;
    match caps.get(1).map(|m| m.as_str().to_uppercase()) {
        Some(answer) if answer == "NO" => Some(false),
        _ => Some(true),
    }
}

/// End-of-mission text, whitespace-collapsed.
pub fn end_of_mission(span_body: &str) -> String {
    collapse_whitespace(span_body)
}
