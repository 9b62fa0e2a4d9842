//! Section heading rules and line matching.

use regex::Regex;

use super::text::visible_len;
use crate::model::SectionKey;

/// A section key plus the phrases that announce it.
///
/// Phrases match case-insensitively with any run of spaces between words,
/// optionally followed by a colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRule {
    /// Section the heading opens
    pub key: SectionKey,
    /// Accepted phrasings
    pub phrases: Vec<String>,
}

impl HeadingRule {
    /// Create a rule from a key and its phrases.
    pub fn new<I, S>(key: SectionKey, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }
}

/// The canonical heading list, in priority order.
pub fn default_section_headings() -> Vec<HeadingRule> {
    vec![
        HeadingRule::new(SectionKey::TacticalSupport, ["TACTICAL SUPPORT OPTIONS"]),
        HeadingRule::new(
            SectionKey::Reinforcements,
            ["SUITABLE FOR REINFORCEMENTS", "NOT SUITABLE FOR REINFORCEMENTS"],
        ),
        HeadingRule::new(SectionKey::Objectives, ["MISSION OBJECTIVES"]),
        HeadingRule::new(SectionKey::Deployment, ["FORCES AND DEPLOYMENT"]),
        HeadingRule::new(
            SectionKey::SpecialRules,
            ["SCENARIO SPECIAL RULES", "SPECIAL RULES"],
        ),
        HeadingRule::new(
            SectionKey::EndOfMission,
            ["END OF THE MISSION", "END OF MISSION"],
        ),
    ]
}

/// Limits that keep headings inside running prose from matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isolation {
    /// Share of the line's visible characters the heading must cover
    pub min_coverage: f32,
    /// Longest line, in words, that can still be a heading
    pub max_words: usize,
}

impl Default for Isolation {
    fn default() -> Self {
        Self {
            min_coverage: 0.6,
            max_words: 8,
        }
    }
}

/// Result of matching one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Winning section
    pub key: SectionKey,
    /// Byte length of the heading within the line
    pub len: usize,
    /// A different section that also matched, if any
    pub rejected: Option<SectionKey>,
}

struct CompiledPhrase {
    key: SectionKey,
    regex: Regex,
}

/// Matches lines against a prioritized list of heading rules.
pub struct HeadingMatcher {
    phrases: Vec<CompiledPhrase>,
    isolation: Isolation,
}

impl HeadingMatcher {
    /// Compile the rules with default isolation limits.
    pub fn new(rules: &[HeadingRule]) -> Self {
        Self::with_isolation(rules, Isolation::default())
    }

    /// Compile the rules with explicit isolation limits.
    pub fn with_isolation(rules: &[HeadingRule], isolation: Isolation) -> Self {
        let phrases = rules
            .iter()
            .flat_map(|rule| {
                rule.phrases.iter().filter_map(move |phrase| {
                    compile_phrase(phrase).map(|regex| CompiledPhrase {
                        key: rule.key,
                        regex,
                    })
                })
            })
            .collect();

        Self { phrases, isolation }
    }

    /// Match a single line (without its newline).
    pub fn match_line(&self, line: &str) -> Option<HeadingMatch> {
        if line.split_whitespace().count() > self.isolation.max_words {
            return None;
        }
        let line_visible = visible_len(line);
        if line_visible == 0 {
            return None;
        }

        let mut best: Option<(SectionKey, usize)> = None;
        let mut rejected = None;

        for phrase in &self.phrases {
            let Some(m) = phrase.regex.find(line) else {
                continue;
            };
            let coverage = visible_len(m.as_str()) as f32 / line_visible as f32;
            if coverage < self.isolation.min_coverage {
                continue;
            }

            match best {
                None => best = Some((phrase.key, m.end())),
                Some((key, len)) => {
                    if m.end() > len {
                        if key != phrase.key {
                            rejected = Some(key);
                        }
                        best = Some((phrase.key, m.end()));
                    } else if key != phrase.key && rejected.is_none() {
                        rejected = Some(phrase.key);
                    }
                }
            }
        }

        best.map(|(key, len)| HeadingMatch {
            key,
            len,
            rejected: rejected.filter(|r| *r != key),
        })
    }
}

fn compile_phrase(phrase: &str) -> Option<Regex> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    let pattern = format!(r"(?i)^[ \t]*{}\b[ \t]*:?", words.join(r"[ \t]+"));
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("heading phrase '{}' not usable: {}", phrase, e);
            None
        }
    }
}
