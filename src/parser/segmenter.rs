//! Splits a mission's text into labeled section spans.

use indexmap::IndexMap;

use super::heading::{HeadingMatcher, HeadingRule};
use crate::model::{Parsed, SectionKey, Warning};

/// Byte range of one section within the mission text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Section key
    pub key: SectionKey,
    /// Start of the heading line
    pub start: usize,
    /// End of the heading phrase, where the body begins
    pub body_start: usize,
    /// Start of the next heading line, or end of text
    pub end: usize,
}

impl Segment {
    /// Full span text, heading included.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Span text after the heading phrase.
    pub fn body<'a>(&self, source: &'a str) -> &'a str {
        &source[self.body_start..self.end]
    }

    /// The heading phrase as printed.
    pub fn heading<'a>(&self, source: &'a str) -> &'a str {
        source[self.start..self.body_start].trim()
    }
}

/// Section spans of one mission, in text order.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    source: &'a str,
    preamble_end: usize,
    spans: IndexMap<SectionKey, Segment>,
}

impl<'a> Segments<'a> {
    /// Get a span by key.
    pub fn get(&self, key: SectionKey) -> Option<&Segment> {
        self.spans.get(&key)
    }

    /// Check if a section was found.
    pub fn contains(&self, key: SectionKey) -> bool {
        self.spans.contains_key(&key)
    }

    /// Span text, heading included.
    pub fn text(&self, key: SectionKey) -> Option<&'a str> {
        self.spans.get(&key).map(|s| s.text(self.source))
    }

    /// Span body, heading excluded.
    pub fn body(&self, key: SectionKey) -> Option<&'a str> {
        self.spans.get(&key).map(|s| s.body(self.source))
    }

    /// Text before the first recognized heading.
    pub fn preamble(&self) -> &'a str {
        &self.source[..self.preamble_end]
    }

    /// Keys of `expected` that were not found, in the given order.
    pub fn missing(&self, expected: &[SectionKey]) -> Vec<SectionKey> {
        expected
            .iter()
            .copied()
            .filter(|key| !self.spans.contains_key(key))
            .collect()
    }

    /// Spans in text order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &'a str)> + '_ {
        self.spans.values().map(|s| (s.key, s.text(self.source)))
    }

    /// Number of spans found.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if no heading was found.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The text that was segmented.
    pub fn source(&self) -> &'a str {
        self.source
    }
}

/// Section segmenter.
pub struct Segmenter {
    matcher: HeadingMatcher,
}

impl Segmenter {
    /// Create a segmenter for the given heading rules.
    pub fn new(rules: &[HeadingRule]) -> Self {
        Self {
            matcher: HeadingMatcher::new(rules),
        }
    }

    /// Create a segmenter around an already configured matcher.
    pub fn with_matcher(matcher: HeadingMatcher) -> Self {
        Self { matcher }
    }

    /// Split text into spans. Preamble plus spans reproduce `text` exactly.
    pub fn segment<'a>(&self, text: &'a str) -> Parsed<Segments<'a>> {
        let mut spans: IndexMap<SectionKey, Segment> = IndexMap::new();
        let mut warnings = Vec::new();
        let mut open: Option<Segment> = None;
        let mut offset = 0;

        for raw_line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += raw_line.len();
            let line = raw_line.trim_end_matches(['\n', '\r']);

            let Some(heading) = self.matcher.match_line(line) else {
                continue;
            };

            if spans.contains_key(&heading.key) || open.map(|s| s.key) == Some(heading.key) {
                warnings.push(Warning::DuplicateHeading {
                    section: heading.key,
                    line: line.trim().to_string(),
                });
                continue;
            }

            if let Some(rejected) = heading.rejected {
                warnings.push(Warning::AmbiguousHeading {
                    line: line.trim().to_string(),
                    chosen: heading.key,
                    rejected,
                });
            }

            if let Some(mut previous) = open.take() {
                previous.end = line_start;
                spans.insert(previous.key, previous);
            }

            log::debug!("section {} opens at byte {}", heading.key, line_start);
            open = Some(Segment {
                key: heading.key,
                start: line_start,
                body_start: line_start + heading.len,
                end: text.len(),
            });
        }

        if let Some(last) = open {
            spans.insert(last.key, last);
        }

        let preamble_end = spans.values().next().map(|s| s.start).unwrap_or(text.len());
        let mut parsed = Parsed::new(Segments {
            source: text,
            preamble_end,
            spans,
        });
        for warning in warnings {
            parsed.warn(warning);
        }
        parsed
    }
}
