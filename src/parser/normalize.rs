//! Text normalization applied to raw page text before segmentation.
//!
//! PDF extraction leaves ligatures, odd Unicode spaces, page numbers and
//! running footers in the text. Line structure is kept: every later stage
//! relies on line starts to recognize headings and list markers.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200A}\u{202F}]+").unwrap();
    static ref PAGE_NUMBER: Regex = Regex::new(r"^[-–—]?\s*\d{1,3}\s*[-–—]?$").unwrap();
}

/// Options for mission text normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Fix ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Standardize bullet characters (►, ●, ▪ → •)
    pub standardize_bullets: bool,

    /// Drop page numbers at page edges and next to running footers
    pub remove_page_numbers: bool,

    /// Running footer labels to drop (optionally prefixed or suffixed by a page number)
    pub running_footers: Vec<String>,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl NormalizeOptions {
    /// Options that only collapse whitespace.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            standardize_bullets: false,
            remove_page_numbers: false,
            running_footers: Vec::new(),
            max_consecutive_newlines: 0,
        }
    }

    /// Add a running footer label.
    pub fn with_footer(mut self, label: impl Into<String>) -> Self {
        self.running_footers.push(label.into());
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            standardize_bullets: true,
            remove_page_numbers: true,
            running_footers: vec!["ITS SCENARIOS".into(), "ITS DIRECT ACTION".into()],
            max_consecutive_newlines: 2,
        }
    }
}

/// Normalization pipeline.
pub struct Normalizer {
    options: NormalizeOptions,
    footer_regex: Option<Regex>,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl Normalizer {
    /// Create a new normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        let footer_regex = if options.running_footers.is_empty() {
            None
        } else {
            let labels: Vec<String> = options
                .running_footers
                .iter()
                .map(|label| {
                    label
                        .split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect();
            let pattern = format!(r"(?i)^(?:\d{{1,3}}\s+)?(?:{})(?:\s+\d{{1,3}})?$", labels.join("|"));
            Regex::new(&pattern).ok()
        };

        Self {
            options,
            footer_regex,
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
                ("\u{FB05}", "st"),
                ("\u{FB06}", "st"),
            ],
        }
    }

    /// Process text through the pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligature_map {
                result = result.replace(ligature, replacement);
            }
        }

        // punctuation space shows up inside skill fields
        result = result.replace('\u{2008}', "");

        if self.options.standardize_bullets {
            result = self.standardize_bullets(&result);
        }

        let lines: Vec<String> = result
            .split('\n')
            .map(|line| HORIZONTAL_WS.replace_all(line, " ").trim().to_string())
            .collect();
        let lines: Vec<&str> = lines
            .iter()
            .enumerate()
            .filter(|&(i, _)| !self.is_page_furniture(&lines, i))
            .map(|(_, line)| line.as_str())
            .collect();

        let mut result = lines.join("\n");
        if self.options.max_consecutive_newlines > 0 {
            result = self.limit_newlines(&result);
        }

        result.trim().to_string()
    }

    /// Join the text of consecutive pages and process it.
    ///
    /// A bare number as the first or last line of a page is its page number.
    pub fn process_pages<S: AsRef<str>>(&self, pages: &[S]) -> String {
        let pages: Vec<&str> = pages
            .iter()
            .map(|page| {
                if self.options.remove_page_numbers {
                    strip_edge_page_numbers(page.as_ref())
                } else {
                    page.as_ref()
                }
            })
            .collect();
        self.process(&pages.join("\n"))
    }

    /// Footer lines are always furniture. A bare number only counts as a page
    /// number when the nearest non-empty line on either side is a footer.
    fn is_page_furniture(&self, lines: &[String], index: usize) -> bool {
        let line = lines[index].as_str();
        if line.is_empty() {
            return false;
        }
        if self.is_footer(line) {
            return true;
        }
        if !self.options.remove_page_numbers || !PAGE_NUMBER.is_match(line) {
            return false;
        }
        let before = lines[..index].iter().rev().find(|l| !l.is_empty());
        let after = lines[index + 1..].iter().find(|l| !l.is_empty());
        before.into_iter().chain(after).any(|l| self.is_footer(l))
    }

    fn is_footer(&self, line: &str) -> bool {
        self.footer_regex
            .as_ref()
            .map(|re| re.is_match(line))
            .unwrap_or(false)
    }

    fn standardize_bullets(&self, text: &str) -> String {
        let bullets = ['●', '○', '■', '□', '◆', '◇', '▪', '▫', '►', '▻', '▶'];
        text.chars()
            .map(|c| if bullets.contains(&c) { '•' } else { c })
            .collect()
    }

    fn limit_newlines(&self, text: &str) -> String {
        let max = self.options.max_consecutive_newlines as usize;
        let pattern = format!(r"\n{{{},}}", max + 1);
        match Regex::new(&pattern) {
            Ok(re) => re.replace_all(text, "\n".repeat(max).as_str()).into_owned(),
            Err(_) => text.to_string(),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

/// Drop a bare number heading or closing one page of text.
fn strip_edge_page_numbers(page: &str) -> &str {
    let mut text = page.trim();
    if PAGE_NUMBER.is_match(text) {
        return "";
    }
    if let Some((first, rest)) = text.split_once('\n') {
        if PAGE_NUMBER.is_match(first.trim()) {
            text = rest.trim_start();
        }
    }
    if let Some((rest, last)) = text.rsplit_once('\n') {
        if PAGE_NUMBER.is_match(last.trim()) {
            text = rest.trim_end();
        }
    }
    text
}

/// Normalize text with default options.
pub fn normalize(text: &str) -> String {
    Normalizer::default().process(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapse_keeps_lines() {
        let text = "MISSION   OBJECTIVES\t\n  Kill  the\u{00A0}Lieutenant ";
        assert_eq!(normalize(text), "MISSION OBJECTIVES\nKill the Lieutenant");
    }

    #[test]
    fn test_newline_limit() {
        let text = "A\n\n\n\n\nB";
        assert_eq!(normalize(text), "A\n\nB");
    }

    #[test]
    fn test_page_furniture_removed() {
        let text = "first half of a sentence\n17\nITS SCENARIOS\n18 ITS DIRECT ACTION\nsecond half";
        assert_eq!(normalize(text), "first half of a sentence\nsecond half");
    }

    #[test]
    fn test_bare_numbers_inside_text_kept() {
        let text = "TACTICAL SUPPORT OPTIONS\n2\nSIDE A and SIDE B\nA and B\n300\n6\n48 in x 48 in";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_page_edge_numbers_removed() {
        let normalizer = Normalizer::default();
        let pages = ["12\nTACTICAL SUPPORT OPTIONS\n2\nSIDE A", "SIDE B\n13\n", "14"];
        assert_eq!(
            normalizer.process_pages(&pages),
            "TACTICAL SUPPORT OPTIONS\n2\nSIDE A\nSIDE B"
        );

        let kept = Normalizer::new(NormalizeOptions::minimal());
        assert_eq!(kept.process_pages(&["12\nA"]), "12\nA");
    }

    #[test]
    fn test_custom_footer() {
        let options = NormalizeOptions::default().with_footer("Infinity N5");
        let normalizer = Normalizer::new(options);
        assert_eq!(
            normalizer.process("Kill the HVT.\n21\nINFINITY N5\nNext line"),
            "Kill the HVT.\nNext line"
        );
    }

    #[test]
    fn test_ligature_and_bullets() {
        let text = "► Con\u{FB01}rm the \u{FB02}ag\u{2008}";
        assert_eq!(normalize(text), "• Confirm the flag");
    }

    #[test]
    fn test_minimal_keeps_numbers() {
        let normalizer = Normalizer::new(NormalizeOptions::minimal());
        assert_eq!(normalizer.process("3\n\n\n\nB"), "3\n\n\n\nB");
    }

    #[test]
    fn test_idempotent() {
        let text = "TACTICAL SUPPORT OPTIONS  2\n\n\n► EFFECTS\n12";
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }
}
