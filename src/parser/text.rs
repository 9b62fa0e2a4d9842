//! Small text helpers shared by the block parsers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ENUM_MARKER: Regex =
        Regex::new(r"^\s*(?:[\^•►*–-]\s*|(?:\d{1,2}|[a-zA-Z])[.)]\s+)").unwrap();
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Convert a heading into a JSON key: `lower_case_with_underscores`.
pub fn to_key(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ':' | '.' | ',' | '\'' | '’'))
        .map(|c| match c {
            '-' | '/' | '–' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    let mut key = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '_' && key.ends_with('_') {
            continue;
        }
        key.push(c);
    }
    key.trim_matches('_').to_string()
}

/// Length of the enumeration marker (`^`, `•`, `1.`, `a)`, ...) at the start
/// of a line, if any.
pub fn marker_len(line: &str) -> Option<usize> {
    ENUM_MARKER.find(line).map(|m| m.end())
}

/// Strip a leading enumeration marker.
pub fn strip_marker(line: &str) -> &str {
    match marker_len(line) {
        Some(len) => &line[len..],
        None => line,
    }
}

/// True for lines written in heading typography: at least two letters and
/// no lowercase letter.
pub fn is_caps_line(line: &str) -> bool {
    let mut letters = 0;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_alphabetic() {
            letters += 1;
        }
    }
    letters >= 2
}

/// Count of non-whitespace characters.
pub fn visible_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Split prose into sentences at `.`, `!` or `?` followed by whitespace and an
/// uppercase letter, digit or bullet.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for i in 0..chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut j = i + 1;
        let mut saw_space = false;
        while j < chars.len() && chars[j].1.is_whitespace() {
            saw_space = true;
            j += 1;
        }
        if !saw_space || j >= chars.len() {
            continue;
        }
        let next = chars[j].1;
        if next.is_uppercase() || next.is_ascii_digit() || next == '•' {
            let end = pos + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = chars[j].0;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n b\t\tc "), "a b c");
    }

    #[test]
    fn test_to_key() {
        assert_eq!(to_key("ANTENNA (OBJECTIVE)"), "antenna_objective");
        assert_eq!(to_key("HVT: DESIGNATED LANDING AREA"), "hvt_designated_landing_area");
        assert_eq!(to_key("SHOOT-OUT / KILL ZONE"), "shoot_out_kill_zone");
        assert_eq!(to_key("  DEAD   ZONE "), "dead_zone");
    }

    #[test]
    fn test_markers() {
        assert_eq!(strip_marker("^ Kill more Lieutenants"), "Kill more Lieutenants");
        assert_eq!(strip_marker("• Dominate"), "Dominate");
        assert_eq!(strip_marker("2. Acquire"), "Acquire");
        assert_eq!(strip_marker("b) Retrieve"), "Retrieve");
        assert_eq!(strip_marker("Acquire 2. things"), "Acquire 2. things");
        assert!(marker_len("300 points").is_none());
    }

    #[test]
    fn test_is_caps_line() {
        assert!(is_caps_line("SCENARIO SPECIAL RULES"));
        assert!(is_caps_line("HVT: DESIGNATED TARGET"));
        assert!(!is_caps_line("Each player has 2 tokens"));
        assert!(!is_caps_line("12"));
    }

    #[test]
    fn test_split_sentences() {
        let s = "Kill the Lieutenant. Dominate the zone! Have more points 3.5 than him.";
        assert_eq!(
            split_sentences(s),
            vec![
                "Kill the Lieutenant.",
                "Dominate the zone!",
                "Have more points 3.5 than him."
            ]
        );
        assert_eq!(split_sentences("no boundary here"), vec!["no boundary here"]);
    }
}
