//! Text helpers shared by the generators

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Greedy word wrap at `width` columns
///
/// Words longer than `width` are broken across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in WHITESPACE.split(text.trim()).filter(|w| !w.is_empty()) {
        let mut word: Vec<char> = word.chars().collect();

        loop {
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(word.iter());
                current_len += word.len();
                break;
            }

            if word.len() <= width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }

            // Fill the remaining space with the head of the long word
            let room = if current_len == 0 { width } else { width.saturating_sub(current_len + 1) };
            if room == 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let rest = word.split_off(room);
            if current_len > 0 {
                current.push(' ');
            }
            current.extend(word.iter());
            lines.push(std::mem::take(&mut current));
            current_len = 0;
            word = rest;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\tnight \n of   lights "), "a night of lights");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("a NIGHT of Colors"), "A night of colors");
        assert_eq!(capitalize("été"), "Été");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap("Beneath the lights that paint the night, rhythms pulse", 30);
        assert_eq!(lines, vec!["Beneath the lights that paint", "the night, rhythms pulse"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap("ab abcdefghij", 4);
        assert_eq!(lines, vec!["ab a", "bcde", "fghi", "j"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap("   ", 30).is_empty());
    }
}
