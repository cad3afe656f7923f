//! Template-based poem and song lyric generator

use super::text::{capitalize, collapse_whitespace};
use crate::models::Mode;

const FESTIVE_LINES: [&str; 4] = [
    "Beneath the lights that paint the night,",
    "Rhythms pulse and colors bright.",
    "Hands clapping, hearts in flight,",
    "We dance till dawn and own the night.",
];

/// Poem / song lyric generator
pub struct PoemGenerator;

impl PoemGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate lyrics for `prompt` in the requested layout
    pub fn generate(&self, prompt: &str, mode: Mode) -> String {
        let prompt = collapse_whitespace(prompt);

        let lines = match mode {
            Mode::Poem => self.poem_lines(&prompt),
            Mode::Song => {
                let mut lines = vec!["[Verse]".to_string()];
                lines.extend(self.stanza(&prompt));
                lines.push(String::new());
                lines.extend(self.chorus(&prompt));
                lines.push(String::new());
                lines.push(attribution(&prompt));
                lines
            }
            Mode::Both => {
                let mut lines = self.poem_lines(&prompt);
                lines.push(String::new());
                lines.extend(self.chorus(&prompt));
                lines
            }
        };

        lines.join("\n")
    }

    fn poem_lines(&self, prompt: &str) -> Vec<String> {
        let mut lines = self.stanza(prompt);
        lines.insert(1, String::new());
        lines.push(String::new());
        lines.push(attribution(prompt));
        lines
    }

    fn stanza(&self, prompt: &str) -> Vec<String> {
        let mut lines = vec![capitalize(prompt)];
        lines.extend(FESTIVE_LINES.iter().map(|l| l.to_string()));
        lines
    }

    fn chorus(&self, prompt: &str) -> Vec<String> {
        vec![
            "[Chorus]".to_string(),
            format!("Sing it loud for {},", prompt.to_lowercase()),
            "Let the whole night sing along!".to_string(),
        ]
    }
}

impl Default for PoemGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn attribution(prompt: &str) -> String {
    format!("— Inspired by: {}", prompt)
}

/// First line of the lyrics worth showing on screen
///
/// Skips blank lines and section labels such as `[Verse]`.
pub fn headline(lyrics: &str) -> Option<&str> {
    lyrics
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !(line.starts_with('[') && line.ends_with(']')))
}
