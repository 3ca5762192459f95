//! Shared tokenization and text heuristics used by the scorer and ScaleDown

use regex::Regex;
use std::collections::HashMap;

/// Headings whose presence makes a resume structurally complete.
const SECTION_HEADINGS: [&str; 4] = ["experience", "education", "skills", "project"];

/// Sentences at or below this many characters (after trimming) are dropped.
const MIN_SENTENCE_CHARS: usize = 10;

pub struct TextProcessor {
    years_regex: Regex,
    sentence_boundary_regex: Regex,
    term_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let years_regex = Regex::new(r"([0-9]+)\s*year").expect("Invalid years regex");

        // Terminal punctuation followed by whitespace, or a run of newlines
        let sentence_boundary_regex =
            Regex::new(r"[.!?]\s+|\n+").expect("Invalid sentence boundary regex");

        // Letter first, then letters, digits and the symbols found in names like c++, c#, node.js
        let term_regex = Regex::new(r"[a-zA-Z][a-zA-Z0-9+\-#.]*").expect("Invalid term regex");

        Self {
            years_regex,
            sentence_boundary_regex,
            term_regex,
        }
    }

    /// First integer directly followed by "year"/"years", or 0.
    pub fn years_of_experience(&self, text: &str) -> u32 {
        let lowered = text.to_lowercase();
        self.years_regex
            .captures(&lowered)
            .and_then(|cap| cap.get(1))
            .map(|digits| digits.as_str().parse::<u32>().unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Fraction of the standard resume headings present anywhere in the text.
    pub fn section_ratio(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let present = SECTION_HEADINGS
            .iter()
            .filter(|heading| lowered.contains(*heading))
            .count();
        present as f64 / SECTION_HEADINGS.len() as f64
    }

    /// Highest count of any single lower-cased whitespace token; 0 for blank text.
    pub fn max_token_repetition(&self, text: &str) -> usize {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in text.split_whitespace() {
            *counts.entry(word.to_lowercase()).or_insert(0) += 1;
        }
        counts.values().copied().max().unwrap_or(0)
    }

    /// Split into sentences after `.`, `!` or `?` plus whitespace, or on newlines.
    /// Fragments of ten characters or fewer are discarded.
    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in self.sentence_boundary_regex.find_iter(trimmed) {
            // Keep the terminal punctuation with its sentence
            let end = if boundary.as_str().starts_with('\n') {
                boundary.start()
            } else {
                boundary.start() + 1
            };
            Self::push_sentence(&mut sentences, &trimmed[start..end]);
            start = boundary.end();
        }
        Self::push_sentence(&mut sentences, &trimmed[start..]);

        sentences
    }

    fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.chars().count() > MIN_SENTENCE_CHARS {
            sentences.push(fragment.to_string());
        }
    }

    /// Lower-cased terms that start with a letter.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.term_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
