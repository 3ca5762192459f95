//! ScaleDown: extractive summarization by sentence ranking
//!
//! Sentences are ranked by how much of the document's recurring vocabulary
//! they carry, with extra credit for known skills and a capped length bonus.
//! The best ones are kept in rank order.

use crate::config::Config;
use crate::error::Result;
use crate::metrics::round2;
use crate::processing::skills::SkillExtractor;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terms this short never count towards the frequency table.
const MIN_FREQUENT_TERM_CHARS: usize = 3;
const SKILL_HIT_WEIGHT: usize = 4;
const LENGTH_CREDIT_CAP: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub text: String,
    /// Percentage of characters removed
    pub compression: f64,
    pub kept_sentences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedPosting {
    pub id: usize,
    pub original_chars: usize,
    pub compressed_chars: usize,
    pub compression: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCompression {
    pub count: usize,
    pub avg_compression: f64,
    pub items: Vec<CompressedPosting>,
}

pub struct ScaleDown {
    processor: TextProcessor,
    extractor: SkillExtractor,
}

impl ScaleDown {
    pub fn new(skills: &[String]) -> Result<Self> {
        Ok(Self {
            processor: TextProcessor::new(),
            extractor: SkillExtractor::new(skills)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.scoring.skills)
    }

    /// Keep the top `ceil(n * keep_ratio)` sentences (at least one).
    pub fn compress(&self, text: &str, keep_ratio: f64) -> CompressionResult {
        let sentences = self.processor.split_sentences(text);
        if sentences.is_empty() {
            return CompressionResult {
                text: text.trim().to_string(),
                compression: 0.0,
                kept_sentences: 0,
            };
        }

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for term in self.processor.terms(text) {
            if term.chars().count() >= MIN_FREQUENT_TERM_CHARS {
                *frequencies.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(usize, &str)> = sentences
            .iter()
            .map(|sentence| (self.sentence_score(sentence, &frequencies), sentence.as_str()))
            .collect();

        // Stable sort: equal scores keep document order
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let keep = keep_count(sentences.len(), keep_ratio);
        let compressed = ranked
            .iter()
            .take(keep)
            .map(|(_, sentence)| *sentence)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let original_chars = text.chars().count();
        let compression = round2(
            (1.0 - compressed.chars().count() as f64 / original_chars.max(1) as f64) * 100.0,
        );

        debug!(
            "ScaleDown kept {} of {} sentences ({:.2}% smaller)",
            keep,
            sentences.len(),
            compression
        );

        CompressionResult {
            text: compressed,
            compression,
            kept_sentences: keep,
        }
    }

    fn sentence_score(&self, sentence: &str, frequencies: &HashMap<String, usize>) -> usize {
        let terms = self.processor.terms(sentence);
        let frequency: usize = terms
            .iter()
            .map(|term| frequencies.get(term).copied().unwrap_or(0))
            .sum();
        let skill_hits = self.extractor.count_hits(sentence);

        frequency + SKILL_HIT_WEIGHT * skill_hits + terms.len().min(LENGTH_CREDIT_CAP)
    }

    /// Compress each posting independently; ids are 1-based input positions.
    pub fn compress_postings<S: AsRef<str>>(&self, postings: &[S], keep_ratio: f64) -> BulkCompression {
        let items: Vec<CompressedPosting> = postings
            .iter()
            .enumerate()
            .map(|(index, posting)| {
                let posting = posting.as_ref();
                let result = self.compress(posting, keep_ratio);
                CompressedPosting {
                    id: index + 1,
                    original_chars: posting.chars().count(),
                    compressed_chars: result.text.chars().count(),
                    compression: result.compression,
                    summary: result.text,
                }
            })
            .collect();

        let total: f64 = items.iter().map(|item| item.compression).sum();
        let avg_compression = round2(total / items.len().max(1) as f64);

        BulkCompression {
            count: items.len(),
            avg_compression,
            items,
        }
    }
}

/// `max(1, min(n, ceil(n * keep_ratio)))`
fn keep_count(sentences: usize, keep_ratio: f64) -> usize {
    let wanted = (sentences as f64 * keep_ratio).ceil();
    if wanted.is_nan() || wanted < 1.0 {
        return 1;
    }
    (wanted as usize).min(sentences).max(1)
}
