//! Skill vocabulary matching
//!
//! Skills are matched as case-insensitive substrings, not whole words, so
//! "java" is also found inside "javascript". Score calibration depends on
//! this behaviour.

use crate::error::{JobFitError, Result};
use aho_corasick::{AhoCorasick, MatchKind};

pub struct SkillExtractor {
    matcher: AhoCorasick,
    vocabulary: Vec<String>,
}

impl SkillExtractor {
    /// Build an extractor over an ordered vocabulary. Duplicates are dropped, first occurrence wins.
    pub fn new(skills: &[String]) -> Result<Self> {
        let mut vocabulary: Vec<String> = Vec::with_capacity(skills.len());
        for skill in skills {
            let skill = skill.trim().to_lowercase();
            if !skill.is_empty() && !vocabulary.contains(&skill) {
                vocabulary.push(skill);
            }
        }

        // Standard semantics so overlapping hits ("java" inside "javascript") are all reported
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&vocabulary)
            .map_err(|e| JobFitError::Processing(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self { matcher, vocabulary })
    }

    /// Vocabulary skills occurring anywhere in the text, in vocabulary order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut found = vec![false; self.vocabulary.len()];

        for mat in self.matcher.find_overlapping_iter(&lowered) {
            found[mat.pattern().as_usize()] = true;
        }

        self.vocabulary
            .iter()
            .zip(found)
            .filter_map(|(skill, hit)| hit.then(|| skill.clone()))
            .collect()
    }

    /// Number of vocabulary skills present in the text.
    pub fn count_hits(&self, text: &str) -> usize {
        self.extract(text).len()
    }

    pub fn skill_count(&self) -> usize {
        self.vocabulary.len()
    }
}
