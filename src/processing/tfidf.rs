//! TF-IDF vectorization and lexical cosine similarity
//!
//! Mirrors the conventional defaults: lower-casing, tokens of two or more
//! word characters, smoothed idf `ln((1 + n) / (1 + df)) + 1`, raw term
//! counts and L2-normalised rows.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"))
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Learn vocabulary and idf weights from a corpus.
    pub fn fit(documents: &[&str]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for document in documents {
            let mut seen: Vec<String> = tokenize(document);
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self { vocabulary, idf }
    }

    /// L2-normalised tf-idf row for a document; terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row = vec![0.0; self.vocabulary.len()];
        for (index, count) in counts {
            row[index] = count * self.idf[index];
        }

        let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut row {
                *value /= norm;
            }
        }
        row
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Cosine similarity of two vectors, 0.0 when either is all zeros.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// TF-IDF cosine of two texts, fit on the pair itself. An empty vocabulary gives 0.0.
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    let vectorizer = TfIdfVectorizer::fit(&[a, b]);
    if vectorizer.is_empty() {
        return 0.0;
    }

    cosine(&vectorizer.transform(a), &vectorizer.transform(b))
}
