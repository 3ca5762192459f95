//! Analysis engine: scores one resume against many postings and assembles reviews

use crate::career::packet::{improve_resume, optimization_tips};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::round2;
use crate::processing::ats_matcher::{AtsScorer, MatchResult};
use crate::processing::scaledown::{CompressionResult, ScaleDown};
use crate::processing::similarity::{LexicalSimilarity, SemanticSimilarity, SimilarityProvider};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const TOP_MATCHES: usize = 10;
const SKILLS_PER_MATCH: usize = 5;

/// Main analysis engine that coordinates scoring and summarization
pub struct AnalysisEngine {
    scorer: AtsScorer,
    scaledown: ScaleDown,
    summary_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingMatch {
    /// 1-based position in the input
    pub id: usize,
    pub score: f64,
    pub missing_top: Vec<String>,
    pub matched_top: Vec<String>,
    pub scaled_jd: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMatchReport {
    pub count: usize,
    pub avg_score: f64,
    pub max_score: f64,
    pub top_matches: Vec<PostingMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMatch {
    pub file: String,
    pub score: f64,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeReview {
    pub ats: MatchResult,
    pub improved_resume: String,
    pub scaled_jd: CompressionResult,
    pub optimization_tips: Vec<String>,
}

impl AnalysisEngine {
    pub fn new(config: &Config, semantic: Arc<dyn SimilarityProvider>) -> Result<Self> {
        Ok(Self {
            scorer: AtsScorer::new(config, semantic)?,
            scaledown: ScaleDown::from_config(config)?,
            summary_ratio: config.scaledown.keep_ratio,
        })
    }

    /// Engine backed by the configured dense model (or its lexical fallback)
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(SemanticSimilarity::from_config(config)))
    }

    pub fn lexical_only(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(LexicalSimilarity))
    }

    pub fn scorer(&self) -> &AtsScorer {
        &self.scorer
    }

    pub fn scaledown(&self) -> &ScaleDown {
        &self.scaledown
    }

    /// Score one resume against every posting and keep the best ten.
    pub fn job_match_bulk<S: AsRef<str>>(&self, resume: &str, postings: &[S]) -> BulkMatchReport {
        let start_time = Instant::now();

        let mut matches: Vec<PostingMatch> = postings
            .iter()
            .enumerate()
            .map(|(index, posting)| {
                let posting = posting.as_ref();
                let result = self.scorer.score(resume, posting);
                PostingMatch {
                    id: index + 1,
                    score: result.score,
                    missing_top: result.missing.into_iter().take(SKILLS_PER_MATCH).collect(),
                    matched_top: result.matched.into_iter().take(SKILLS_PER_MATCH).collect(),
                    scaled_jd: self.scaledown.compress(posting, self.summary_ratio).text,
                }
            })
            .collect();

        let total: f64 = matches.iter().map(|m| m.score).sum();
        let avg_score = round2(total / matches.len().max(1) as f64);
        let max_score = matches.iter().map(|m| m.score).fold(0.0, f64::max);

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(TOP_MATCHES);

        info!(
            "Matched resume against {} postings in {:.2?}",
            postings.len(),
            start_time.elapsed()
        );

        BulkMatchReport {
            count: postings.len(),
            avg_score,
            max_score,
            top_matches: matches,
        }
    }

    /// Score named documents, best first.
    pub fn match_corpus(&self, resume: &str, documents: &[(String, String)]) -> Vec<CorpusMatch> {
        let mut matches: Vec<CorpusMatch> = documents
            .iter()
            .map(|(file, text)| {
                let result = self.scorer.score(resume, text);
                CorpusMatch {
                    file: file.clone(),
                    score: result.score,
                    missing: result.missing,
                }
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    pub fn resume_review(&self, resume: &str, job: &str) -> ResumeReview {
        let ats = self.scorer.score(resume, job);
        let improved_resume = improve_resume(resume, &ats.missing);
        let scaled_jd = self.scaledown.compress(job, self.summary_ratio);

        ResumeReview {
            ats,
            improved_resume,
            scaled_jd,
            optimization_tips: optimization_tips(),
        }
    }
}
