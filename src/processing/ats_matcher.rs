//! ATS (Applicant Tracking System) scoring of a resume against a job description
//!
//! The score blends five weighted signals (semantic similarity, TF-IDF
//! keyword similarity, skill coverage, experience and resume structure),
//! then applies a keyword-stuffing penalty and a domain bonus:
//!
//! ```text
//! base  = w.semantic*similarity + w.keyword*lexical + w.skill*skill_ratio
//!       + w.experience*experience_factor + w.section*section_ratio
//! score = round(min(base * penalty * bonus * 100, 99), 2)
//! ```

use crate::config::{Config, DomainTerms, Weights};
use crate::error::{JobFitError, Result};
use crate::metrics::round2;
use crate::processing::similarity::{LexicalSimilarity, SemanticSimilarity, SimilarityProvider};
use crate::processing::skills::SkillExtractor;
use crate::processing::text_processor::TextProcessor;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Experience stops earning credit after this many years.
pub const EXPERIENCE_SATURATION_YEARS: f64 = 5.0;
/// A resume token repeated more often than this is treated as keyword stuffing.
pub const STUFFING_REPEAT_LIMIT: usize = 15;
pub const STUFFING_PENALTY: f64 = 0.9;
pub const DOMAIN_BONUS_PER_SKILL: f64 = 0.05;
/// A perfect match is never reported.
pub const MAX_SCORE: f64 = 99.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0 to 99, two decimal places
    pub score: f64,
    /// Job description skills absent from the resume
    pub missing: Vec<String>,
    /// Skills present in both
    pub matched: Vec<String>,
}

impl MatchResult {
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            missing: Vec::new(),
            matched: Vec::new(),
        }
    }
}

/// Every intermediate term of a score, for reporting and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub similarity: f64,
    pub similarity_provider: String,
    pub lexical: f64,
    pub skill_ratio: f64,
    pub years: u32,
    pub experience_factor: f64,
    pub section_ratio: f64,
    pub base: f64,
    pub max_repetition: usize,
    pub penalty: f64,
    pub domain: Option<String>,
    pub domain_overlap: usize,
    pub bonus: f64,
    pub result: MatchResult,
}

impl ScoreBreakdown {
    /// Breakdown reported when scoring failed: every term zero, no penalty or bonus.
    pub fn zero(similarity_provider: &str) -> Self {
        Self {
            similarity: 0.0,
            similarity_provider: similarity_provider.to_string(),
            lexical: 0.0,
            skill_ratio: 0.0,
            years: 0,
            experience_factor: 0.0,
            section_ratio: 0.0,
            base: 0.0,
            max_repetition: 0,
            penalty: 1.0,
            domain: None,
            domain_overlap: 0,
            bonus: 1.0,
            result: MatchResult::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DomainBonus {
    domain: Option<String>,
    overlap: usize,
    multiplier: f64,
}

pub struct AtsScorer {
    extractor: SkillExtractor,
    processor: TextProcessor,
    semantic: Arc<dyn SimilarityProvider>,
    lexical: LexicalSimilarity,
    weights: Weights,
    domains: Vec<DomainTerms>,
}

impl AtsScorer {
    /// Build a matcher whose semantic term comes from `semantic`.
    pub fn new(config: &Config, semantic: Arc<dyn SimilarityProvider>) -> Result<Self> {
        let extractor = SkillExtractor::new(&config.scoring.skills)?;

        let domains = config
            .scoring
            .domains
            .iter()
            .map(|domain| {
                let mut terms: Vec<String> = Vec::new();
                for term in &domain.terms {
                    let term = term.trim().to_lowercase();
                    if !term.is_empty() && !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                DomainTerms {
                    name: domain.name.clone(),
                    terms,
                }
            })
            .collect();

        Ok(Self {
            extractor,
            processor: TextProcessor::new(),
            semantic,
            lexical: LexicalSimilarity,
            weights: config.scoring.weights,
            domains,
        })
    }

    /// Matcher using the configured dense model, falling back to TF-IDF.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(SemanticSimilarity::from_config(config)))
    }

    /// Matcher that never attempts to load an embedding model.
    pub fn lexical_only(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(LexicalSimilarity))
    }

    /// Score a resume against a job description. Never fails: internal
    /// errors are logged and reported as a zero result.
    pub fn score(&self, resume: &str, job: &str) -> MatchResult {
        self.breakdown(resume, job).result
    }

    /// [`explain`](Self::explain) behind the same zero-result boundary as `score`.
    pub fn breakdown(&self, resume: &str, job: &str) -> ScoreBreakdown {
        match self.explain(resume, job) {
            Ok(breakdown) => breakdown,
            Err(e) => {
                error!("ATS scoring failed, reporting zero score: {}", e);
                ScoreBreakdown::zero(self.provider_name())
            }
        }
    }

    /// Full score computation with every intermediate term.
    pub fn explain(&self, resume: &str, job: &str) -> Result<ScoreBreakdown> {
        let resume_skills = self.extractor.extract(resume);
        let job_skills = self.extractor.extract(job);

        let (matched, missing): (Vec<String>, Vec<String>) = job_skills
            .iter()
            .cloned()
            .partition(|skill| resume_skills.contains(skill));

        let skill_ratio = matched.len() as f64 / job_skills.len().max(1) as f64;

        let years = self.processor.years_of_experience(resume);
        let experience_factor = (f64::from(years) / EXPERIENCE_SATURATION_YEARS).min(1.0);
        let section_ratio = self.processor.section_ratio(resume);

        let similarity = self.semantic.similarity(resume, job)?;
        // Always computed on its own, whichever provider served `similarity`
        let lexical = self.lexical.similarity(resume, job)?;

        let w = &self.weights;
        let base = w.semantic * similarity
            + w.keyword * lexical
            + w.skill * skill_ratio
            + w.experience * experience_factor
            + w.section * section_ratio;

        let max_repetition = self.processor.max_token_repetition(resume);
        let penalty = if max_repetition > STUFFING_REPEAT_LIMIT {
            STUFFING_PENALTY
        } else {
            1.0
        };

        let bonus = self.domain_bonus(job, &matched);

        let raw = base * penalty * bonus.multiplier * 100.0;
        if !raw.is_finite() {
            return Err(JobFitError::Processing(format!(
                "score is not finite (base {}, penalty {}, bonus {})",
                base, penalty, bonus.multiplier
            )));
        }
        let score = round2(raw.min(MAX_SCORE).max(0.0));

        debug!(
            "ATS score {:.2}: similarity={:.3} lexical={:.3} skills={:.3} experience={:.3} sections={:.3} penalty={} bonus={}",
            score, similarity, lexical, skill_ratio, experience_factor, section_ratio, penalty, bonus.multiplier
        );

        Ok(ScoreBreakdown {
            similarity,
            similarity_provider: self.semantic.name().to_string(),
            lexical,
            skill_ratio,
            years,
            experience_factor,
            section_ratio,
            base,
            max_repetition,
            penalty,
            domain: bonus.domain,
            domain_overlap: bonus.overlap,
            bonus: bonus.multiplier,
            result: MatchResult {
                score,
                missing,
                matched,
            },
        })
    }

    /// The first domain (in declaration order) mentioned by the job
    /// description decides the bonus, even if a later one would pay more.
    fn domain_bonus(&self, job: &str, matched: &[String]) -> DomainBonus {
        let job_lower = job.to_lowercase();

        for domain in &self.domains {
            if domain.terms.iter().any(|term| job_lower.contains(term.as_str())) {
                let overlap = domain
                    .terms
                    .iter()
                    .filter(|term| matched.contains(term))
                    .count();
                return DomainBonus {
                    domain: Some(domain.name.clone()),
                    overlap,
                    multiplier: 1.0 + DOMAIN_BONUS_PER_SKILL * overlap as f64,
                };
            }
        }

        DomainBonus {
            domain: None,
            overlap: 0,
            multiplier: 1.0,
        }
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn provider_name(&self) -> &str {
        self.semantic.name()
    }

    pub fn skill_count(&self) -> usize {
        self.extractor.skill_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::ModelLoad;
    use crate::processing::similarity::test_support::{BrokenEncoder, LetterEncoder};
    use crate::processing::tfidf::lexical_similarity;

    fn matcher() -> AtsScorer {
        AtsScorer::lexical_only(&Config::default()).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let result = matcher().score("python sql 3 year experience project", "need python sql excel");

        assert!(result.matched.contains(&"python".to_string()));
        assert!(result.matched.contains(&"sql".to_string()));
        assert!(result.missing.contains(&"excel".to_string()));
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_reference_scenario_exact_value() {
        let resume = "python sql 3 year experience project";
        let job = "need python sql excel";
        let breakdown = matcher().explain(resume, job).unwrap();

        let lexical = lexical_similarity(resume, job);
        let w = Weights::default();
        let base = w.semantic * lexical
            + w.keyword * lexical
            + w.skill * (2.0 / 3.0)
            + w.experience * 0.6
            + w.section * 0.5;
        // "data" is the first domain mentioned and shares "sql" with the matched skills
        let expected = round2(base * 1.05 * 100.0);

        assert_eq!(breakdown.domain.as_deref(), Some("data"));
        assert_eq!(breakdown.domain_overlap, 1);
        assert_eq!(breakdown.penalty, 1.0);
        assert_eq!(breakdown.result.score, expected);
    }

    #[test]
    fn test_missing_and_matched_are_disjoint() {
        let resume = "Java and javascript developer with docker, 4 years experience";
        let job = "Looking for java, kubernetes, docker and aws skills";
        let matcher = matcher();
        let result = matcher.score(resume, job);

        for skill in &result.missing {
            assert!(!result.matched.contains(skill));
        }
        assert!(result.matched.contains(&"docker".to_string()));
        assert!(result.missing.contains(&"kubernetes".to_string()));

        let extractor = matcher.extractor();
        let mut known = extractor.extract(job);
        known.extend(extractor.extract(resume));
        for skill in result.missing.iter().chain(&result.matched) {
            assert!(known.contains(skill), "{} was not extracted from either text", skill);
        }
    }

    #[test]
    fn test_empty_inputs_are_bounded() {
        let matcher = matcher();
        for (resume, job) in [("", "need python sql"), ("python developer", ""), ("", "")] {
            let result = matcher.score(resume, job);
            assert!(result.score.is_finite());
            assert!((0.0..=MAX_SCORE).contains(&result.score));
        }
        assert_eq!(matcher.score("", "").score, 0.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let matcher = matcher();
        let resume = "Python engineer, 6 years experience. Education: BSc. Skills: sql, aws.";
        let job = "Python and SQL on AWS cloud";
        assert_eq!(matcher.score(resume, job), matcher.score(resume, job));
    }

    #[test]
    fn test_stuffing_penalty_threshold() {
        let matcher = matcher();
        let job = "python developer";
        let fifteen = format!("{} experience", "python ".repeat(15));
        let sixteen = format!("{} experience", "python ".repeat(16));

        assert_eq!(matcher.explain(&fifteen, job).unwrap().penalty, 1.0);
        assert_eq!(matcher.explain(&sixteen, job).unwrap().penalty, STUFFING_PENALTY);
    }

    #[test]
    fn test_stuffed_resume_never_scores_higher() {
        let matcher = matcher();
        let job = "python sql developer";
        let clean = format!("python sql developer {}", "lorem ".repeat(15));
        let stuffed = format!("python sql developer {}", "lorem ".repeat(16));

        assert!(matcher.score(&stuffed, job).score <= matcher.score(&clean, job).score);
    }

    #[test]
    fn test_experience_saturates_at_five_years() {
        let matcher = matcher();
        let five = matcher.explain("5 years python", "python").unwrap();
        let ten = matcher.explain("10 years python", "python").unwrap();
        let two = matcher.explain("2 years python", "python").unwrap();

        assert_eq!(five.experience_factor, 1.0);
        assert_eq!(ten.experience_factor, five.experience_factor);
        assert!((two.experience_factor - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_score_capped_at_99() {
        let mut config = Config::default();
        config.scoring.weights = Weights {
            semantic: 1.0,
            keyword: 1.0,
            skill: 1.0,
            experience: 1.0,
            section: 1.0,
        };
        let matcher = AtsScorer::lexical_only(&config).unwrap();
        let text = "python sql excel 8 years experience education skills projects";

        assert_eq!(matcher.score(text, text).score, MAX_SCORE);
    }

    #[test]
    fn test_first_domain_wins_over_best_domain() {
        let mut config = Config::default();
        config.scoring.domains = vec![
            DomainTerms {
                name: "spreadsheets".to_string(),
                terms: vec!["excel".to_string()],
            },
            DomainTerms {
                name: "engineering".to_string(),
                terms: vec!["python".to_string(), "sql".to_string()],
            },
        ];
        let matcher = AtsScorer::lexical_only(&config).unwrap();

        let breakdown = matcher.explain("python sql", "python sql excel").unwrap();

        assert_eq!(breakdown.domain.as_deref(), Some("spreadsheets"));
        assert_eq!(breakdown.domain_overlap, 0);
        assert_eq!(breakdown.bonus, 1.0);
    }

    #[test]
    fn test_no_domain_means_no_bonus() {
        let breakdown = matcher().explain("baker", "artisan bread baker").unwrap();
        assert_eq!(breakdown.domain, None);
        assert_eq!(breakdown.bonus, 1.0);
    }

    #[test]
    fn test_dense_provider_feeds_semantic_term_only() {
        let config = Config::default();
        let semantic = Arc::new(SemanticSimilarity::with_load(ModelLoad::Loaded(Box::new(LetterEncoder))));
        let matcher = AtsScorer::new(&config, semantic).unwrap();

        let breakdown = matcher.explain("listen", "silent").unwrap();

        assert_eq!(breakdown.similarity_provider, "letter-test-encoder");
        assert!((breakdown.similarity - 1.0).abs() < 1e-6);
        assert_eq!(breakdown.lexical, 0.0);
    }

    #[test]
    fn test_provider_failure_degrades_to_zero_result() {
        let config = Config::default();
        let semantic = Arc::new(SemanticSimilarity::with_load(ModelLoad::Loaded(Box::new(BrokenEncoder))));
        let matcher = AtsScorer::new(&config, semantic).unwrap();

        // Lengths 1 and 2 give embeddings of different dimensions
        assert!(matcher.explain("python", "sql").is_err());
        assert_eq!(matcher.score("python", "sql"), MatchResult::zero());
    }

    #[test]
    fn test_breakdown_of_failed_score_is_zero() {
        let config = Config::default();
        let semantic = Arc::new(SemanticSimilarity::with_load(ModelLoad::Loaded(Box::new(BrokenEncoder))));
        let matcher = AtsScorer::new(&config, semantic).unwrap();

        let breakdown = matcher.breakdown("python developer", "sql");

        assert_eq!(breakdown.result, MatchResult::zero());
        assert_eq!(breakdown.similarity_provider, matcher.provider_name());
        assert_eq!(breakdown.penalty, 1.0);
        assert_eq!(breakdown.bonus, 1.0);
        assert!(breakdown.domain.is_none());
    }

    #[test]
    fn test_breakdown_matches_explain_on_success() {
        let matcher = matcher();
        let resume = "python sql 3 year experience project";
        let job = "need python sql excel";

        let breakdown = matcher.breakdown(resume, job);
        assert_eq!(breakdown.result, matcher.explain(resume, job).unwrap().result);
        assert!(breakdown.result.score > 0.0);
    }
}
