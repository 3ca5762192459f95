//! Plain-text templates: cover letters and STAR interview questions

use crate::error::Result;
use crate::processing::ats_matcher::MatchResult;
use askama::Template;
use serde::{Deserialize, Serialize};

/// Used when the resume matched none of the job's skills.
pub const DEFAULT_STRENGTHS: &str = "problem solving and execution";
pub const STAR_FRAMEWORK: &str = "Use STAR and quantify impact in each answer.";
pub const MAX_QUESTIONS: usize = 5;
const MAX_STRENGTHS: usize = 4;
const MAX_GAPS_NAMED: usize = 2;

/// Topic -> questions, in the order topics are offered.
const QUESTION_BANK: [(&str, &[&str]); 4] = [
    ("python", &["Explain decorators", "List vs tuple"]),
    ("sql", &["Join types", "Indexing"]),
    ("machine learning", &["Overfitting", "Bias variance"]),
    ("java", &["OOP pillars"]),
];

#[derive(Template)]
#[template(
    source = "Dear Hiring Manager at {{ company }},\n\nI am applying for the {{ role }} position. My background aligns with your needs in {{ strengths }}. I have delivered projects with measurable outcomes and cross-functional collaboration.\n\n{{ gap_line }}\n\nI would value the opportunity to discuss how I can contribute quickly and responsibly.\n\nSincerely,\nCandidate",
    ext = "txt"
)]
struct CoverLetterTemplate<'a> {
    company: &'a str,
    role: &'a str,
    strengths: String,
    gap_line: String,
}

#[derive(Template)]
#[template(
    source = "Q: {{ question }}\nUse STAR:\nSituation - context\nTask - objective\nAction - what you did\nResult - impact",
    ext = "txt"
)]
struct StarQuestionTemplate<'a> {
    question: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewPrep {
    pub questions: Vec<String>,
    pub framework: String,
}

/// Cover letter built from a score: strengths are the first matched
/// skills, and the first missing ones are acknowledged as in progress.
pub fn cover_letter(result: &MatchResult, company: &str, role: &str) -> Result<String> {
    let strengths = if result.matched.is_empty() {
        DEFAULT_STRENGTHS.to_string()
    } else {
        first_joined(&result.matched, MAX_STRENGTHS)
    };

    let gap_line = if result.missing.is_empty() {
        String::new()
    } else {
        format!(
            "I am actively deepening hands-on work in {} to match your environment.",
            first_joined(&result.missing, MAX_GAPS_NAMED)
        )
    };

    let letter = CoverLetterTemplate {
        company,
        role,
        strengths,
        gap_line,
    }
    .render()?;

    Ok(letter.trim().to_string())
}

fn first_joined(items: &[String], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn star_question(question: &str) -> Result<String> {
    Ok(StarQuestionTemplate { question }.render()?)
}

/// Questions for every topic the job description mentions, capped at five.
pub fn interview_questions(job: &str) -> Result<Vec<String>> {
    let job_lower = job.to_lowercase();

    QUESTION_BANK
        .iter()
        .filter(|(topic, _)| job_lower.contains(topic))
        .flat_map(|(_, questions)| questions.iter())
        .take(MAX_QUESTIONS)
        .map(|question| star_question(question))
        .collect()
}

pub fn interview_prep(job: &str) -> Result<InterviewPrep> {
    Ok(InterviewPrep {
        questions: interview_questions(job)?,
        framework: STAR_FRAMEWORK.to_string(),
    })
}
