//! Application packet assembly, resume tailoring and negotiation tips

use crate::career::templates::cover_letter;
use crate::error::Result;
use crate::processing::ats_matcher::AtsScorer;
use serde::{Deserialize, Serialize};

pub const SKILLS_IN_PROGRESS_HEADING: &str = "Skills In Progress";
const PACKET_GAPS_TAILORED: usize = 4;
const PACKET_LIST_LIMIT: usize = 6;

const OPTIMIZATION_TIPS: [&str; 4] = [
    "Use role-specific keywords in experience bullets.",
    "Add measurable outcomes (%, $, time saved).",
    "Mirror language from the job description where accurate.",
    "Keep formatting ATS-safe: simple headings and no tables.",
];

const SUCCESS_STORIES: [&str; 3] = [
    "Candidate A tailored resume bullets and moved from 3% to 11% response rate in 5 weeks.",
    "Candidate B used ATS keyword optimization and secured 4 interviews from 32 applications.",
    "Candidate C used STAR interview prep and converted final rounds into 2 offers.",
];

const NEGOTIATION_TIPS: [&str; 3] = [
    "Share 2-3 quantified achievements before naming compensation.",
    "Give a range with a justified midpoint instead of a single number.",
    "Negotiate full package: title, base, bonus, equity, PTO, and learning budget.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPacket {
    pub company: String,
    pub role: String,
    pub ats_score: f64,
    pub matched_skills: Vec<String>,
    pub priority_gaps: Vec<String>,
    pub resume_draft: String,
    pub cover_letter: String,
}

/// Resume draft that lists the given gaps under a skills-in-progress heading.
/// With no gaps the resume is returned unchanged apart from trailing whitespace.
pub fn improve_resume(resume: &str, gaps: &[String]) -> String {
    let resume = resume.trim_end();
    if gaps.is_empty() {
        return resume.to_string();
    }

    let section = format!("{}: {}", SKILLS_IN_PROGRESS_HEADING, gaps.join(", "));
    if resume.is_empty() {
        section
    } else {
        format!("{}\n\n{}", resume, section)
    }
}

/// Everything needed to apply to one posting, from a single score.
pub fn personalized_application_packet(
    scorer: &AtsScorer,
    resume: &str,
    job: &str,
    company: &str,
    role: &str,
) -> Result<ApplicationPacket> {
    let result = scorer.score(resume, job);

    let gaps: Vec<String> = result.missing.iter().take(PACKET_GAPS_TAILORED).cloned().collect();
    let resume_draft = improve_resume(resume, &gaps);
    let cover_letter = cover_letter(&result, company, role)?;

    Ok(ApplicationPacket {
        company: company.to_string(),
        role: role.to_string(),
        ats_score: result.score,
        matched_skills: result.matched.iter().take(PACKET_LIST_LIMIT).cloned().collect(),
        priority_gaps: result.missing.iter().take(PACKET_LIST_LIMIT).cloned().collect(),
        resume_draft,
        cover_letter,
    })
}

/// One tip banded on the role title, then the general ones.
pub fn salary_negotiation_tips(role: &str) -> Vec<String> {
    let role_lower = role.to_lowercase();
    let band = if role_lower.contains("data") {
        "Use a target range based on data-role market medians and BI/ML premium."
    } else if role_lower.contains("software") || role_lower.contains("engineer") {
        "Anchor with total compensation: base, bonus, equity, and growth path."
    } else {
        "Use role-level benchmarks and focus on impact-adjusted compensation."
    };

    std::iter::once(band)
        .chain(NEGOTIATION_TIPS)
        .map(String::from)
        .collect()
}

pub fn optimization_tips() -> Vec<String> {
    OPTIMIZATION_TIPS.iter().map(|tip| tip.to_string()).collect()
}

/// Short outcomes from applicants who followed the packet workflow.
pub fn success_stories() -> Vec<String> {
    SUCCESS_STORIES.iter().map(|story| story.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_improve_resume() {
        let gaps = vec!["excel".to_string(), "tableau".to_string()];
        assert_eq!(
            improve_resume("Analyst with sql.\n", &gaps),
            "Analyst with sql.\n\nSkills In Progress: excel, tableau"
        );
        assert_eq!(improve_resume("Analyst with sql.  ", &[]), "Analyst with sql.");
        assert_eq!(improve_resume("", &gaps), "Skills In Progress: excel, tableau");
    }

    #[test]
    fn test_packet_contents() {
        let scorer = AtsScorer::lexical_only(&Config::default()).unwrap();
        let resume = "python sql testing communication 4 year experience projects";
        let job = "We need python, sql, excel, tableau, aws, docker and kubernetes skills.";

        let packet = personalized_application_packet(&scorer, resume, job, "Acme", "Data Analyst").unwrap();
        let result = scorer.score(resume, job);

        assert_eq!(packet.company, "Acme");
        assert_eq!(packet.ats_score, result.score);
        assert_eq!(packet.matched_skills, vec!["python", "sql"]);
        assert_eq!(packet.priority_gaps, vec!["excel", "tableau", "aws", "docker", "kubernetes"]);
        assert!(packet.resume_draft.ends_with("Skills In Progress: excel, tableau, aws, docker"));
        assert!(packet.cover_letter.contains("Acme"));
        assert!(packet.cover_letter.contains("Data Analyst"));
    }

    #[test]
    fn test_salary_tips_banding() {
        let data = salary_negotiation_tips("Senior Data Analyst");
        assert_eq!(data.len(), 4);
        assert!(data[0].contains("data-role"));

        let software = salary_negotiation_tips("Software Engineer");
        assert!(software[0].starts_with("Anchor with total compensation"));
        assert_eq!(software[1], NEGOTIATION_TIPS[0]);

        let other = salary_negotiation_tips("Nurse");
        assert!(other[0].starts_with("Use role-level benchmarks"));
    }

    #[test]
    fn test_optimization_tips() {
        assert_eq!(optimization_tips().len(), 4);
    }

    #[test]
    fn test_success_stories() {
        let stories = success_stories();
        assert_eq!(stories.len(), 3);
        assert!(stories[0].starts_with("Candidate A"));
        assert!(stories[1].contains("4 interviews from 32 applications"));
    }
}
