//! Job-board search links seeded from a job description's skills

use crate::processing::skills::SkillExtractor;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "software engineer";
pub const DEFAULT_LOCATION: &str = "United States";
const MAX_QUERY_SKILLS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobBoardLinks {
    pub query: String,
    pub indeed: String,
    pub linkedin: String,
}

pub fn job_board_links(extractor: &SkillExtractor, job: &str, location: &str) -> JobBoardLinks {
    let skills = extractor.extract(job);
    let query = if skills.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        skills
            .iter()
            .take(MAX_QUERY_SKILLS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let q = form_encode(&query);
    let loc = form_encode(location);

    JobBoardLinks {
        indeed: format!("https://www.indeed.com/jobs?q={}&l={}", q, loc),
        linkedin: format!(
            "https://www.linkedin.com/jobs/search/?keywords={}&location={}",
            q, loc
        ),
        query,
    }
}

/// Query-string encoding with spaces as `+`.
fn form_encode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn extractor() -> SkillExtractor {
        SkillExtractor::new(&Config::default().scoring.skills).unwrap()
    }

    #[test]
    fn test_links_from_job_skills() {
        let links = job_board_links(&extractor(), "python sql tableau communication", DEFAULT_LOCATION);

        assert_eq!(links.query, "python sql tableau communication");
        assert_eq!(
            links.indeed,
            "https://www.indeed.com/jobs?q=python+sql+tableau+communication&l=United+States"
        );
        assert_eq!(
            links.linkedin,
            "https://www.linkedin.com/jobs/search/?keywords=python+sql+tableau+communication&location=United+States"
        );
    }

    #[test]
    fn test_query_capped_at_six_skills() {
        let job = "python sql excel tableau statistics pandas numpy docker";
        let links = job_board_links(&extractor(), job, "Berlin");
        assert_eq!(links.query, "python sql excel tableau statistics pandas");
        assert!(links.indeed.ends_with("&l=Berlin"));
    }

    #[test]
    fn test_default_query_and_reserved_characters() {
        let links = job_board_links(&extractor(), "Pastry chef", "São Paulo, BR");
        assert_eq!(links.query, DEFAULT_QUERY);
        assert!(links.indeed.contains("q=software+engineer"));
        assert!(links.indeed.ends_with("&l=S%C3%A3o+Paulo%2C+BR"));

        let symbols = job_board_links(&extractor(), "C++ and C# work", DEFAULT_LOCATION);
        assert!(symbols.indeed.contains("q=c%2B%2B+c%23"));
    }
}
