//! Output formatters: colored console, JSON and Markdown

use crate::career::links::JobBoardLinks;
use crate::career::packet::ApplicationPacket;
use crate::career::templates::InterviewPrep;
use crate::career::tracker::{ApplicationRecord, ConversionReport};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::analyzer::{BulkMatchReport, CorpusMatch, ResumeReview};
use crate::processing::ats_matcher::{ScoreBreakdown, MatchResult};
use crate::processing::scaledown::{BulkCompression, CompressionResult};
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

/// Anything a command can print.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Score(&'a ScoreBreakdown),
    Compression(&'a CompressionResult),
    BulkCompression(&'a BulkCompression),
    BulkMatch(&'a BulkMatchReport),
    Corpus(&'a [CorpusMatch]),
    Review(&'a ResumeReview),
    Packet(&'a ApplicationPacket),
    Applications(&'a [ApplicationRecord]),
    Conversion(&'a ConversionReport),
    Links(&'a JobBoardLinks),
    Interview(&'a InterviewPrep),
    Tips(&'a [String]),
    Letter(&'a str),
}

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn score_label(score: f64) -> (&'static str, Color) {
    match score {
        s if s >= 90.0 => ("EXCELLENT", Color::Green),
        s if s >= 80.0 => ("VERY GOOD", Color::BrightGreen),
        s if s >= 70.0 => ("GOOD", Color::Yellow),
        s if s >= 60.0 => ("FAIR", Color::BrightYellow),
        s if s >= 50.0 => ("BELOW AVG", Color::Red),
        _ => ("POOR", Color::BrightRed),
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = score_label(score);
        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_match(&self, result: &MatchResult) -> String {
        format!(
            "ATS Score: {:.2} {}\nMatched: {}\nMissing: {}\n",
            result.score,
            self.format_score_badge(result.score),
            self.colorize(&list_or_none(&result.matched), Color::Green),
            self.colorize(&list_or_none(&result.missing), Color::Red),
        )
    }

    fn format_score(&self, breakdown: &ScoreBreakdown) -> String {
        let mut output = self.format_header("ATS MATCH", 1);
        output.push_str(&self.format_match(&breakdown.result));

        if self.detailed {
            output.push_str(&self.format_header("Score Breakdown", 3));
            output.push_str(&format!(
                "Similarity ({}): {:.3}\n",
                breakdown.similarity_provider, breakdown.similarity
            ));
            output.push_str(&format!("Keyword (TF-IDF): {:.3}\n", breakdown.lexical));
            output.push_str(&format!("Skill coverage: {:.3}\n", breakdown.skill_ratio));
            output.push_str(&format!(
                "Experience: {} years -> {:.2}\n",
                breakdown.years, breakdown.experience_factor
            ));
            output.push_str(&format!("Sections: {:.2}\n", breakdown.section_ratio));
            output.push_str(&format!("Base: {:.4}\n", breakdown.base));
            output.push_str(&format!(
                "Stuffing penalty: x{} (max repetition {})\n",
                breakdown.penalty, breakdown.max_repetition
            ));
            output.push_str(&format!(
                "Domain bonus: x{:.2} ({})\n",
                breakdown.bonus,
                breakdown.domain.as_deref().unwrap_or("no domain")
            ));
        }
        output
    }

    fn format_compression(&self, result: &CompressionResult) -> String {
        let mut output = self.format_header("SCALEDOWN SUMMARY", 1);
        output.push_str(&format!(
            "Kept {} sentences, {:.2}% smaller\n\n{}\n",
            result.kept_sentences,
            result.compression,
            result.text
        ));
        output
    }

    fn format_bulk_compression(&self, bulk: &BulkCompression) -> String {
        let mut output = self.format_header("SCALEDOWN POSTINGS", 1);
        output.push_str(&format!(
            "{} postings, average compression {:.2}%\n",
            bulk.count, bulk.avg_compression
        ));
        for item in &bulk.items {
            output.push_str(&self.format_header(&format!("Posting {}", item.id), 3));
            output.push_str(&format!(
                "{} -> {} chars ({:.2}%)\n{}\n",
                item.original_chars, item.compressed_chars, item.compression, item.summary
            ));
        }
        output
    }

    fn format_bulk_match(&self, report: &BulkMatchReport) -> String {
        let mut output = self.format_header("BULK JOB MATCH", 1);
        output.push_str(&format!(
            "{} postings | average {:.2} | best {:.2}\n",
            report.count, report.avg_score, report.max_score
        ));
        for (rank, m) in report.top_matches.iter().enumerate() {
            output.push_str(&format!(
                "\n{}. Posting {} {:.2} {}\n",
                rank + 1,
                m.id,
                m.score,
                self.format_score_badge(m.score)
            ));
            output.push_str(&format!(
                "   Matched: {}\n   Missing: {}\n",
                self.colorize(&list_or_none(&m.matched_top), Color::Green),
                self.colorize(&list_or_none(&m.missing_top), Color::Red)
            ));
            if self.detailed {
                output.push_str(&format!("   Summary: {}\n", m.scaled_jd));
            }
        }
        output
    }

    fn format_corpus(&self, matches: &[CorpusMatch]) -> String {
        let mut output = self.format_header("CORPUS MATCH", 1);
        for m in matches {
            output.push_str(&format!(
                "{:>6.2} {} {}  missing: {}\n",
                m.score,
                self.format_score_badge(m.score),
                m.file,
                list_or_none(&m.missing)
            ));
        }
        output
    }

    fn format_review(&self, review: &ResumeReview) -> String {
        let mut output = self.format_header("RESUME REVIEW", 1);
        output.push_str(&self.format_match(&review.ats));
        output.push_str(&self.format_header("Job Description Summary", 2));
        output.push_str(&format!("{}\n", review.scaled_jd.text));
        output.push_str(&self.format_header("Tailored Resume Draft", 2));
        output.push_str(&format!("{}\n", review.improved_resume));
        output.push_str(&self.format_header("Optimization Tips", 2));
        for tip in &review.optimization_tips {
            output.push_str(&format!("• {}\n", tip));
        }
        output
    }

    fn format_packet(&self, packet: &ApplicationPacket) -> String {
        let mut output = self.format_header(
            &format!("APPLICATION PACKET: {} at {}", packet.role, packet.company),
            1,
        );
        output.push_str(&format!(
            "ATS Score: {:.2} {}\n",
            packet.ats_score,
            self.format_score_badge(packet.ats_score)
        ));
        output.push_str(&format!(
            "Matched skills: {}\nPriority gaps: {}\n",
            self.colorize(&list_or_none(&packet.matched_skills), Color::Green),
            self.colorize(&list_or_none(&packet.priority_gaps), Color::Red)
        ));
        output.push_str(&self.format_header("Resume Draft", 2));
        output.push_str(&format!("{}\n", packet.resume_draft));
        output.push_str(&self.format_header("Cover Letter", 2));
        output.push_str(&format!("{}\n", packet.cover_letter));
        output
    }

    fn format_applications(&self, records: &[ApplicationRecord]) -> String {
        let mut output = self.format_header("TRACKED APPLICATIONS", 1);
        if records.is_empty() {
            output.push_str("No applications tracked yet.\n");
        }
        for record in records {
            let color = if record.status.reached_interview() {
                Color::Green
            } else {
                Color::White
            };
            output.push_str(&format!(
                "{}  {:<10} {} - {}\n",
                record.date,
                self.colorize(record.status.as_str(), color),
                record.company,
                record.role
            ));
        }
        output
    }

    fn format_conversion(&self, report: &ConversionReport) -> String {
        let mut output = self.format_header("INTERVIEW CONVERSION", 1);
        output.push_str(&format!(
            "Current rate: {:.2}%\nTarget lift: {:.2}%\nProjected rate: {:.2}%\nGain: {:.2} points\n",
            report.current_rate,
            report.target_lift_percent,
            report.projected_rate,
            report.absolute_gain_points
        ));
        output
    }

    fn format_links(&self, links: &JobBoardLinks) -> String {
        let mut output = self.format_header("JOB BOARD SEARCH", 1);
        output.push_str(&format!(
            "Query: {}\nIndeed: {}\nLinkedIn: {}\n",
            links.query,
            self.colorize(&links.indeed, Color::Cyan),
            self.colorize(&links.linkedin, Color::Cyan)
        ));
        output
    }

    fn format_interview(&self, prep: &InterviewPrep) -> String {
        let mut output = self.format_header("INTERVIEW PREP", 1);
        if prep.questions.is_empty() {
            output.push_str("No topic-specific questions for this job description.\n");
        }
        for question in &prep.questions {
            output.push_str(&format!("\n{}\n", question));
        }
        output.push_str(&format!("\n{}\n", self.colorize(&prep.framework, Color::Cyan)));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let output = match report {
            Report::Score(breakdown) => self.format_score(breakdown),
            Report::Compression(result) => self.format_compression(result),
            Report::BulkCompression(bulk) => self.format_bulk_compression(bulk),
            Report::BulkMatch(bulk) => self.format_bulk_match(bulk),
            Report::Corpus(matches) => self.format_corpus(matches),
            Report::Review(review) => self.format_review(review),
            Report::Packet(packet) => self.format_packet(packet),
            Report::Applications(records) => self.format_applications(records),
            Report::Conversion(report) => self.format_conversion(report),
            Report::Links(links) => self.format_links(links),
            Report::Interview(prep) => self.format_interview(prep),
            Report::Tips(tips) => tips
                .iter()
                .enumerate()
                .map(|(i, tip)| format!("{}. {}\n", i + 1, tip))
                .collect(),
            Report::Letter(text) => format!("{}\n", text),
        };
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn bullet_list(items: &[String]) -> String {
        if items.is_empty() {
            return "- _none_\n".to_string();
        }
        items.iter().map(|item| format!("- {}\n", item)).collect()
    }

    fn match_section(result: &MatchResult) -> String {
        format!(
            "**ATS Score:** {:.2} ({})\n\n### Matched Skills\n\n{}\n### Missing Skills\n\n{}",
            result.score,
            score_label(result.score).0,
            Self::bullet_list(&result.matched),
            Self::bullet_list(&result.missing)
        )
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let output = match report {
            Report::Score(breakdown) => {
                let mut md = format!("# ATS Match\n\n{}", Self::match_section(&breakdown.result));
                md.push_str("\n## Breakdown\n\n| Component | Value |\n|---|---|\n");
                md.push_str(&format!(
                    "| Similarity ({}) | {:.3} |\n",
                    breakdown.similarity_provider, breakdown.similarity
                ));
                md.push_str(&format!("| Keyword | {:.3} |\n", breakdown.lexical));
                md.push_str(&format!("| Skill coverage | {:.3} |\n", breakdown.skill_ratio));
                md.push_str(&format!("| Experience | {:.2} |\n", breakdown.experience_factor));
                md.push_str(&format!("| Sections | {:.2} |\n", breakdown.section_ratio));
                md.push_str(&format!("| Penalty | {} |\n", breakdown.penalty));
                md.push_str(&format!("| Domain bonus | {:.2} |\n", breakdown.bonus));
                md
            }
            Report::Compression(result) => format!(
                "# ScaleDown Summary\n\n_{} sentences kept, {:.2}% smaller_\n\n{}\n",
                result.kept_sentences, result.compression, result.text
            ),
            Report::BulkCompression(bulk) => {
                let mut md = format!(
                    "# ScaleDown Postings\n\n{} postings, average compression {:.2}%\n",
                    bulk.count, bulk.avg_compression
                );
                for item in &bulk.items {
                    md.push_str(&format!(
                        "\n## Posting {} ({:.2}%)\n\n{}\n",
                        item.id, item.compression, item.summary
                    ));
                }
                md
            }
            Report::BulkMatch(bulk) => {
                let mut md = format!(
                    "# Bulk Job Match\n\n{} postings, average {:.2}, best {:.2}\n\n| Rank | Posting | Score | Missing |\n|---|---|---|---|\n",
                    bulk.count, bulk.avg_score, bulk.max_score
                );
                for (rank, m) in bulk.top_matches.iter().enumerate() {
                    md.push_str(&format!(
                        "| {} | {} | {:.2} | {} |\n",
                        rank + 1,
                        m.id,
                        m.score,
                        list_or_none(&m.missing_top)
                    ));
                }
                md
            }
            Report::Corpus(matches) => {
                let mut md = "# Corpus Match\n\n| File | Score | Missing |\n|---|---|---|\n".to_string();
                for m in *matches {
                    md.push_str(&format!(
                        "| {} | {:.2} | {} |\n",
                        m.file,
                        m.score,
                        list_or_none(&m.missing)
                    ));
                }
                md
            }
            Report::Review(review) => format!(
                "# Resume Review\n\n{}\n## Job Description Summary\n\n{}\n\n## Tailored Resume Draft\n\n{}\n\n## Optimization Tips\n\n{}",
                Self::match_section(&review.ats),
                review.scaled_jd.text,
                review.improved_resume,
                Self::bullet_list(&review.optimization_tips)
            ),
            Report::Packet(packet) => format!(
                "# Application Packet: {} at {}\n\n**ATS Score:** {:.2}\n\n## Matched Skills\n\n{}\n## Priority Gaps\n\n{}\n## Resume Draft\n\n{}\n\n## Cover Letter\n\n{}\n",
                packet.role,
                packet.company,
                packet.ats_score,
                Self::bullet_list(&packet.matched_skills),
                Self::bullet_list(&packet.priority_gaps),
                packet.resume_draft,
                packet.cover_letter
            ),
            Report::Applications(records) => {
                let mut md = "# Applications\n\n| Date | Company | Role | Status |\n|---|---|---|---|\n".to_string();
                for r in *records {
                    md.push_str(&format!("| {} | {} | {} | {} |\n", r.date, r.company, r.role, r.status));
                }
                md
            }
            Report::Conversion(report) => format!(
                "# Interview Conversion\n\n- Current rate: {:.2}%\n- Target lift: {:.2}%\n- Projected rate: {:.2}%\n- Gain: {:.2} points\n",
                report.current_rate,
                report.target_lift_percent,
                report.projected_rate,
                report.absolute_gain_points
            ),
            Report::Links(links) => format!(
                "# Job Board Search\n\nQuery: `{}`\n\n- [Indeed]({})\n- [LinkedIn]({})\n",
                links.query, links.indeed, links.linkedin
            ),
            Report::Interview(prep) => {
                let mut md = "# Interview Prep\n".to_string();
                for question in &prep.questions {
                    md.push_str(&format!("\n```\n{}\n```\n", question));
                }
                md.push_str(&format!("\n> {}\n", prep.framework));
                md
            }
            Report::Tips(tips) => Self::bullet_list(tips),
            Report::Letter(text) => format!("{}\n", text),
        };
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
        }
    }

    pub fn generate_report(&self, report: &Report, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn breakdown() -> ScoreBreakdown {
        ScoreBreakdown {
            similarity: 0.42,
            similarity_provider: "lexical-tfidf".to_string(),
            lexical: 0.42,
            skill_ratio: 0.5,
            years: 3,
            experience_factor: 0.6,
            section_ratio: 0.5,
            base: 0.48,
            max_repetition: 2,
            penalty: 1.0,
            domain: Some("data".to_string()),
            domain_overlap: 1,
            bonus: 1.05,
            result: MatchResult {
                score: 50.4,
                missing: vec!["excel".to_string()],
                matched: vec!["python".to_string(), "sql".to_string()],
            },
        }
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(95.0).0, "EXCELLENT");
        assert_eq!(score_label(70.0).0, "GOOD");
        assert_eq!(score_label(0.0).0, "POOR");
    }

    #[test]
    fn test_console_without_colors() {
        let breakdown = breakdown();
        let generator = ReportGenerator::with_options(false, true, true);
        let output = generator
            .generate_report(&Report::Score(&breakdown), &OutputFormat::Console)
            .unwrap();

        assert!(output.contains("ATS Score: 50.40 [BELOW AVG]"));
        assert!(output.contains("Matched: python, sql"));
        assert!(output.contains("Domain bonus: x1.05 (data)"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_json_is_the_inner_value() {
        let breakdown = breakdown();
        let generator = ReportGenerator::with_options(false, false, false);
        let json = generator
            .generate_report(&Report::Score(&breakdown), &OutputFormat::Json)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["score"], 50.4);
        assert_eq!(value["domain"], "data");
    }

    #[test]
    fn test_markdown_tips_and_letter() {
        let tips = vec!["First".to_string(), "Second".to_string()];
        let generator = ReportGenerator::default();
        assert_eq!(
            generator.generate_report(&Report::Tips(&tips), &OutputFormat::Markdown).unwrap(),
            "- First\n- Second\n"
        );
        assert_eq!(
            generator.generate_report(&Report::Letter("Dear team"), &OutputFormat::Markdown).unwrap(),
            "Dear team\n"
        );
    }

    #[test]
    fn test_save_report_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("score.md");
        save_report_to_file("# ATS Match", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# ATS Match");
    }
}
