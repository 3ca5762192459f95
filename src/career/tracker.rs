//! Job application tracker and interview conversion analytics

use crate::career::store::{JsonFileStore, TrackerStore};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::round2;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Saved,
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Counts as a converted application.
    pub fn reached_interview(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interview | ApplicationStatus::Offer | ApplicationStatus::Hired
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown application status '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub date: NaiveDate,
}

impl ApplicationRecord {
    fn is_for(&self, company: &str, role: &str) -> bool {
        self.company.to_lowercase() == company.to_lowercase()
            && self.role.to_lowercase() == role.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(ApplicationRecord),
    /// The (company, role) pair was already tracked; carries the existing record.
    Duplicate(ApplicationRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub current_rate: f64,
    pub target_lift_percent: f64,
    pub projected_rate: f64,
    pub absolute_gain_points: f64,
}

pub struct ApplicationTracker<S: TrackerStore = JsonFileStore> {
    store: S,
}

impl ApplicationTracker<JsonFileStore> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(JsonFileStore::new(&config.tracker.path))
    }
}

impl<S: TrackerStore> ApplicationTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Track a new application dated today (UTC). Unknown statuses become `applied`.
    pub fn add(&self, company: &str, role: &str, status: &str) -> Result<AddOutcome> {
        let status: ApplicationStatus = status.parse().unwrap_or_else(|e| {
            warn!("{}, recording as applied", e);
            ApplicationStatus::Applied
        });

        let mut records = self.store.load();
        if let Some(existing) = records.iter().find(|r| r.is_for(company, role)) {
            debug!("Application to {} for {} is already tracked", company, role);
            return Ok(AddOutcome::Duplicate(existing.clone()));
        }

        let record = ApplicationRecord {
            company: company.to_string(),
            role: role.to_string(),
            status,
            date: Utc::now().date_naive(),
        };
        records.push(record.clone());
        self.store.save(&records)?;

        info!("Tracked application: {} at {} ({})", role, company, status);
        Ok(AddOutcome::Added(record))
    }

    /// Set the status of every record for (company, role). Returns false for
    /// an unknown status or when nothing matched.
    pub fn update_status(&self, company: &str, role: &str, status: &str) -> Result<bool> {
        let status: ApplicationStatus = match status.parse() {
            Ok(status) => status,
            Err(e) => {
                warn!("Not updating {} at {}: {}", role, company, e);
                return Ok(false);
            }
        };

        let mut records = self.store.load();
        let mut updated = false;
        for record in records.iter_mut().filter(|r| r.is_for(company, role)) {
            record.status = status;
            updated = true;
        }

        if updated {
            self.store.save(&records)?;
        }
        Ok(updated)
    }

    /// Newest first; same-day records by company, descending.
    pub fn list(&self) -> Vec<ApplicationRecord> {
        let mut records = self.store.load();
        records.sort_by(|a, b| (b.date, &b.company).cmp(&(a.date, &a.company)));
        records
    }

    /// Percentage of applications that reached interview, offer or hire.
    pub fn interview_conversion_rate(&self) -> f64 {
        conversion_rate(&self.store.load())
    }

    pub fn conversion_improvement_report(&self, target_lift: f64) -> ConversionReport {
        let current_rate = self.interview_conversion_rate();
        let projected_rate = round2((current_rate * (1.0 + target_lift / 100.0)).min(100.0));

        ConversionReport {
            current_rate,
            target_lift_percent: target_lift,
            projected_rate,
            absolute_gain_points: round2(projected_rate - current_rate),
        }
    }
}

fn conversion_rate(records: &[ApplicationRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let converted = records.iter().filter(|r| r.status.reached_interview()).count();
    round2(converted as f64 / records.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracker(temp_dir: &TempDir) -> ApplicationTracker {
        ApplicationTracker::new(JsonFileStore::new(temp_dir.path().join("applications.json")))
    }

    fn record(company: &str, status: ApplicationStatus, date: (i32, u32, u32)) -> ApplicationRecord {
        ApplicationRecord {
            company: company.to_string(),
            role: "Engineer".to_string(),
            status,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("offer".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Offer));
        assert_eq!(" Interview ".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Interview));
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
        assert_eq!(ApplicationStatus::Hired.to_string(), "hired");
    }

    #[test]
    fn test_add_then_update_converts() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir);

        let outcome = tracker.add("Acme", "Data Analyst", "applied").unwrap();
        assert!(matches!(outcome, AddOutcome::Added(ref r) if r.status == ApplicationStatus::Applied));

        assert!(tracker.update_status("Acme", "Data Analyst", "interview").unwrap());
        assert_eq!(tracker.interview_conversion_rate(), 100.0);

        let report = tracker.conversion_improvement_report(40.0);
        assert_eq!(report.current_rate, 100.0);
        assert_eq!(report.projected_rate, 100.0);
        assert_eq!(report.absolute_gain_points, 0.0);
    }

    #[test]
    fn test_unknown_status_on_add_becomes_applied() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir);

        match tracker.add("Acme", "Engineer", "ghosted").unwrap() {
            AddOutcome::Added(record) => assert_eq!(record.status, ApplicationStatus::Applied),
            other => panic!("expected a new record, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir);

        tracker.add("Acme", "Data Analyst", "saved").unwrap();
        let outcome = tracker.add("ACME", "data analyst", "offer").unwrap();

        match outcome {
            AddOutcome::Duplicate(existing) => assert_eq!(existing.status, ApplicationStatus::Saved),
            other => panic!("expected a duplicate, got {:?}", other),
        }
        assert_eq!(tracker.list().len(), 1);
    }

    #[test]
    fn test_update_rejects_unknown_status_and_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir);
        tracker.add("Acme", "Engineer", "applied").unwrap();

        assert!(!tracker.update_status("Acme", "Engineer", "ghosted").unwrap());
        assert!(!tracker.update_status("Globex", "Engineer", "offer").unwrap());
        assert_eq!(tracker.list()[0].status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_list_sorted_by_date_then_company_descending() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("applications.json"));
        store
            .save(&[
                record("Acme", ApplicationStatus::Applied, (2026, 1, 5)),
                record("Initech", ApplicationStatus::Applied, (2026, 2, 1)),
                record("Globex", ApplicationStatus::Applied, (2026, 2, 1)),
            ])
            .unwrap();

        let companies: Vec<String> = ApplicationTracker::new(store)
            .list()
            .into_iter()
            .map(|r| r.company)
            .collect();
        assert_eq!(companies, vec!["Initech", "Globex", "Acme"]);
    }

    #[test]
    fn test_conversion_rate_and_projection() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("applications.json"));
        store
            .save(&[
                record("A", ApplicationStatus::Applied, (2026, 1, 1)),
                record("B", ApplicationStatus::Rejected, (2026, 1, 1)),
                record("C", ApplicationStatus::Offer, (2026, 1, 1)),
            ])
            .unwrap();
        let tracker = ApplicationTracker::new(store);

        assert_eq!(tracker.interview_conversion_rate(), 33.33);

        let report = tracker.conversion_improvement_report(100.0);
        assert_eq!(report.projected_rate, 66.66);
        assert_eq!(report.absolute_gain_points, 33.33);

        assert_eq!(tracker.conversion_improvement_report(500.0).projected_rate, 100.0);
    }

    #[test]
    fn test_empty_tracker() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir);

        assert!(tracker.list().is_empty());
        assert_eq!(tracker.interview_conversion_rate(), 0.0);
        assert_eq!(tracker.conversion_improvement_report(40.0).projected_rate, 0.0);
    }
}
