use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::ActivityEntry;
use crate::aggregator::ScopeSummary;
use crate::error::{EngineError, EngineResult};

/// Report document: the activity list plus the summary derived from it.
///
/// `version` is the optimistic-concurrency token. It is bumped by the store
/// on every successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub company_id: String,
    pub reporting_year: i32,
    /// Default geography for factor lookups.
    pub country: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
    #[serde(default)]
    pub summary: Option<ScopeSummary>,
}

impl Report {
    pub fn new(company_id: &str, reporting_year: i32, country: &str) -> Self {
        Report {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            reporting_year,
            country: country.to_string(),
            version: 0,
            activities: Vec::new(),
            summary: None,
        }
    }

    /// First day of the reporting year.
    pub fn period_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.reporting_year, 1, 1)
    }

    pub fn activity(&self, id: Uuid) -> EngineResult<&ActivityEntry> {
        self.activities
            .iter()
            .find(|a| a.id == id)
            .ok_or(EngineError::ActivityNotFound(id))
    }

    pub(crate) fn activity_index(&self, id: Uuid) -> EngineResult<usize> {
        self.activities
            .iter()
            .position(|a| a.id == id)
            .ok_or(EngineError::ActivityNotFound(id))
    }
}

/// Whole-document persistence for reports.
pub trait ReportStore {
    fn load(&self, id: Uuid) -> EngineResult<Report>;

    /// Persist `report` if the stored version still equals `report.version`,
    /// returning the stored copy with its new version. A mismatch is
    /// `VersionConflict` and leaves the stored document untouched.
    fn save(&self, report: Report) -> EngineResult<Report>;
}

#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Uuid, Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new report document.
    pub fn insert(&self, report: Report) -> Uuid {
        let id = report.id;
        self.reports
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, report);
        id
    }
}

impl ReportStore for InMemoryReportStore {
    fn load(&self, id: Uuid) -> EngineResult<Report> {
        self.reports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(EngineError::ReportNotFound(id))
    }

    fn save(&self, mut report: Report) -> EngineResult<Report> {
        let mut reports = self.reports.write().unwrap_or_else(PoisonError::into_inner);
        let stored = reports
            .get_mut(&report.id)
            .ok_or(EngineError::ReportNotFound(report.id))?;
        if stored.version != report.version {
            return Err(EngineError::VersionConflict {
                report_id: report.id,
                expected: report.version,
                found: stored.version,
            });
        }
        report.version += 1;
        *stored = report.clone();
        Ok(report)
    }
}
