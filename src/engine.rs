//! Entry point for callers: validate → resolve → calculate → fold, then a
//! single versioned save of the whole report.
//!
//! The stored report is only replaced once the new activity and summary
//! are fully computed, so a failed submission leaves the previous summary
//! in place. Concurrent writers are detected by the store's version check
//! and the cycle is re-run against the fresh document.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::activity::{ActivityEntry, ActivityInput};
use crate::aggregator::{aggregate, ScopeSummary};
use crate::calculators::{self, CalcContext};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::factor_store::FactorStore;
use crate::report::{Report, ReportStore};
use crate::resolver::FactorResolver;
use crate::types::CalculationResult;
use crate::validation;

/// Activity as stored plus the report summary after the change.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOutcome {
    pub activity: ActivityEntry,
    pub summary: ScopeSummary,
    pub report_version: u64,
}

pub struct EmissionEngine<F: FactorStore, R: ReportStore> {
    factors: F,
    reports: R,
    config: EngineConfig,
}

impl<F: FactorStore, R: ReportStore> EmissionEngine<F, R> {
    pub fn new(factors: F, reports: R, config: EngineConfig) -> Self {
        EmissionEngine {
            factors,
            reports,
            config,
        }
    }

    pub fn factors(&self) -> &F {
        &self.factors
    }

    pub fn reports(&self) -> &R {
        &self.reports
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate, resolve and price one activity for `report`. Touches no
    /// stored state.
    ///
    /// Only factors whose window contains the activity date (or the start
    /// of the reporting year) are eligible.
    pub fn calculate(
        &self,
        report: &Report,
        input: &ActivityInput,
    ) -> EngineResult<CalculationResult> {
        let activity = validation::validate(input)?;
        let country = input.country.as_deref().unwrap_or(&report.country);
        let as_of = match input.activity_date {
            Some(date) => date,
            None => report.period_start().ok_or_else(|| {
                EngineError::InvalidActivityInput(format!(
                    "reporting year {} is out of range",
                    report.reporting_year
                ))
            })?,
        };
        let filter = activity.factor_filter(country, Some(as_of));
        let factor =
            FactorResolver::new(&self.factors, &self.config.global_region).resolve(&filter)?;
        let ctx = CalcContext::new(self.config.gwp_set);
        calculators::calculate(&activity, &factor, &ctx)
    }

    pub fn add_activity(
        &self,
        report_id: Uuid,
        input: ActivityInput,
    ) -> EngineResult<ActivityOutcome> {
        let (report, (entry, summary)) = self.commit(report_id, |report| {
            let result = self.calculate(report, &input)?;
            let entry = ActivityEntry::calculated(input.clone(), result);
            let mut next = report.clone();
            next.activities.push(entry.clone());
            Ok((next, entry))
        })?;
        info!(
            report_id = %report_id,
            activity_id = %entry.id,
            sub_category = ?entry.sub_category(),
            co2e_kg = entry.result().map(|r| r.total_co2e_emissions),
            "activity added"
        );
        Ok(ActivityOutcome {
            activity: entry,
            summary,
            report_version: report.version,
        })
    }

    /// Replace an activity's input and price it again.
    pub fn update_activity(
        &self,
        report_id: Uuid,
        activity_id: Uuid,
        input: ActivityInput,
    ) -> EngineResult<ActivityOutcome> {
        let (report, (entry, summary)) = self.commit(report_id, |report| {
            let index = report.activity_index(activity_id)?;
            let result = self.calculate(report, &input)?;
            let entry = report.activities[index].recalculated(input.clone(), result);
            let mut next = report.clone();
            next.activities[index] = entry.clone();
            Ok((next, entry))
        })?;
        info!(report_id = %report_id, activity_id = %activity_id, "activity updated");
        Ok(ActivityOutcome {
            activity: entry,
            summary,
            report_version: report.version,
        })
    }

    /// Re-price an existing activity against the factor that applies now.
    /// Historical results are only ever re-priced through this call.
    pub fn recalculate_activity(
        &self,
        report_id: Uuid,
        activity_id: Uuid,
    ) -> EngineResult<ActivityOutcome> {
        let (report, (entry, summary)) = self.commit(report_id, |report| {
            let index = report.activity_index(activity_id)?;
            let current = &report.activities[index];
            let result = self.calculate(report, &current.input)?;
            let entry = current.recalculated(current.input.clone(), result);
            let mut next = report.clone();
            next.activities[index] = entry.clone();
            Ok((next, entry))
        })?;
        info!(report_id = %report_id, activity_id = %activity_id, "activity re-priced");
        Ok(ActivityOutcome {
            activity: entry,
            summary,
            report_version: report.version,
        })
    }

    pub fn remove_activity(
        &self,
        report_id: Uuid,
        activity_id: Uuid,
    ) -> EngineResult<ScopeSummary> {
        let (_, (removed, summary)) = self.commit(report_id, |report| {
            let index = report.activity_index(activity_id)?;
            let mut next = report.clone();
            let removed = next.activities.remove(index);
            Ok((next, removed))
        })?;
        info!(report_id = %report_id, activity_id = %removed.id, "activity removed");
        Ok(summary)
    }

    /// Recompute and persist the summary from the activities as stored.
    pub fn recalculate_summary(&self, report_id: Uuid) -> EngineResult<ScopeSummary> {
        let (_, ((), summary)) = self.commit(report_id, |report| Ok((report.clone(), ())))?;
        info!(
            report_id = %report_id,
            combined_kg = summary.combined_scope1_and_2,
            "summary recalculated"
        );
        Ok(summary)
    }

    /// Load, apply `change`, fold a fresh summary and save against the
    /// loaded version. Retried on `VersionConflict` up to the configured
    /// budget; any other error aborts before anything is written.
    fn commit<T, C>(
        &self,
        report_id: Uuid,
        mut change: C,
    ) -> EngineResult<(Report, (T, ScopeSummary))>
    where
        C: FnMut(&Report) -> EngineResult<(Report, T)>,
    {
        let attempts = self.config.max_conflict_retries;
        for attempt in 1..=attempts {
            let current = self.reports.load(report_id)?;
            let (mut next, out) = change(&current)?;
            let summary = aggregate(&next.activities, Utc::now());
            next.summary = Some(summary.clone());
            match self.reports.save(next) {
                Ok(saved) => return Ok((saved, (out, summary))),
                Err(EngineError::VersionConflict { expected, found, .. }) => {
                    warn!(
                        report_id = %report_id,
                        attempt,
                        expected,
                        found,
                        "concurrent report update, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(EngineError::ConflictRetriesExhausted {
            report_id,
            attempts,
        })
    }
}
