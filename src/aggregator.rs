//! Scope and report-level totals as a pure fold over the activity results.
//!
//! Summaries are never edited directly; they are recomputed from the
//! `CalculationResult`s attached to the report. An entry whose result is
//! missing or corrupt is logged, listed in `excluded_entries` and contributes
//! zero instead of failing the whole summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::activity::{ActivityEntry, ActivityPayload};
use crate::report::Report;
use crate::types::{DataQuality, SubCategory};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope1Totals {
    pub stationary: f64,
    pub mobile: f64,
    pub fugitive: f64,
    pub process: f64,
    /// Always `stationary + mobile + fugitive + process`.
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope2Totals {
    pub location_based: f64,
    pub market_based: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope3Totals {
    pub by_category: BTreeMap<u8, f64>,
    pub total: f64,
}

/// Report-level emissions summary, kg CO2e unless converted with
/// [`ScopeSummary::in_tonnes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub scope1: Scope1Totals,
    pub scope2: Scope2Totals,
    pub scope3: Scope3Totals,
    /// Scope 1 plus market-based Scope 2.
    pub combined_scope1_and_2: f64,
    /// Part of `combined_scope1_and_2` that comes from estimated entries.
    pub estimated_co2e: f64,
    pub activity_count: usize,
    pub excluded_entries: Vec<Uuid>,
    pub last_calculated: DateTime<Utc>,
}

impl ScopeSummary {
    /// Equal in every figure, ignoring `last_calculated`.
    pub fn same_totals(&self, other: &ScopeSummary) -> bool {
        self.scope1 == other.scope1
            && self.scope2 == other.scope2
            && self.scope3 == other.scope3
            && self.combined_scope1_and_2 == other.combined_scope1_and_2
            && self.estimated_co2e == other.estimated_co2e
            && self.activity_count == other.activity_count
            && self.excluded_entries == other.excluded_entries
    }

    pub fn in_tonnes(&self) -> ScopeSummary {
        let t = |kg: f64| kg / 1000.0;
        ScopeSummary {
            scope1: Scope1Totals {
                stationary: t(self.scope1.stationary),
                mobile: t(self.scope1.mobile),
                fugitive: t(self.scope1.fugitive),
                process: t(self.scope1.process),
                total: t(self.scope1.total),
            },
            scope2: Scope2Totals {
                location_based: t(self.scope2.location_based),
                market_based: t(self.scope2.market_based),
            },
            scope3: Scope3Totals {
                by_category: self
                    .scope3
                    .by_category
                    .iter()
                    .map(|(k, v)| (*k, t(*v)))
                    .collect(),
                total: t(self.scope3.total),
            },
            combined_scope1_and_2: t(self.combined_scope1_and_2),
            estimated_co2e: t(self.estimated_co2e),
            activity_count: self.activity_count,
            excluded_entries: self.excluded_entries.clone(),
            last_calculated: self.last_calculated,
        }
    }
}

enum Contribution {
    Scope1 {
        sub: SubCategory,
        co2e: f64,
    },
    Scope2 {
        location_based: f64,
        market_based: f64,
    },
    Scope3 {
        category: u8,
        co2e: f64,
    },
}

fn usable(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn contribution(entry: &ActivityEntry) -> Result<(Contribution, DataQuality), &'static str> {
    let result = entry.result().ok_or("missing calculation result")?;
    if !usable(result.total_co2e_emissions) {
        return Err("total is negative or not finite");
    }
    let c = match entry.sub_category() {
        SubCategory::Grid => {
            let dual = result
                .electricity
                .ok_or("electricity result without location/market figures")?;
            if !usable(dual.location_based_emissions) || !usable(dual.market_based_emissions) {
                return Err("electricity figures are negative or not finite");
            }
            Contribution::Scope2 {
                location_based: dual.location_based_emissions,
                market_based: dual.market_based_emissions,
            }
        }
        SubCategory::ValueChain => {
            let category = match &entry.input.payload {
                ActivityPayload::ValueChain(p) => p.category,
                _ => None,
            };
            match category {
                Some(category) if (1..=15).contains(&category) => Contribution::Scope3 {
                    category,
                    co2e: result.total_co2e_emissions,
                },
                _ => return Err("scope 3 entry without a valid category"),
            }
        }
        sub => Contribution::Scope1 {
            sub,
            co2e: result.total_co2e_emissions,
        },
    };
    Ok((c, result.data_quality))
}

/// Fold `activities` into a summary stamped `at`. Reads only; never
/// mutates the entries.
pub fn aggregate(activities: &[ActivityEntry], at: DateTime<Utc>) -> ScopeSummary {
    let mut scope1 = Scope1Totals::default();
    let mut scope2 = Scope2Totals::default();
    let mut scope3 = Scope3Totals::default();
    let mut estimated = 0.0;
    let mut activity_count = 0;
    let mut excluded = Vec::new();

    for entry in activities {
        let (c, quality) = match contribution(entry) {
            Ok(c) => c,
            Err(reason) => {
                warn!(activity_id = %entry.id, reason, "excluding corrupt activity from summary");
                excluded.push(entry.id);
                continue;
            }
        };
        activity_count += 1;
        let estimate = quality == DataQuality::Estimated;
        match c {
            Contribution::Scope1 { sub, co2e } => {
                match sub {
                    SubCategory::Stationary => scope1.stationary += co2e,
                    SubCategory::Mobile => scope1.mobile += co2e,
                    SubCategory::Fugitive => scope1.fugitive += co2e,
                    _ => scope1.process += co2e,
                }
                if estimate {
                    estimated += co2e;
                }
            }
            Contribution::Scope2 {
                location_based,
                market_based,
            } => {
                scope2.location_based += location_based;
                scope2.market_based += market_based;
                if estimate {
                    estimated += market_based;
                }
            }
            Contribution::Scope3 { category, co2e } => {
                *scope3.by_category.entry(category).or_insert(0.0) += co2e;
            }
        }
    }

    scope1.total = scope1.stationary + scope1.mobile + scope1.fugitive + scope1.process;
    scope3.total = scope3.by_category.values().sum();

    ScopeSummary {
        combined_scope1_and_2: scope1.total + scope2.market_based,
        scope1,
        scope2,
        scope3,
        estimated_co2e: estimated,
        activity_count,
        excluded_entries: excluded,
        last_calculated: at,
    }
}

/// Recompute the summary for every activity currently on `report`.
pub fn recompute(report: &Report) -> ScopeSummary {
    aggregate(&report.activities, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{
        ActivityInput, FugitiveInput, FugitiveMethod, MobileCombustionInput, MobileMethod,
        ProcessEmissionsInput, PurchasedElectricityInput, StationaryCombustionInput,
        ValueChainInput,
    };
    use crate::calculators::fixtures::{ctx, factor, grid};
    use crate::calculators::{
        calculate_electricity, calculate_fugitive, calculate_mobile, calculate_process,
        calculate_stationary, calculate_value_chain,
    };
    use crate::validation::Leakage;
    use proptest::prelude::*;

    fn entry(kind: u8, qty: f64) -> ActivityEntry {
        let c = ctx();
        match kind % 6 {
            0 => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::StationaryCombustion(
                    StationaryCombustionInput {
                        consumption_quantity: Some(qty),
                        fuel_type: Some("Diesel".into()),
                        equipment: None,
                    },
                )),
                calculate_stationary(
                    qty,
                    &factor(SubCategory::Stationary, "Diesel", 2.67, "kgCO2e/litre"),
                    &c,
                ),
            ),
            1 => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::MobileCombustion(MobileCombustionInput {
                    calculation_method: Some(MobileMethod::FuelBased),
                    fuel_consumption: Some(qty),
                    fuel_type: Some("Petrol".into()),
                    ..Default::default()
                })),
                calculate_mobile(
                    MobileMethod::FuelBased,
                    qty,
                    &factor(SubCategory::Mobile, "Petrol", 2.31, "kgCO2e/litre"),
                    &c,
                ),
            ),
            2 => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::Fugitive(FugitiveInput {
                    calculation_method: Some(FugitiveMethod::Screening),
                    refrigerant_type: Some("R-410A".into()),
                    equipment_capacity: Some(qty),
                    ..Default::default()
                })),
                calculate_fugitive(
                    &Leakage::CapacityEstimate {
                        equipment_capacity: qty,
                        leak_rate: None,
                    },
                    &factor(SubCategory::Fugitive, "R-410A", 2088.0, "kgCO2e/kg"),
                    &c,
                ),
            ),
            3 => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::PurchasedElectricity(
                    PurchasedElectricityInput {
                        consumption_quantity: Some(qty),
                        renewable_energy_portion: Some(qty / 4.0),
                    },
                )),
                calculate_electricity(qty, qty / 4.0, &grid(0.2263), &c),
            ),
            4 => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::ProcessEmissions(ProcessEmissionsInput {
                    process_type: Some("Clinker".into()),
                    production_quantity: Some(qty),
                })),
                calculate_process(
                    qty,
                    &factor(SubCategory::Process, "Clinker", 525.0, "kgCO2e/tonne"),
                    &c,
                ),
            ),
            _ => ActivityEntry::calculated(
                ActivityInput::new(ActivityPayload::ValueChain(ValueChainInput {
                    category: Some(6),
                    activity_type: Some("Air travel".into()),
                    quantity: Some(qty),
                })),
                calculate_value_chain(
                    qty,
                    &factor(SubCategory::ValueChain, "Air travel", 0.15, "kgCO2e/km"),
                    &c,
                ),
            ),
        }
    }

    fn at() -> DateTime<Utc> {
        ctx().calculated_at
    }

    #[test]
    fn empty_report_is_all_zero() {
        let s = aggregate(&[], at());
        assert_eq!(s.scope1, Scope1Totals::default());
        assert_eq!(s.combined_scope1_and_2, 0.0);
        assert_eq!(s.activity_count, 0);
    }

    #[test]
    fn totals_fold_by_sub_category() {
        let entries: Vec<ActivityEntry> = (0..6).map(|k| entry(k, 100.0)).collect();
        let s = aggregate(&entries, at());
        assert!((s.scope1.stationary - 267.0).abs() < 1e-9);
        assert!((s.scope1.mobile - 231.0).abs() < 1e-9);
        assert!((s.scope1.fugitive - 10.0 * 2088.0).abs() < 1e-6);
        assert!((s.scope1.process - 52_500.0).abs() < 1e-9);
        assert!((s.scope2.location_based - 22.63).abs() < 1e-9);
        assert!((s.scope2.market_based - 75.0 * 0.2263).abs() < 1e-9);
        assert!((s.scope3.by_category[&6] - 15.0).abs() < 1e-9);
        assert_eq!(s.scope3.total, s.scope3.by_category[&6]);
        assert_eq!(s.combined_scope1_and_2, s.scope1.total + s.scope2.market_based);
        assert_eq!(s.estimated_co2e, s.scope1.fugitive);
        assert_eq!(s.activity_count, 6);
    }

    #[test]
    fn corrupt_entries_contribute_zero() {
        let good = entry(0, 1000.0);
        let missing = ActivityEntry::with_raw_result(good.input.clone(), None);

        let mut bad_result = good.result().cloned().unwrap();
        bad_result.total_co2e_emissions = f64::NAN;
        let corrupt = ActivityEntry::with_raw_result(good.input.clone(), Some(bad_result));

        let grid_entry = entry(3, 10.0);
        let mut no_dual = grid_entry.result().cloned().unwrap();
        no_dual.electricity = None;
        let corrupt_grid = ActivityEntry::with_raw_result(grid_entry.input.clone(), Some(no_dual));

        let entries = vec![good.clone(), missing.clone(), corrupt.clone(), corrupt_grid.clone()];
        let s = aggregate(&entries, at());
        assert!((s.scope1.total - 2670.0).abs() < 1e-9);
        assert_eq!(s.scope2.location_based, 0.0);
        assert_eq!(s.activity_count, 1);
        assert_eq!(
            s.excluded_entries,
            vec![missing.id, corrupt.id, corrupt_grid.id]
        );
    }

    #[test]
    fn recompute_reads_report_activities() {
        let mut report = Report::new("acme", 2023, "Ireland");
        report.activities.push(entry(0, 1000.0));
        let before = report.clone();
        let s = recompute(&report);
        assert!((s.combined_scope1_and_2 - 2670.0).abs() < 1e-9);
        assert_eq!(report, before);
    }

    #[test]
    fn tonnes_view_divides_by_thousand() {
        let s = aggregate(&[entry(4, 2.0)], at()).in_tonnes();
        assert_eq!(s.scope1.process, 1.05);
        assert_eq!(s.combined_scope1_and_2, 1.05);
    }

    fn arb_entries() -> impl Strategy<Value = Vec<ActivityEntry>> {
        prop::collection::vec((0u8..6, 0.0f64..1.0e6), 0..20)
            .prop_map(|specs| specs.into_iter().map(|(k, q)| entry(k, q)).collect())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    proptest! {
        #[test]
        fn recompute_is_idempotent(entries in arb_entries()) {
            let first = aggregate(&entries, at());
            let second = aggregate(&entries, at());
            prop_assert_eq!(&first, &second);

            let mut report = Report::new("acme", 2023, "Ireland");
            report.activities = entries;
            let a = recompute(&report);
            report.summary = Some(a.clone());
            let b = recompute(&report);
            prop_assert!(a.same_totals(&b));
        }

        #[test]
        fn scope1_total_decomposes_exactly(entries in arb_entries()) {
            let s = aggregate(&entries, at());
            let parts =
                s.scope1.stationary + s.scope1.mobile + s.scope1.fugitive + s.scope1.process;
            prop_assert_eq!(s.scope1.total, parts);
            prop_assert_eq!(s.combined_scope1_and_2, s.scope1.total + s.scope2.market_based);
            prop_assert!(s.scope2.market_based <= s.scope2.location_based + 1e-9);
        }

        #[test]
        fn totals_are_additive(a in arb_entries(), b in arb_entries()) {
            let sa = aggregate(&a, at());
            let sb = aggregate(&b, at());
            let mut union = a.clone();
            union.extend(b.iter().cloned());
            let su = aggregate(&union, at());

            prop_assert!(close(su.scope1.total, sa.scope1.total + sb.scope1.total));
            prop_assert!(close(
                su.scope2.location_based,
                sa.scope2.location_based + sb.scope2.location_based
            ));
            prop_assert!(close(
                su.scope2.market_based,
                sa.scope2.market_based + sb.scope2.market_based
            ));
            prop_assert!(close(su.scope3.total, sa.scope3.total + sb.scope3.total));
            prop_assert!(close(
                su.combined_scope1_and_2,
                sa.combined_scope1_and_2 + sb.combined_scope1_and_2
            ));
            prop_assert_eq!(su.activity_count, sa.activity_count + sb.activity_count);
        }
    }
}
