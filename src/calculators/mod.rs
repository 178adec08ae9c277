//! One pure calculation per activity kind. Each takes validated input and
//! the resolved factor and returns a [`CalculationResult`] carrying the
//! factor snapshot it was priced with.

mod electricity;
mod fugitive;
mod mobile;
mod simple;
mod stationary;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::factor_store::same_key;
use crate::gwp::GwpSet;
use crate::types::{CalculationMethod, CalculationResult, DataQuality, EmissionFactor};
use crate::validation::{ValidatedActivity, ValidatedKind};

pub use electricity::calculate_electricity;
pub use fugitive::calculate_fugitive;
pub use mobile::calculate_mobile;
pub use simple::{calculate_process, calculate_value_chain};
pub use stationary::calculate_stationary;

/// Inputs that are not part of the activity: the GWP table and the
/// timestamp stamped on the result. Fixing both makes every calculation
/// bit-for-bit repeatable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CalcContext {
    pub gwp_set: GwpSet,
    pub calculated_at: DateTime<Utc>,
}

impl CalcContext {
    pub fn new(gwp_set: GwpSet) -> Self {
        CalcContext {
            gwp_set,
            calculated_at: Utc::now(),
        }
    }

    /// Result for `quantity × total_co2e_factor` with no gas split.
    pub(crate) fn combined(
        &self,
        factor: &EmissionFactor,
        quantity: f64,
        method: CalculationMethod,
        data_quality: DataQuality,
    ) -> CalculationResult {
        CalculationResult {
            factor: factor.snapshot(),
            gwp_set: self.gwp_set,
            activity_quantity: quantity,
            gases: None,
            electricity: None,
            total_co2e_emissions: quantity * factor.total_co2e_factor,
            method,
            data_quality,
            calculated_at: self.calculated_at,
        }
    }
}

/// No conversion table exists, so differing units are a hard error.
pub fn check_unit(unit: Option<&str>, factor: &EmissionFactor) -> EngineResult<()> {
    match unit {
        Some(unit) if !same_key(unit, factor.activity_unit()) => Err(EngineError::UnitMismatch {
            expected: factor.activity_unit().to_string(),
            found: unit.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Dispatch to the calculator for the activity kind.
pub fn calculate(
    activity: &ValidatedActivity,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> EngineResult<CalculationResult> {
    check_unit(activity.unit.as_deref(), factor)?;
    let result = match &activity.kind {
        ValidatedKind::Stationary { quantity, .. } => calculate_stationary(*quantity, factor, ctx),
        ValidatedKind::Mobile {
            method, quantity, ..
        } => calculate_mobile(*method, *quantity, factor, ctx),
        ValidatedKind::Fugitive { leakage, .. } => calculate_fugitive(leakage, factor, ctx),
        ValidatedKind::Electricity {
            consumption,
            renewable_portion,
        } => calculate_electricity(*consumption, *renewable_portion, factor, ctx),
        ValidatedKind::Process { quantity, .. } => calculate_process(*quantity, factor, ctx),
        ValidatedKind::ValueChain { quantity, .. } => {
            calculate_value_chain(*quantity, factor, ctx)
        }
    };
    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{ctx, factor, grid};
    use super::*;
    use crate::activity::MobileMethod;
    use crate::types::SubCategory;
    use crate::validation::Leakage;
    use proptest::prelude::*;

    #[test]
    fn unit_mismatch_fails_before_arithmetic() {
        let activity = ValidatedActivity {
            unit: Some("gallon".into()),
            kind: ValidatedKind::Stationary {
                quantity: 10.0,
                fuel_type: "Diesel".into(),
            },
        };
        let f = factor(SubCategory::Stationary, "Diesel", 2.67, "kgCO2e/litre");
        assert_eq!(
            calculate(&activity, &f, &ctx()).unwrap_err(),
            EngineError::UnitMismatch {
                expected: "litre".into(),
                found: "gallon".into()
            }
        );
    }

    #[test]
    fn matching_unit_is_case_insensitive() {
        let activity = ValidatedActivity {
            unit: Some("Litre".into()),
            kind: ValidatedKind::Mobile {
                method: MobileMethod::FuelBased,
                quantity: 10.0,
                fuel_type: "Diesel".into(),
                vehicle_type: None,
            },
        };
        let f = factor(SubCategory::Mobile, "Diesel", 2.5, "kgCO2e/litre");
        let r = calculate(&activity, &f, &ctx()).unwrap();
        assert_eq!(r.total_co2e_emissions, 25.0);
    }

    #[test]
    fn dispatch_routes_every_kind() {
        let c = ctx();
        let cases = vec![
            (
                ValidatedKind::Fugitive {
                    refrigerant_type: "R-410A".into(),
                    leakage: Leakage::Direct { quantity_leaked: 2.0 },
                },
                factor(SubCategory::Fugitive, "R-410A", 2088.0, "kgCO2e/kg"),
                CalculationMethod::FugitiveDirect,
            ),
            (
                ValidatedKind::Electricity {
                    consumption: 100.0,
                    renewable_portion: 0.0,
                },
                grid(0.3),
                CalculationMethod::ElectricityDualMethod,
            ),
            (
                ValidatedKind::Process {
                    process_type: "Clinker".into(),
                    quantity: 4.0,
                },
                factor(SubCategory::Process, "Clinker", 525.0, "kgCO2e/tonne"),
                CalculationMethod::ProcessEmissions,
            ),
            (
                ValidatedKind::ValueChain {
                    category: 6,
                    activity_type: "Air travel".into(),
                    quantity: 1000.0,
                },
                factor(SubCategory::ValueChain, "Air travel", 0.15, "kgCO2e/km"),
                CalculationMethod::ValueChainFactor,
            ),
        ];
        for (kind, f, method) in cases {
            let r = calculate(&ValidatedActivity { unit: None, kind }, &f, &c).unwrap();
            assert_eq!(r.method, method);
            assert_eq!(r.factor.factor_id, f.id);
        }
    }

    proptest! {
        #[test]
        fn repeated_calculation_is_bit_identical(
            quantity in 0.001f64..1.0e7,
            total in 0.0f64..50.0,
            ch4 in 0.0f64..0.01,
            n2o in 0.0f64..0.01,
        ) {
            let mut f = factor(SubCategory::Stationary, "Diesel", total, "kgCO2e/litre");
            f.co2_factor = Some(total);
            f.ch4_factor = Some(ch4);
            f.n2o_factor = Some(n2o);
            let activity = ValidatedActivity {
                unit: None,
                kind: ValidatedKind::Stationary { quantity, fuel_type: "Diesel".into() },
            };
            let a = calculate(&activity, &f, &ctx()).unwrap();
            let b = calculate(&activity, &f, &ctx()).unwrap();
            prop_assert_eq!(a.total_co2e_emissions.to_bits(), b.total_co2e_emissions.to_bits());
            prop_assert_eq!(a, b);
        }
    }
}
