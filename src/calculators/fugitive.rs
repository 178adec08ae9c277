use super::CalcContext;
use crate::types::{CalculationMethod, CalculationResult, DataQuality, EmissionFactor};
use crate::validation::Leakage;

/// Leaked refrigerant (kg) × the substance's GWP factor.
///
/// The capacity branch is a heuristic and is flagged `Estimated`. Without a
/// leak rate it prices the full equipment charge.
pub fn calculate_fugitive(
    leakage: &Leakage,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    let (method, quality) = match leakage {
        Leakage::Direct { .. } => (CalculationMethod::FugitiveDirect, DataQuality::Measured),
        Leakage::MassBalance { .. } => {
            (CalculationMethod::FugitiveMassBalance, DataQuality::Measured)
        }
        Leakage::CapacityEstimate { .. } => (
            CalculationMethod::FugitiveCapacityEstimate,
            DataQuality::Estimated,
        ),
    };
    let leaked_kg = leakage.leaked_kg();
    ctx.combined(factor, leaked_kg, method, quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::fixtures::{ctx, factor};
    use crate::types::SubCategory;

    fn r134a() -> EmissionFactor {
        factor(SubCategory::Fugitive, "R-134a", 1430.0, "kgCO2e/kg")
    }

    #[test]
    fn mass_balance_derives_leaked_mass() {
        let leakage = Leakage::MassBalance {
            beginning_inventory: 100.0,
            purchases: 50.0,
            sales_transfers: 20.0,
            ending_inventory: 110.0,
        };
        let r = calculate_fugitive(&leakage, &r134a(), &ctx());
        assert_eq!(r.activity_quantity, 20.0);
        assert_eq!(r.total_co2e_emissions, 20.0 * 1430.0);
        assert_eq!(r.method, CalculationMethod::FugitiveMassBalance);
        assert_eq!(r.data_quality, DataQuality::Measured);
    }

    #[test]
    fn direct_leakage() {
        let r = calculate_fugitive(&Leakage::Direct { quantity_leaked: 1.5 }, &r134a(), &ctx());
        assert_eq!(r.total_co2e_emissions, 1.5 * 1430.0);
        assert_eq!(r.data_quality, DataQuality::Measured);
    }

    #[test]
    fn capacity_estimate_is_flagged() {
        let with_rate = Leakage::CapacityEstimate {
            equipment_capacity: 20.0,
            leak_rate: Some(0.05),
        };
        let r = calculate_fugitive(&with_rate, &r134a(), &ctx());
        assert!((r.activity_quantity - 1.0).abs() < 1e-12);
        assert_eq!(r.method, CalculationMethod::FugitiveCapacityEstimate);
        assert_eq!(r.data_quality, DataQuality::Estimated);
    }

    #[test]
    fn capacity_without_rate_prices_full_charge() {
        let r410a = factor(SubCategory::Fugitive, "R-410A", 2088.0, "kgCO2e/kg");
        let no_rate = Leakage::CapacityEstimate {
            equipment_capacity: 12.0,
            leak_rate: None,
        };
        let r = calculate_fugitive(&no_rate, &r410a, &ctx());
        assert_eq!(r.activity_quantity, 12.0);
        assert_eq!(r.total_co2e_emissions, 25_056.0);
        assert_eq!(r.method, CalculationMethod::FugitiveCapacityEstimate);
        assert_eq!(r.data_quality, DataQuality::Estimated);
    }
}
