use super::CalcContext;
use crate::types::{
    CalculationMethod, CalculationResult, DataQuality, DualScope2, EmissionFactor,
};

/// Dual-method Scope 2.
///
/// Location-based ignores renewable purchases. Market-based credits them at
/// zero emissions (no residual-mix factor). With `renewable ≥ 0` the
/// market figure never exceeds the location figure.
pub fn calculate_electricity(
    consumption: f64,
    renewable_portion: f64,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    let grid = factor.total_co2e_factor;
    let dual = DualScope2 {
        location_based_emissions: consumption * grid,
        market_based_emissions: (consumption - renewable_portion) * grid,
    };
    let mut result = ctx.combined(
        factor,
        consumption,
        CalculationMethod::ElectricityDualMethod,
        DataQuality::Measured,
    );
    result.total_co2e_emissions = dual.market_based_emissions;
    result.electricity = Some(dual);
    result
}
