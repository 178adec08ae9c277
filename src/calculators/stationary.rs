use super::CalcContext;
use crate::types::{
    CalculationMethod, CalculationResult, DataQuality, EmissionFactor, GasBreakdown,
};

/// Fuel burned in boilers, furnaces, generators.
///
/// Gas lines use the split factors (missing ones count as 0) weighted by
/// the context's GWP table. The total comes from the combined factor and
/// is authoritative: combined factors can include minor gases the split
/// lines leave out, so the two need not sum to the same figure.
pub fn calculate_stationary(
    quantity: f64,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    let gwp = ctx.gwp_set.values();
    let gases = GasBreakdown {
        co2_emissions: quantity * factor.co2_factor.unwrap_or(0.0),
        ch4_emissions: quantity * factor.ch4_factor.unwrap_or(0.0) * gwp.ch4,
        n2o_emissions: quantity * factor.n2o_factor.unwrap_or(0.0) * gwp.n2o,
    };
    let mut result = ctx.combined(
        factor,
        quantity,
        CalculationMethod::StationaryCombustion,
        DataQuality::Measured,
    );
    result.gases = Some(gases);
    result
}
