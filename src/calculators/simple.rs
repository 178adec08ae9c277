use super::CalcContext;
use crate::types::{CalculationMethod, CalculationResult, DataQuality, EmissionFactor};

/// Industrial process emissions: production quantity × process factor.
pub fn calculate_process(
    quantity: f64,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    ctx.combined(
        factor,
        quantity,
        CalculationMethod::ProcessEmissions,
        DataQuality::Measured,
    )
}

/// Scope 3 placeholder: quantity × factor, no value-chain modelling.
pub fn calculate_value_chain(
    quantity: f64,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    ctx.combined(
        factor,
        quantity,
        CalculationMethod::ValueChainFactor,
        DataQuality::Measured,
    )
}
