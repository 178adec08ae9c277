use super::CalcContext;
use crate::activity::MobileMethod;
use crate::types::{CalculationMethod, CalculationResult, DataQuality, EmissionFactor};

/// Fuel-based: litres × per-litre factor for the fuel.
/// Distance-based: km × per-km factor for the vehicle class and fuel.
pub fn calculate_mobile(
    method: MobileMethod,
    quantity: f64,
    factor: &EmissionFactor,
    ctx: &CalcContext,
) -> CalculationResult {
    let tag = match method {
        MobileMethod::FuelBased => CalculationMethod::MobileFuelBased,
        MobileMethod::DistanceBased => CalculationMethod::MobileDistanceBased,
    };
    ctx.combined(factor, quantity, tag, DataQuality::Measured)
}
