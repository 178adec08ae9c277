use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::gwp::GwpSet;

/// GHG Protocol accounting scope.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

/// Bucket inside a scope that an activity and its factor belong to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SubCategory {
    Stationary,
    Mobile,
    Fugitive,
    Process,
    Grid,
    ValueChain,
}

impl SubCategory {
    pub const fn scope(self) -> Scope {
        match self {
            SubCategory::Stationary
            | SubCategory::Mobile
            | SubCategory::Fugitive
            | SubCategory::Process => Scope::Scope1,
            SubCategory::Grid => Scope::Scope2,
            SubCategory::ValueChain => Scope::Scope3,
        }
    }
}

fn default_active() -> bool {
    true
}

/// One published conversion rate, valid over `[valid_from, valid_to)`.
///
/// `total_co2e_factor` is authoritative for CO2e even when the split gas
/// factors are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactor {
    pub id: Uuid,
    pub category: Scope,
    pub sub_category: SubCategory,
    pub source: String,
    pub fuel_or_gas_type: String,
    /// Only set for distance-based mobile factors (per-km, per vehicle class).
    #[serde(default)]
    pub vehicle_type: Option<String>,
    pub country: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    #[serde(default)]
    pub co2_factor: Option<f64>,
    #[serde(default)]
    pub ch4_factor: Option<f64>,
    #[serde(default)]
    pub n2o_factor: Option<f64>,
    pub total_co2e_factor: f64,
    /// Emission per activity unit, e.g. `kgCO2e/litre`.
    pub unit: String,
    #[serde(default)]
    pub uncertainty_percent: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl EmissionFactor {
    /// Checks the record invariants: a non-empty window and finite,
    /// non-negative factor values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.valid_to <= self.valid_from {
            return Err(EngineError::InvalidFactor(format!(
                "factor {} has validTo {} not after validFrom {}",
                self.id, self.valid_to, self.valid_from
            )));
        }
        let values = [
            ("co2Factor", self.co2_factor),
            ("ch4Factor", self.ch4_factor),
            ("n2oFactor", self.n2o_factor),
            ("totalCo2eFactor", Some(self.total_co2e_factor)),
            ("uncertaintyPercent", self.uncertainty_percent),
        ];
        for (name, value) in values {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(EngineError::InvalidFactor(format!(
                        "factor {} has {name} = {v}",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Half-open validity check.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date < self.valid_to
    }

    /// Denominator of the factor unit: the unit activity quantities must be in.
    pub fn activity_unit(&self) -> &str {
        match self.unit.split_once('/') {
            Some((_, per)) => per.trim(),
            None => self.unit.trim(),
        }
    }

    pub fn snapshot(&self) -> FactorSnapshot {
        FactorSnapshot {
            factor_id: self.id,
            value: self.total_co2e_factor,
            unit: self.unit.clone(),
            source: self.source.clone(),
            fuel_or_gas_type: self.fuel_or_gas_type.clone(),
            country: self.country.clone(),
            year: self.valid_from.year(),
            uncertainty_percent: self.uncertainty_percent,
        }
    }
}

/// Factor provenance embedded in every result. Results keep this copy and
/// are not re-priced when the factor table changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSnapshot {
    pub factor_id: Uuid,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub fuel_or_gas_type: String,
    pub country: String,
    pub year: i32,
    pub uncertainty_percent: Option<f64>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CalculationMethod {
    StationaryCombustion,
    MobileFuelBased,
    MobileDistanceBased,
    FugitiveDirect,
    FugitiveMassBalance,
    FugitiveCapacityEstimate,
    ElectricityDualMethod,
    ProcessEmissions,
    ValueChainFactor,
}

/// Whether a figure comes from measured activity data or a heuristic.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DataQuality {
    #[default]
    Measured,
    Estimated,
}

/// Per-gas emissions in kg CO2e (CH4 and N2O already GWP-weighted).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasBreakdown {
    pub co2_emissions: f64,
    pub ch4_emissions: f64,
    pub n2o_emissions: f64,
}

impl GasBreakdown {
    pub fn sum(&self) -> f64 {
        self.co2_emissions + self.ch4_emissions + self.n2o_emissions
    }
}

/// Dual Scope 2 figures in kg CO2e.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualScope2 {
    pub location_based_emissions: f64,
    pub market_based_emissions: f64,
}

/// Derived figure attached to an activity entry. All emission values in kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub factor: FactorSnapshot,
    pub gwp_set: GwpSet,
    /// Quantity the factor was applied to (litres, km, kWh, kg leaked, ...).
    pub activity_quantity: f64,
    #[serde(default)]
    pub gases: Option<GasBreakdown>,
    #[serde(default)]
    pub electricity: Option<DualScope2>,
    /// Market-based figure for electricity; authoritative CO2e otherwise.
    pub total_co2e_emissions: f64,
    pub method: CalculationMethod,
    #[serde(default)]
    pub data_quality: DataQuality,
    pub calculated_at: DateTime<Utc>,
}
