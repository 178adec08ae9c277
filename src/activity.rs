use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{CalculationResult, SubCategory};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MobileMethod {
    #[serde(rename = "fuel-based")]
    FuelBased,
    #[serde(rename = "distance-based")]
    DistanceBased,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FugitiveMethod {
    #[serde(rename = "Mass Balance")]
    MassBalance,
    #[serde(rename = "Direct Measurement")]
    DirectMeasurement,
    #[serde(rename = "Screening")]
    Screening,
}

// Payload fields are optional on the wire so validation can name the
// missing one instead of failing deserialization.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationaryCombustionInput {
    pub consumption_quantity: Option<f64>,
    pub fuel_type: Option<String>,
    pub equipment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileCombustionInput {
    pub calculation_method: Option<MobileMethod>,
    pub fuel_consumption: Option<f64>,
    pub distance_traveled: Option<f64>,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
}

/// Refrigerant leakage. Direct measurement, a mass balance over the
/// inventory records, or a capacity-based estimate when neither exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FugitiveInput {
    pub calculation_method: Option<FugitiveMethod>,
    pub refrigerant_type: Option<String>,
    pub quantity_leaked: Option<f64>,
    pub beginning_inventory: Option<f64>,
    pub purchases: Option<f64>,
    pub sales_transfers: Option<f64>,
    pub ending_inventory: Option<f64>,
    /// Charge of the equipment in kg.
    pub equipment_capacity: Option<f64>,
    /// Annual leak fraction in `[0, 1]`.
    pub leak_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedElectricityInput {
    pub consumption_quantity: Option<f64>,
    pub renewable_energy_portion: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEmissionsInput {
    pub process_type: Option<String>,
    pub production_quantity: Option<f64>,
}

/// Simplified Scope 3 entry: quantity times a factor, tagged with its
/// GHG Protocol category (1-15).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChainInput {
    pub category: Option<u8>,
    pub activity_type: Option<String>,
    pub quantity: Option<f64>,
}

/// One variant per calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActivityPayload {
    StationaryCombustion(StationaryCombustionInput),
    MobileCombustion(MobileCombustionInput),
    Fugitive(FugitiveInput),
    PurchasedElectricity(PurchasedElectricityInput),
    ProcessEmissions(ProcessEmissionsInput),
    ValueChain(ValueChainInput),
}

impl ActivityPayload {
    pub const fn sub_category(&self) -> SubCategory {
        match self {
            ActivityPayload::StationaryCombustion(_) => SubCategory::Stationary,
            ActivityPayload::MobileCombustion(_) => SubCategory::Mobile,
            ActivityPayload::Fugitive(_) => SubCategory::Fugitive,
            ActivityPayload::PurchasedElectricity(_) => SubCategory::Grid,
            ActivityPayload::ProcessEmissions(_) => SubCategory::Process,
            ActivityPayload::ValueChain(_) => SubCategory::ValueChain,
        }
    }
}

/// What a client submits for one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    #[serde(default)]
    pub description: Option<String>,
    /// Unit of the activity quantity; must match the factor's.
    #[serde(default)]
    pub unit: Option<String>,
    /// Overrides the report's country for factor lookup.
    #[serde(default)]
    pub country: Option<String>,
    /// Date the factor window must contain. Undated activities are priced
    /// as of the first day of the report's reporting year.
    #[serde(default)]
    pub activity_date: Option<NaiveDate>,
    pub payload: ActivityPayload,
}

impl ActivityInput {
    pub fn new(payload: ActivityPayload) -> Self {
        ActivityInput {
            description: None,
            unit: None,
            country: None,
            activity_date: None,
            payload,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.activity_date = Some(date);
        self
    }
}

/// An activity attached to a report. The result is derived data: it is
/// only ever replaced by running a calculation again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub input: ActivityInput,
    #[serde(default)]
    result: Option<CalculationResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub(crate) fn calculated(input: ActivityInput, result: CalculationResult) -> Self {
        let now = result.calculated_at;
        ActivityEntry {
            id: Uuid::new_v4(),
            input,
            result: Some(result),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn recalculated(&self, input: ActivityInput, result: CalculationResult) -> Self {
        ActivityEntry {
            id: self.id,
            input,
            updated_at: result.calculated_at,
            result: Some(result),
            created_at: self.created_at,
        }
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    pub fn sub_category(&self) -> SubCategory {
        self.input.payload.sub_category()
    }

    #[cfg(test)]
    pub(crate) fn with_raw_result(input: ActivityInput, result: Option<CalculationResult>) -> Self {
        let now = Utc::now();
        ActivityEntry {
            id: Uuid::new_v4(),
            input,
            result,
            created_at: now,
            updated_at: now,
        }
    }
}
