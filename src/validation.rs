//! Required-field and numeric sanity checks, run before any factor lookup
//! or arithmetic. A payload that passes comes out as a [`ValidatedActivity`]
//! with every value the matching calculator needs.

use chrono::NaiveDate;

use crate::activity::{
    ActivityInput, ActivityPayload, FugitiveInput, FugitiveMethod, MobileCombustionInput,
    MobileMethod, ProcessEmissionsInput, PurchasedElectricityInput, StationaryCombustionInput,
    ValueChainInput,
};
use crate::error::{EngineError, EngineResult};
use crate::factor_store::FactorFilter;
use crate::types::{Scope, SubCategory};

/// Fuel key used for grid electricity factors.
pub const GRID_ELECTRICITY: &str = "Electricity";

#[derive(Debug, Clone, PartialEq)]
pub enum Leakage {
    Direct {
        quantity_leaked: f64,
    },
    MassBalance {
        beginning_inventory: f64,
        purchases: f64,
        sales_transfers: f64,
        ending_inventory: f64,
    },
    /// No leakage records at all: capacity times the leak rate, or the
    /// whole charge when no rate is given.
    CapacityEstimate {
        equipment_capacity: f64,
        leak_rate: Option<f64>,
    },
}

impl Leakage {
    /// Leaked refrigerant in kg.
    pub fn leaked_kg(&self) -> f64 {
        match *self {
            Leakage::Direct { quantity_leaked } => quantity_leaked,
            Leakage::MassBalance {
                beginning_inventory,
                purchases,
                sales_transfers,
                ending_inventory,
            } => beginning_inventory + purchases - sales_transfers - ending_inventory,
            Leakage::CapacityEstimate {
                equipment_capacity,
                leak_rate,
            } => match leak_rate {
                Some(rate) => equipment_capacity * rate,
                None => equipment_capacity,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedKind {
    Stationary {
        quantity: f64,
        fuel_type: String,
    },
    Mobile {
        method: MobileMethod,
        quantity: f64,
        fuel_type: String,
        vehicle_type: Option<String>,
    },
    Fugitive {
        refrigerant_type: String,
        leakage: Leakage,
    },
    Electricity {
        consumption: f64,
        renewable_portion: f64,
    },
    Process {
        process_type: String,
        quantity: f64,
    },
    ValueChain {
        category: u8,
        activity_type: String,
        quantity: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedActivity {
    pub unit: Option<String>,
    pub kind: ValidatedKind,
}

impl ValidatedActivity {
    /// Factor query for this activity in `country` as of `as_of`.
    pub fn factor_filter(&self, country: &str, as_of: Option<NaiveDate>) -> FactorFilter {
        let (category, sub_category, fuel, vehicle) = match &self.kind {
            ValidatedKind::Stationary { fuel_type, .. } => {
                (Scope::Scope1, SubCategory::Stationary, fuel_type.clone(), None)
            }
            ValidatedKind::Mobile {
                method,
                fuel_type,
                vehicle_type,
                ..
            } => {
                let vehicle = match method {
                    MobileMethod::FuelBased => None,
                    MobileMethod::DistanceBased => vehicle_type.clone(),
                };
                (Scope::Scope1, SubCategory::Mobile, fuel_type.clone(), vehicle)
            }
            ValidatedKind::Fugitive {
                refrigerant_type, ..
            } => (Scope::Scope1, SubCategory::Fugitive, refrigerant_type.clone(), None),
            ValidatedKind::Electricity { .. } => (
                Scope::Scope2,
                SubCategory::Grid,
                GRID_ELECTRICITY.to_string(),
                None,
            ),
            ValidatedKind::Process { process_type, .. } => {
                (Scope::Scope1, SubCategory::Process, process_type.clone(), None)
            }
            ValidatedKind::ValueChain { activity_type, .. } => (
                Scope::Scope3,
                SubCategory::ValueChain,
                activity_type.clone(),
                None,
            ),
        };
        FactorFilter {
            category,
            sub_category,
            fuel_or_gas_type: fuel,
            vehicle_type: vehicle,
            country: country.to_string(),
            as_of,
        }
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> EngineResult<T> {
    value.ok_or(EngineError::MissingField(field))
}

fn required_text(field: &'static str, value: &Option<String>) -> EngineResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(EngineError::MissingField(field)),
    }
}

/// Finite and non-negative.
fn number(field: &'static str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() {
        return Err(EngineError::InvalidNumericValue {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(EngineError::InvalidNumericValue {
            field,
            value,
            reason: "must not be negative",
        });
    }
    Ok(value)
}

fn optional_number(field: &'static str, value: Option<f64>) -> EngineResult<Option<f64>> {
    value.map(|v| number(field, v)).transpose()
}

fn required_number(field: &'static str, value: Option<f64>) -> EngineResult<f64> {
    number(field, required(field, value)?)
}

pub fn validate(input: &ActivityInput) -> EngineResult<ValidatedActivity> {
    let kind = match &input.payload {
        ActivityPayload::StationaryCombustion(p) => validate_stationary(p)?,
        ActivityPayload::MobileCombustion(p) => validate_mobile(p)?,
        ActivityPayload::Fugitive(p) => validate_fugitive(p)?,
        ActivityPayload::PurchasedElectricity(p) => validate_electricity(p)?,
        ActivityPayload::ProcessEmissions(p) => validate_process(p)?,
        ActivityPayload::ValueChain(p) => validate_value_chain(p)?,
    };
    let unit = input
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    Ok(ValidatedActivity { unit, kind })
}

fn validate_stationary(p: &StationaryCombustionInput) -> EngineResult<ValidatedKind> {
    let quantity = required_number("consumptionQuantity", p.consumption_quantity)?;
    if quantity == 0.0 {
        return Err(EngineError::InvalidNumericValue {
            field: "consumptionQuantity",
            value: quantity,
            reason: "must be greater than zero",
        });
    }
    let fuel_type = required_text("fuelType", &p.fuel_type)?;
    Ok(ValidatedKind::Stationary {
        quantity,
        fuel_type,
    })
}

fn validate_mobile(p: &MobileCombustionInput) -> EngineResult<ValidatedKind> {
    let method = required("calculationMethod", p.calculation_method)?;
    let fuel_type = required_text("fuelType", &p.fuel_type)?;
    let fuel = optional_number("fuelConsumption", p.fuel_consumption)?;
    let distance = optional_number("distanceTraveled", p.distance_traveled)?;

    // Zero in the unused field counts as absent.
    let (quantity, other, other_field) = match method {
        MobileMethod::FuelBased => (fuel, distance, "distanceTraveled"),
        MobileMethod::DistanceBased => (distance, fuel, "fuelConsumption"),
    };
    if other.is_some_and(|v| v > 0.0) {
        return Err(EngineError::InvalidActivityInput(format!(
            "{other_field} must not be set for a {method:?} calculation"
        )));
    }
    let quantity = match quantity {
        Some(q) if q > 0.0 => q,
        _ => {
            let expected = match method {
                MobileMethod::FuelBased => "fuelConsumption",
                MobileMethod::DistanceBased => "distanceTraveled",
            };
            return Err(EngineError::InvalidActivityInput(format!(
                "{method:?} calculation requires a positive {expected}"
            )));
        }
    };
    let vehicle_type = match method {
        MobileMethod::FuelBased => p.vehicle_type.clone(),
        MobileMethod::DistanceBased => Some(required_text("vehicleType", &p.vehicle_type)?),
    };
    Ok(ValidatedKind::Mobile {
        method,
        quantity,
        fuel_type,
        vehicle_type,
    })
}

fn validate_fugitive(p: &FugitiveInput) -> EngineResult<ValidatedKind> {
    let method = required("calculationMethod", p.calculation_method)?;
    let refrigerant_type = required_text("refrigerantType", &p.refrigerant_type)?;

    let leakage = if method == FugitiveMethod::MassBalance {
        let leakage = Leakage::MassBalance {
            beginning_inventory: required_number("beginningInventory", p.beginning_inventory)?,
            purchases: required_number("purchases", p.purchases)?,
            sales_transfers: required_number("salesTransfers", p.sales_transfers)?,
            ending_inventory: required_number("endingInventory", p.ending_inventory)?,
        };
        let leaked = leakage.leaked_kg();
        if leaked < 0.0 {
            return Err(EngineError::InvalidActivityInput(format!(
                "mass balance yields negative leakage ({leaked} kg)"
            )));
        }
        leakage
    } else if let Some(quantity_leaked) = optional_number("quantityLeaked", p.quantity_leaked)? {
        Leakage::Direct { quantity_leaked }
    } else if let Some(equipment_capacity) =
        optional_number("equipmentCapacity", p.equipment_capacity)?
    {
        let leak_rate = optional_number("leakRate", p.leak_rate)?;
        if let Some(rate) = leak_rate {
            if rate > 1.0 {
                return Err(EngineError::InvalidNumericValue {
                    field: "leakRate",
                    value: rate,
                    reason: "must be a fraction between 0 and 1",
                });
            }
        }
        Leakage::CapacityEstimate {
            equipment_capacity,
            leak_rate,
        }
    } else {
        return Err(EngineError::InvalidActivityInput(
            "no leakage data: provide quantityLeaked or equipmentCapacity".to_string(),
        ));
    };

    Ok(ValidatedKind::Fugitive {
        refrigerant_type,
        leakage,
    })
}

fn validate_electricity(p: &PurchasedElectricityInput) -> EngineResult<ValidatedKind> {
    let consumption = required_number("consumptionQuantity", p.consumption_quantity)?;
    let renewable_portion =
        optional_number("renewableEnergyPortion", p.renewable_energy_portion)?.unwrap_or(0.0);
    if renewable_portion > consumption {
        return Err(EngineError::InvalidActivityInput(format!(
            "renewableEnergyPortion ({renewable_portion}) exceeds \
             consumptionQuantity ({consumption})"
        )));
    }
    Ok(ValidatedKind::Electricity {
        consumption,
        renewable_portion,
    })
}

fn validate_process(p: &ProcessEmissionsInput) -> EngineResult<ValidatedKind> {
    let quantity = required_number("productionQuantity", p.production_quantity)?;
    let process_type = required_text("processType", &p.process_type)?;
    Ok(ValidatedKind::Process {
        process_type,
        quantity,
    })
}

fn validate_value_chain(p: &ValueChainInput) -> EngineResult<ValidatedKind> {
    let category = required("category", p.category)?;
    if !(1..=15).contains(&category) {
        return Err(EngineError::InvalidActivityInput(format!(
            "Scope 3 category must be 1-15, got {category}"
        )));
    }
    let activity_type = required_text("activityType", &p.activity_type)?;
    let quantity = required_number("quantity", p.quantity)?;
    Ok(ValidatedKind::ValueChain {
        category,
        activity_type,
        quantity,
    })
}
