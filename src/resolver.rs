use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::factor_store::{same_key, FactorFilter, FactorStore};
use crate::types::EmissionFactor;

/// Picks the single applicable factor for an activity.
///
/// Country-specific records win over the global sentinel; within one
/// geography the store's ordering (latest `valid_from` first) decides.
/// Never substitutes a default: no match is `FactorNotFound`.
pub struct FactorResolver<'a, S: FactorStore> {
    store: &'a S,
    global_region: &'a str,
}

impl<'a, S: FactorStore> FactorResolver<'a, S> {
    pub fn new(store: &'a S, global_region: &'a str) -> Self {
        FactorResolver {
            store,
            global_region,
        }
    }

    pub fn resolve(&self, filter: &FactorFilter) -> EngineResult<EmissionFactor> {
        if let Some(factor) = self.store.find_factors(filter).into_iter().next() {
            debug!(
                factor_id = %factor.id,
                fuel = %filter.fuel_or_gas_type,
                country = %filter.country,
                source = %factor.source,
                "resolved country factor"
            );
            return Ok(factor);
        }

        if !same_key(&filter.country, self.global_region) {
            let global = filter.with_country(self.global_region);
            if let Some(factor) = self.store.find_factors(&global).into_iter().next() {
                debug!(
                    factor_id = %factor.id,
                    fuel = %filter.fuel_or_gas_type,
                    country = %filter.country,
                    "no country factor, using global factor"
                );
                return Ok(factor);
            }
        }

        let fuel_type = match &filter.vehicle_type {
            Some(vehicle) => format!("{vehicle}/{}", filter.fuel_or_gas_type),
            None => filter.fuel_or_gas_type.clone(),
        };
        Err(EngineError::FactorNotFound {
            fuel_type,
            country: filter.country.clone(),
        })
    }
}
