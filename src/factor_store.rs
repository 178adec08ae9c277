use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{EmissionFactor, Scope, SubCategory};

/// Query primitive against the factor store. String keys compare
/// ASCII-case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorFilter {
    pub category: Scope,
    pub sub_category: SubCategory,
    pub fuel_or_gas_type: String,
    /// `None` matches only factors without a vehicle class.
    pub vehicle_type: Option<String>,
    pub country: String,
    /// When set, the factor window must contain this date.
    pub as_of: Option<NaiveDate>,
}

pub(crate) fn same_key(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl FactorFilter {
    pub fn matches(&self, factor: &EmissionFactor) -> bool {
        if !factor.is_active {
            return false;
        }
        if factor.category != self.category || factor.sub_category != self.sub_category {
            return false;
        }
        if !same_key(&factor.fuel_or_gas_type, &self.fuel_or_gas_type) {
            return false;
        }
        let vehicle_ok = match (&self.vehicle_type, &factor.vehicle_type) {
            (None, None) => true,
            (Some(want), Some(have)) => same_key(want, have),
            _ => false,
        };
        if !vehicle_ok || !same_key(&factor.country, &self.country) {
            return false;
        }
        match self.as_of {
            Some(date) => factor.covers(date),
            None => true,
        }
    }

    /// Same filter, different geography.
    pub fn with_country(&self, country: &str) -> Self {
        FactorFilter {
            country: country.to_string(),
            ..self.clone()
        }
    }
}

/// External lookup service for published emission factors.
pub trait FactorStore {
    /// Returns every factor matching `filter`, latest `valid_from` first.
    fn find_factors(&self, filter: &FactorFilter) -> Vec<EmissionFactor>;
}

/// Vec-backed factor table, validated on insertion.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactorStore {
    factors: Vec<EmissionFactor>,
}

impl InMemoryFactorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_factors<I>(factors: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = EmissionFactor>,
    {
        let mut store = Self::new();
        for factor in factors {
            store.insert(factor)?;
        }
        Ok(store)
    }

    /// Load a JSON array of factor records.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let factors: Vec<EmissionFactor> =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidFactor(e.to_string()))?;
        Self::from_factors(factors)
    }

    pub fn insert(&mut self, factor: EmissionFactor) -> EngineResult<()> {
        factor.validate()?;
        self.factors.push(factor);
        Ok(())
    }

    /// Retire a factor without deleting it.
    pub fn deactivate(&mut self, id: uuid::Uuid) -> bool {
        match self.factors.iter_mut().find(|f| f.id == id) {
            Some(f) => {
                f.is_active = false;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl FactorStore for InMemoryFactorStore {
    fn find_factors(&self, filter: &FactorFilter) -> Vec<EmissionFactor> {
        let mut hits: Vec<EmissionFactor> = self
            .factors
            .iter()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            b.valid_from
                .cmp(&a.valid_from)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.id.cmp(&b.id))
        });
        hits
    }
}
