#![forbid(unsafe_code)]

//! GHG emission calculation and aggregation engine.
//!
//! Turns reported activity data (fuel burned, refrigerant leaked, electricity
//! bought, ...) into kg CO2e using an explicit, traceable emission factor, and
//! folds the per-activity results into Scope 1 / 2 / 3 report totals.
//!
//! Storage of factors and reports sits behind the [`FactorStore`] and
//! [`ReportStore`] traits; in-memory implementations are provided.

pub mod activity;
pub mod aggregator;
pub mod calculators;
pub mod config;
pub mod engine;
pub mod error;
pub mod factor_store;
pub mod gwp;
pub mod report;
pub mod resolver;
pub mod types;
pub mod validation;

pub use activity::{
    ActivityEntry, ActivityInput, ActivityPayload, FugitiveInput, FugitiveMethod,
    MobileCombustionInput, MobileMethod, ProcessEmissionsInput, PurchasedElectricityInput,
    StationaryCombustionInput, ValueChainInput,
};
pub use aggregator::{recompute, Scope1Totals, Scope2Totals, Scope3Totals, ScopeSummary};
pub use config::EngineConfig;
pub use engine::{ActivityOutcome, EmissionEngine};
pub use error::{ConfigError, EngineError, EngineResult, ErrorClass};
pub use factor_store::{FactorFilter, FactorStore, InMemoryFactorStore};
pub use gwp::{GwpSet, GwpValues};
pub use report::{InMemoryReportStore, Report, ReportStore};
pub use resolver::FactorResolver;
pub use types::{
    CalculationMethod, CalculationResult, DataQuality, DualScope2, EmissionFactor,
    FactorSnapshot, GasBreakdown, Scope, SubCategory,
};
