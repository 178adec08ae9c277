use thiserror::Error;
use uuid::Uuid;

/// Coarse error class for the transport layer (404 / 400 / 409 / 500).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    InvalidInput,
    Conflict,
    Integrity,
}

/// Errors for factor resolution, activity validation and report persistence.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("no emission factor for fuel/gas '{fuel_type}' in '{country}'")]
    FactorNotFound { fuel_type: String, country: String },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid activity input: {0}")]
    InvalidActivityInput(String),
    #[error("invalid numeric value for {field}: {value} ({reason})")]
    InvalidNumericValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("unit mismatch: factor expects '{expected}', activity reports '{found}'")]
    UnitMismatch { expected: String, found: String },
    #[error("invalid emission factor: {0}")]
    InvalidFactor(String),
    #[error("report {0} not found")]
    ReportNotFound(Uuid),
    #[error("activity {0} not found")]
    ActivityNotFound(Uuid),
    #[error("report {report_id} changed concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        report_id: Uuid,
        expected: u64,
        found: u64,
    },
    #[error("report {report_id} still conflicting after {attempts} attempts")]
    ConflictRetriesExhausted { report_id: Uuid, attempts: u32 },
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::FactorNotFound { .. }
            | EngineError::ReportNotFound(_)
            | EngineError::ActivityNotFound(_) => ErrorClass::NotFound,
            EngineError::MissingField(_)
            | EngineError::InvalidActivityInput(_)
            | EngineError::InvalidNumericValue { .. }
            | EngineError::UnitMismatch { .. } => ErrorClass::InvalidInput,
            EngineError::VersionConflict { .. } | EngineError::ConflictRetriesExhausted { .. } => {
                ErrorClass::Conflict
            }
            EngineError::InvalidFactor(_) => ErrorClass::Integrity,
        }
    }
}

/// Errors raised while loading [`crate::config::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
