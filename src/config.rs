//! Engine configuration, loaded from TOML.
//!
//! Every key has a default, so an empty file yields a working engine:
//!
//! ```toml
//! global_region = "Global"
//! gwp_set = "ar4"
//! max_conflict_retries = 3
//! log_filter = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gwp::GwpSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sentinel country the resolver falls back to.
    pub global_region: String,
    pub gwp_set: GwpSet,
    /// Attempts at the load/compute/save cycle before giving up on a
    /// conflicting report.
    pub max_conflict_retries: u32,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            global_region: "Global".to_string(),
            gwp_set: GwpSet::Ar4,
            max_conflict_retries: 3,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.global_region.trim().is_empty() {
            return Err(ConfigError::Validation(
                "global_region must not be empty".to_string(),
            ));
        }
        if self.max_conflict_retries == 0 {
            return Err(ConfigError::Validation(
                "max_conflict_retries must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
