use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::pagination::PAGE_SIZE;
use crate::errors::SweepError;
use crate::filter::InclusionPolicy;
use crate::schema::FieldDetection;

/// Top-level sweep configuration.
///
/// Loadable from a JSON file; unset keys fall back to the defaults below.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Number of records requested per page.
    pub page_size: usize,
    /// Which schema field shapes count as file-bearing.
    pub detection: FieldDetection,
    /// Policy applied to extracted descriptors before forwarding.
    pub policy: InclusionPolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            detection: FieldDetection::DirectAndArray,
            policy: InclusionPolicy::Baseline,
        }
    }
}

impl SweepConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SweepError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: SweepConfig = serde_json::from_str(&raw).map_err(|err| {
            SweepError::Configuration(format!("cannot parse {}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pagination driver cannot honor.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.page_size == 0 {
            return Err(SweepError::Configuration(
                "page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
