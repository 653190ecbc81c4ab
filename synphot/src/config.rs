//! Photometry configuration
//!
//! Stored as pretty-printed JSON so a run can be reproduced from the file
//! alongside its magnitude table.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photometry::convert::DEFAULT_BAD_PIXEL_TOLERANCE;

/// Errors from loading or validating a [`PhotometryConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parameters shared by every conversion of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometryConfig {
    /// Maximum fraction of bad samples tolerated inside a filter window
    pub bad_pixel_tolerance: f64,
    /// Uniform grid step in Ångstrom used when `resample_filters` is set
    pub delta_lambda: f64,
    /// Resample filter curves to a uniform grid before photometry
    pub resample_filters: bool,
    /// Process the filters of a set in parallel
    pub parallel: bool,
}

impl Default for PhotometryConfig {
    fn default() -> Self {
        Self {
            bad_pixel_tolerance: DEFAULT_BAD_PIXEL_TOLERANCE,
            delta_lambda: 1.0,
            resample_filters: false,
            parallel: true,
        }
    }
}

impl PhotometryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bad_pixel_tolerance.is_finite() || self.bad_pixel_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "bad_pixel_tolerance",
                value: self.bad_pixel_tolerance,
            });
        }
        if !self.delta_lambda.is_finite() || self.delta_lambda <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "delta_lambda",
                value: self.delta_lambda,
            });
        }
        Ok(())
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Command-line style overrides layered on top of a [`PhotometryConfig`]
///
/// `None` and `false` leave the base value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub bad_pixel_tolerance: Option<f64>,
    pub delta_lambda: Option<f64>,
    pub resample_filters: bool,
    pub sequential: bool,
}

impl ConfigOverrides {
    /// Apply to `base` and validate the result
    pub fn apply(&self, base: PhotometryConfig) -> Result<PhotometryConfig, ConfigError> {
        let mut config = base;
        if let Some(tolerance) = self.bad_pixel_tolerance {
            config.bad_pixel_tolerance = tolerance;
        }
        if let Some(delta_lambda) = self.delta_lambda {
            config.delta_lambda = delta_lambda;
        }
        if self.resample_filters {
            config.resample_filters = true;
        }
        if self.sequential {
            config.parallel = false;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load `path` (or the defaults when absent) and apply the overrides
    pub fn resolve(&self, path: Option<&Path>) -> Result<PhotometryConfig, ConfigError> {
        let base = match path {
            Some(path) => PhotometryConfig::load_from_file(path)?,
            None => PhotometryConfig::default(),
        };
        self.apply(base)
    }
}
