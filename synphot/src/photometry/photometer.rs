//! Configured entry point for converting observations to magnitudes

use crate::config::{ConfigError, PhotometryConfig};
use crate::filters::{FilterCurve, FilterError, FilterSet};

use super::convert::{convert, PhotometryError};
use super::filterset::{convert_all, par_convert_all};
use super::spectrum::{MagnitudeResult, Observation};

/// Applies a [`PhotometryConfig`] to single filters and whole filter sets
#[derive(Debug, Clone, Default)]
pub struct Photometer {
    config: PhotometryConfig,
}

impl Photometer {
    pub fn new(config: PhotometryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PhotometryConfig {
        &self.config
    }

    /// Filter set as it will be used for photometry, resampled to the
    /// configured uniform grid when `resample_filters` is set
    pub fn prepare(&self, filter_set: &FilterSet) -> Result<FilterSet, FilterError> {
        if self.config.resample_filters {
            filter_set.resample_uniform(self.config.delta_lambda)
        } else {
            Ok(filter_set.clone())
        }
    }

    /// Magnitude and error of `observation` through one filter
    pub fn convert(
        &self,
        filter: &FilterCurve,
        observation: &Observation,
    ) -> Result<(f64, f64), PhotometryError> {
        convert(
            filter,
            &observation.spectrum,
            observation.model.as_ref(),
            self.config.bad_pixel_tolerance,
        )
    }

    /// One result per filter of a prepared set, in ascending filter id order
    pub fn convert_all(
        &self,
        filter_set: &FilterSet,
        observation: &Observation,
    ) -> Vec<MagnitudeResult> {
        let spectrum = &observation.spectrum;
        let model = observation.model.as_ref();
        let tolerance = self.config.bad_pixel_tolerance;

        if self.config.parallel {
            par_convert_all(filter_set, spectrum, model, tolerance)
        } else {
            convert_all(filter_set, spectrum, model, tolerance)
        }
    }
}
