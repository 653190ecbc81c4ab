//! Tabulated spectrum records consumed by the photometers
//!
//! An observed spectrum always carries wavelength and flux. Error and
//! quality-flag channels are optional, and which of them are present is
//! captured once in [`SpectrumChannels`] rather than probed per call.
//!
//! Units are whatever the source adapter produced: wavelengths must match
//! the filter curves (Ångstrom), fluxes are erg s⁻¹ cm⁻² Å⁻¹.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Structural problems with a spectrum record
#[derive(Debug, Error, PartialEq)]
pub enum SpectrumError {
    #[error("Channel '{channel}' has {got} samples, expected {expected}")]
    LengthMismatch {
        channel: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Wavelengths must be strictly increasing (index {0})")]
    NotAscending(usize),
}

/// Optional per-sample channels that accompany the flux
#[derive(Debug, Clone, PartialEq)]
pub enum SpectrumChannels {
    FluxOnly,
    FluxWithError { errors: Vec<f64> },
    FluxWithFlag { flags: Vec<i64> },
    FluxWithErrorAndFlag { errors: Vec<f64>, flags: Vec<i64> },
}

impl SpectrumChannels {
    pub fn errors(&self) -> Option<&[f64]> {
        match self {
            Self::FluxWithError { errors } | Self::FluxWithErrorAndFlag { errors, .. } => {
                Some(errors)
            }
            _ => None,
        }
    }

    pub fn flags(&self) -> Option<&[i64]> {
        match self {
            Self::FluxWithFlag { flags } | Self::FluxWithErrorAndFlag { flags, .. } => Some(flags),
            _ => None,
        }
    }

    fn check_len(&self, expected: usize) -> Result<(), SpectrumError> {
        if let Some(errors) = self.errors() {
            if errors.len() != expected {
                return Err(SpectrumError::LengthMismatch {
                    channel: "error",
                    expected,
                    got: errors.len(),
                });
            }
        }
        if let Some(flags) = self.flags() {
            if flags.len() != expected {
                return Err(SpectrumError::LengthMismatch {
                    channel: "flag",
                    expected,
                    got: flags.len(),
                });
            }
        }
        Ok(())
    }

    fn slice(&self, range: RangeInclusive<usize>) -> Self {
        match self {
            Self::FluxOnly => Self::FluxOnly,
            Self::FluxWithError { errors } => Self::FluxWithError {
                errors: errors[range].to_vec(),
            },
            Self::FluxWithFlag { flags } => Self::FluxWithFlag {
                flags: flags[range].to_vec(),
            },
            Self::FluxWithErrorAndFlag { errors, flags } => Self::FluxWithErrorAndFlag {
                errors: errors[range.clone()].to_vec(),
                flags: flags[range].to_vec(),
            },
        }
    }

    /// Same channel layout with no samples
    fn slice_empty(&self) -> Self {
        match self {
            Self::FluxOnly => Self::FluxOnly,
            Self::FluxWithError { .. } => Self::FluxWithError { errors: Vec::new() },
            Self::FluxWithFlag { .. } => Self::FluxWithFlag { flags: Vec::new() },
            Self::FluxWithErrorAndFlag { .. } => Self::FluxWithErrorAndFlag {
                errors: Vec::new(),
                flags: Vec::new(),
            },
        }
    }
}

fn check_ascending(wavelengths: &[f64]) -> Result<(), SpectrumError> {
    for i in 1..wavelengths.len() {
        // Written so that NaN also fails
        if !(wavelengths[i] > wavelengths[i - 1]) {
            return Err(SpectrumError::NotAscending(i));
        }
    }
    Ok(())
}

fn check_flux_len(wavelengths: &[f64], fluxes: &[f64]) -> Result<(), SpectrumError> {
    if wavelengths.len() != fluxes.len() {
        return Err(SpectrumError::LengthMismatch {
            channel: "flux",
            expected: wavelengths.len(),
            got: fluxes.len(),
        });
    }
    Ok(())
}

/// Index range of the samples whose wavelength lies in `[low, high]`
fn window_range(wavelengths: &[f64], low: f64, high: f64) -> Option<RangeInclusive<usize>> {
    let start = wavelengths.partition_point(|&wl| wl < low);
    let end = wavelengths.partition_point(|&wl| wl <= high);
    if start < end {
        Some(start..=end - 1)
    } else {
        None
    }
}

/// Observed spectrum with optional error and quality-flag channels
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRecord {
    wavelengths: Vec<f64>,
    fluxes: Vec<f64>,
    channels: SpectrumChannels,
}

impl SpectrumRecord {
    /// Build a record, validating channel lengths and the wavelength grid
    pub fn new(
        wavelengths: Vec<f64>,
        fluxes: Vec<f64>,
        channels: SpectrumChannels,
    ) -> Result<Self, SpectrumError> {
        check_flux_len(&wavelengths, &fluxes)?;
        channels.check_len(wavelengths.len())?;
        check_ascending(&wavelengths)?;

        Ok(Self {
            wavelengths,
            fluxes,
            channels,
        })
    }

    pub fn flux_only(wavelengths: Vec<f64>, fluxes: Vec<f64>) -> Result<Self, SpectrumError> {
        Self::new(wavelengths, fluxes, SpectrumChannels::FluxOnly)
    }

    pub fn with_error(
        wavelengths: Vec<f64>,
        fluxes: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self, SpectrumError> {
        Self::new(wavelengths, fluxes, SpectrumChannels::FluxWithError { errors })
    }

    pub fn with_flag(
        wavelengths: Vec<f64>,
        fluxes: Vec<f64>,
        flags: Vec<i64>,
    ) -> Result<Self, SpectrumError> {
        Self::new(wavelengths, fluxes, SpectrumChannels::FluxWithFlag { flags })
    }

    pub fn with_error_and_flag(
        wavelengths: Vec<f64>,
        fluxes: Vec<f64>,
        errors: Vec<f64>,
        flags: Vec<i64>,
    ) -> Result<Self, SpectrumError> {
        Self::new(
            wavelengths,
            fluxes,
            SpectrumChannels::FluxWithErrorAndFlag { errors, flags },
        )
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn fluxes(&self) -> &[f64] {
        &self.fluxes
    }

    pub fn channels(&self) -> &SpectrumChannels {
        &self.channels
    }

    pub fn errors(&self) -> Option<&[f64]> {
        self.channels.errors()
    }

    pub fn flags(&self) -> Option<&[i64]> {
        self.channels.flags()
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Samples inside the closed interval `[low, high]`, as a new record
    pub fn window(&self, low: f64, high: f64) -> SpectrumRecord {
        match window_range(&self.wavelengths, low, high) {
            Some(range) => SpectrumRecord {
                wavelengths: self.wavelengths[range.clone()].to_vec(),
                fluxes: self.fluxes[range.clone()].to_vec(),
                channels: self.channels.slice(range),
            },
            None => SpectrumRecord {
                wavelengths: Vec::new(),
                fluxes: Vec::new(),
                channels: self.channels.slice_empty(),
            },
        }
    }
}

/// Model (synthetic) spectrum used to fill bad observed samples
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpectrumRecord {
    wavelengths: Vec<f64>,
    fluxes: Vec<f64>,
}

impl ModelSpectrumRecord {
    pub fn new(wavelengths: Vec<f64>, fluxes: Vec<f64>) -> Result<Self, SpectrumError> {
        check_flux_len(&wavelengths, &fluxes)?;
        check_ascending(&wavelengths)?;
        Ok(Self {
            wavelengths,
            fluxes,
        })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn fluxes(&self) -> &[f64] {
        &self.fluxes
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Samples inside the closed interval `[low, high]`
    pub fn window(&self, low: f64, high: f64) -> ModelSpectrumRecord {
        match window_range(&self.wavelengths, low, high) {
            Some(range) => ModelSpectrumRecord {
                wavelengths: self.wavelengths[range.clone()].to_vec(),
                fluxes: self.fluxes[range].to_vec(),
            },
            None => ModelSpectrumRecord {
                wavelengths: Vec::new(),
                fluxes: Vec::new(),
            },
        }
    }
}

/// Uniform record handed over by source adapters: an observed spectrum and
/// an optional model for the same object
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub spectrum: SpectrumRecord,
    pub model: Option<ModelSpectrumRecord>,
}

impl Observation {
    pub fn new(spectrum: SpectrumRecord) -> Self {
        Self {
            spectrum,
            model: None,
        }
    }

    pub fn with_model(spectrum: SpectrumRecord, model: ModelSpectrumRecord) -> Self {
        Self {
            spectrum,
            model: Some(model),
        }
    }
}

/// Synthetic magnitude of one spectrum through one filter
///
/// Unmeasurable filters carry `+inf` for both magnitude and error.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeResult {
    pub filter_id: String,
    pub magnitude: f64,
    pub magnitude_error: f64,
}

impl MagnitudeResult {
    pub fn new(filter_id: impl Into<String>, magnitude: f64, magnitude_error: f64) -> Self {
        Self {
            filter_id: filter_id.into(),
            magnitude,
            magnitude_error,
        }
    }

    pub fn unmeasurable(filter_id: impl Into<String>) -> Self {
        Self::new(filter_id, f64::INFINITY, f64::INFINITY)
    }

    pub fn is_measurable(&self) -> bool {
        self.magnitude.is_finite()
    }
}
