//! Filter transmission curves

use crate::algo::misc::interp;

use super::FilterError;

/// Upper bound on the length of a uniformly resampled curve
pub const MAX_UNIFORM_SAMPLES: usize = 10_000_000;

/// Transmission of one photometric bandpass as a function of wavelength
///
/// Stores wavelength-transmission pairs sorted by wavelength and provides
/// methods to evaluate the transmission anywhere inside the tabulated range.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCurve {
    id: String,

    /// Wavelengths in Ångstrom, strictly ascending
    wavelengths: Vec<f64>,

    /// Non-negative transmission for each wavelength
    transmissions: Vec<f64>,
}

impl FilterCurve {
    /// Create a new FilterCurve from wavelength and transmission tables
    ///
    /// # Arguments
    ///
    /// * `id` - Filter identifier, e.g. `"r"` or `"F660"`
    /// * `wavelengths` - Wavelengths in Ångstrom, must be strictly ascending
    /// * `transmissions` - Transmission value for each wavelength
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The vectors have different lengths
    /// - The table is empty
    /// - Wavelengths are not in strictly ascending order
    /// - Any wavelength or transmission is negative or not finite
    pub fn from_table(
        id: impl Into<String>,
        wavelengths: Vec<f64>,
        transmissions: Vec<f64>,
    ) -> Result<Self, FilterError> {
        let id = id.into();

        if wavelengths.len() != transmissions.len() {
            return Err(FilterError::LengthMismatch {
                filter_id: id,
                wavelengths: wavelengths.len(),
                transmissions: transmissions.len(),
            });
        }

        if wavelengths.is_empty() {
            return Err(FilterError::Empty(id));
        }

        for (&wl, &t) in wavelengths.iter().zip(transmissions.iter()) {
            if !wl.is_finite() || wl < 0.0 || !t.is_finite() || t < 0.0 {
                return Err(FilterError::InvalidValue {
                    filter_id: id,
                    wavelength: wl,
                    transmission: t,
                });
            }
        }

        for i in 1..wavelengths.len() {
            if wavelengths[i] <= wavelengths[i - 1] {
                return Err(FilterError::NotAscending {
                    filter_id: id,
                    index: i,
                });
            }
        }

        Ok(Self {
            id,
            wavelengths,
            transmissions,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn transmissions(&self) -> &[f64] {
        &self.transmissions
    }

    /// Number of tabulated samples (always at least one)
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn min_wavelength(&self) -> f64 {
        self.wavelengths[0]
    }

    pub fn max_wavelength(&self) -> f64 {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    /// Unweighted mean of the sample wavelengths
    ///
    /// This is the plain average of the tabulated grid, not the
    /// transmission-weighted effective wavelength. Handy as a plotting
    /// position for the filter.
    pub fn mean_wavelength(&self) -> f64 {
        self.wavelengths.iter().sum::<f64>() / self.wavelengths.len() as f64
    }

    /// Transmission at a wavelength, linearly interpolated
    ///
    /// Outside the tabulated range the end values are held.
    pub fn at(&self, wavelength: f64) -> f64 {
        // The constructor guarantees a valid, non-empty table
        interp(wavelength, &self.wavelengths, &self.transmissions).unwrap_or(0.0)
    }

    /// Resample the curve onto a uniform grid with spacing `delta_lambda`
    ///
    /// The grid runs `min, min + Δ, min + 2Δ, …` and stops before `max`.
    /// A single-sample curve is returned unchanged, and a curve whose span
    /// is shorter than Δ collapses to its first sample. A step that would
    /// need more than [`MAX_UNIFORM_SAMPLES`] samples is rejected.
    pub fn resample_uniform(&self, delta_lambda: f64) -> Result<Self, FilterError> {
        if !delta_lambda.is_finite() || delta_lambda <= 0.0 {
            return Err(FilterError::InvalidDelta(delta_lambda));
        }

        if self.len() < 2 {
            return Ok(self.clone());
        }

        let start = self.min_wavelength();
        let stop = self.max_wavelength();
        // Steps below one ulp of the grid would repeat wavelengths
        if stop + delta_lambda == stop {
            return Err(FilterError::InvalidDelta(delta_lambda));
        }

        let n_steps = ((stop - start) / delta_lambda).ceil();
        if n_steps > MAX_UNIFORM_SAMPLES as f64 {
            return Err(FilterError::InvalidDelta(delta_lambda));
        }
        let n_steps = n_steps as usize;

        let wavelengths: Vec<f64> = (0..n_steps)
            .map(|i| start + i as f64 * delta_lambda)
            .filter(|&wl| wl < stop)
            .collect();
        let transmissions: Vec<f64> = wavelengths.iter().map(|&wl| self.at(wl)).collect();

        Self::from_table(self.id.clone(), wavelengths, transmissions)
    }
}
