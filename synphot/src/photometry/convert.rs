//! Single-filter synthetic photometry
//!
//! Integrates an observed spectrum through one filter transmission curve
//! and returns the AB magnitude and its uncertainty:
//!
//! ```text
//! m_AB = -2.5 log10( ∫ f(λ) T(λ) λ dλ / ∫ T(λ) / λ dλ ) - 2.41
//! e_AB = 2.5/ln(10) · sqrt( Σ T² σ² λ² ) / Σ f T λ
//! ```
//!
//! Both integrals use the trapezoidal rule on the spectrum's own
//! wavelength grid inside the filter's range. Bad samples (negative flux,
//! non-positive error, or flag > 1) are filled from the model spectrum or
//! by interpolation from the good samples, provided they do not exceed the
//! bad-pixel tolerance. Otherwise the filter is reported as unmeasurable,
//! `(+inf, +inf)`.

use thiserror::Error;

use crate::algo::misc::{interp_onto, interp_onto_or, InterpError};
use crate::algo::trapezoid::{trapz, TrapezoidError};
use crate::filters::FilterCurve;

use super::spectrum::{ModelSpectrumRecord, SpectrumChannels, SpectrumError, SpectrumRecord};

/// AB zero-point offset for flux densities in erg s⁻¹ cm⁻² Å⁻¹
pub const AB_ZERO_POINT_OFFSET: f64 = -2.41;

/// 2.5 / ln(10), converts a relative flux error into magnitudes
pub const MAGNITUDE_ERROR_SCALE: f64 = 1.0857362047581294;

/// Default maximum fraction of bad samples allowed inside a filter window
pub const DEFAULT_BAD_PIXEL_TOLERANCE: f64 = 0.5;

/// Largest flag value still considered a good sample
const MAX_GOOD_FLAG: i64 = 1;

/// Errors raised while converting a spectrum to a magnitude
///
/// Numeric edge cases are not errors: they produce `(+inf, +inf)`.
#[derive(Debug, Error)]
pub enum PhotometryError {
    #[error("Invalid spectrum: {0}")]
    InvalidInput(#[from] SpectrumError),

    #[error("Interpolation failed: {0}")]
    Interpolation(#[from] InterpError),

    #[error("Integration failed: {0}")]
    Integration(#[from] TrapezoidError),
}

const UNMEASURABLE: (f64, f64) = (f64::INFINITY, f64::INFINITY);

/// Flags each windowed sample good (`true`) or bad (`false`)
///
/// Negative flux is always bad. Error and flag are only tested when the
/// record carries them.
fn classify_samples(fluxes: &[f64], channels: &SpectrumChannels) -> Vec<bool> {
    let flux_ok = |i: usize| fluxes[i] >= 0.0;

    match channels {
        SpectrumChannels::FluxOnly => (0..fluxes.len()).map(flux_ok).collect(),
        SpectrumChannels::FluxWithError { errors } => (0..fluxes.len())
            .map(|i| flux_ok(i) && errors[i] > 0.0)
            .collect(),
        SpectrumChannels::FluxWithFlag { flags } => (0..fluxes.len())
            .map(|i| flux_ok(i) && flags[i] <= MAX_GOOD_FLAG)
            .collect(),
        SpectrumChannels::FluxWithErrorAndFlag { errors, flags } => (0..fluxes.len())
            .map(|i| flux_ok(i) && errors[i] > 0.0 && flags[i] <= MAX_GOOD_FLAG)
            .collect(),
    }
}

/// Model flux on the observed grid, or `None` if the model has no samples
/// in the filter window
fn model_on_grid(
    model: &ModelSpectrumRecord,
    grid: &[f64],
    low: f64,
    high: f64,
) -> Result<Option<Vec<f64>>, PhotometryError> {
    let model_cut = model.window(low, high);

    if model_cut.is_empty() {
        log::warn!(
            "No model samples in [{}, {}], model will not be considered for this filter",
            low,
            high
        );
        return Ok(None);
    }

    if model_cut.wavelengths() == grid {
        return Ok(Some(model_cut.fluxes().to_vec()));
    }

    log::debug!("Model is not sampled like the observed spectrum, interpolating");
    let fluxes = interp_onto_or(grid, model_cut.wavelengths(), model_cut.fluxes(), 0.0, 0.0)?;
    Ok(Some(fluxes))
}

/// Convert a spectrum into an AB magnitude through one filter
///
/// # Arguments
///
/// * `filter` - Filter transmission curve
/// * `spectrum` - Observed spectrum, wavelengths in the filter's units
/// * `model` - Optional model spectrum used to fill bad samples
/// * `bad_pixel_tolerance` - Maximum tolerated fraction of bad samples
///
/// # Returns
///
/// `(magnitude, magnitude_error)`. The error is exactly `0.0` when the
/// spectrum has no error channel, and both are `+inf` when the filter
/// window has fewer than two samples or too many bad samples.
///
/// The caller's spectrum and model are never modified; fill-in happens on
/// a working copy of the windowed flux.
pub fn convert(
    filter: &FilterCurve,
    spectrum: &SpectrumRecord,
    model: Option<&ModelSpectrumRecord>,
    bad_pixel_tolerance: f64,
) -> Result<(f64, f64), PhotometryError> {
    let low = filter.min_wavelength();
    let high = filter.max_wavelength();

    // The working window owns its data, so in-place fill-in below never
    // reaches the caller's record.
    let window = spectrum.window(low, high);
    let wl = window.wavelengths();
    let mut flux = window.fluxes().to_vec();

    let model_flux = match model {
        Some(model) => model_on_grid(model, wl, low, high)?,
        None => None,
    };

    let transm = if wl == filter.wavelengths() {
        filter.transmissions().to_vec()
    } else {
        log::debug!(
            "Filter {} is not sampled like the observed spectrum, interpolating",
            filter.id()
        );
        interp_onto(wl, filter.wavelengths(), filter.transmissions())?
    };

    let good = classify_samples(&flux, window.channels());
    let n = good.len();
    let n_bad = good.iter().filter(|&&g| !g).count();
    log::debug!("Filter {}: N_points: {}, N_bad: {}", filter.id(), n, n_bad);

    if n == 0 {
        log::debug!("Filter {}: no samples in window, m = inf", filter.id());
        return Ok(UNMEASURABLE);
    }

    if n_bad > 0 {
        let p_bad = n_bad as f64 / n as f64;
        if p_bad > bad_pixel_tolerance {
            log::debug!(
                "Filter {}: bad fraction {:.3} > tolerance {}, m = inf",
                filter.id(),
                p_bad,
                bad_pixel_tolerance
            );
            return Ok(UNMEASURABLE);
        }

        match &model_flux {
            Some(model_flux) => {
                for i in (0..n).filter(|&i| !good[i]) {
                    flux[i] = model_flux[i];
                }
            }
            None => {
                let (good_wl, good_flux): (Vec<f64>, Vec<f64>) = (0..n)
                    .filter(|&i| good[i])
                    .map(|i| (wl[i], flux[i]))
                    .unzip();

                if good_wl.is_empty() {
                    log::debug!(
                        "Filter {}: no good samples to interpolate from, m = inf",
                        filter.id()
                    );
                    return Ok(UNMEASURABLE);
                }

                let bad_wl: Vec<f64> = (0..n).filter(|&i| !good[i]).map(|i| wl[i]).collect();
                let filled = interp_onto(&bad_wl, &good_wl, &good_flux)?;
                for (i, value) in (0..n).filter(|&i| !good[i]).zip(filled) {
                    flux[i] = value;
                }
            }
        }
    }

    if n < 2 {
        log::debug!(
            "Filter {}: single sample window cannot be integrated, m = inf",
            filter.id()
        );
        return Ok(UNMEASURABLE);
    }

    let weighted_flux: Vec<f64> = (0..n).map(|i| flux[i] * transm[i] * wl[i]).collect();
    let weighted_transm: Vec<f64> = (0..n).map(|i| transm[i] / wl[i]).collect();

    let m_ab =
        -2.5 * (trapz(wl, &weighted_flux)? / trapz(wl, &weighted_transm)?).log10()
            + AB_ZERO_POINT_OFFSET;

    let e_ab = match window.errors() {
        Some(errors) => {
            let (variance, signal) = (0..n).filter(|&i| good[i]).fold(
                (0.0, 0.0),
                |(variance, signal), i| {
                    (
                        variance + transm[i].powi(2) * errors[i].powi(2) * wl[i].powi(2),
                        signal + flux[i] * transm[i] * wl[i],
                    )
                },
            );
            MAGNITUDE_ERROR_SCALE * variance.sqrt() / signal
        }
        None => 0.0,
    };

    Ok((m_ab, e_ab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> FilterCurve {
        FilterCurve::from_table("g", vec![4000.0, 5000.0, 6000.0], vec![0.1, 0.9, 0.1]).unwrap()
    }

    fn expected_mag(wl: &[f64], flux: &[f64], transm: &[f64]) -> f64 {
        let num: Vec<f64> = (0..wl.len()).map(|i| flux[i] * transm[i] * wl[i]).collect();
        let den: Vec<f64> = (0..wl.len()).map(|i| transm[i] / wl[i]).collect();
        -2.5 * (trapz(wl, &num).unwrap() / trapz(wl, &den).unwrap()).log10() - 2.41
    }

    #[test]
    fn test_all_good_flux_only() {
        let filter = triangle();
        let spectrum =
            SpectrumRecord::flux_only(vec![4000.0, 5000.0, 6000.0], vec![1.0, 2.0, 1.0]).unwrap();

        let (m, e) = convert(&filter, &spectrum, None, 0.5).unwrap();

        // ∫fTλ = 9.5e6, ∫T/λ = 0.2008333...
        let expected = -2.5 * (9.5e6f64 / (0.1025 + 0.098_333_333_333_333_33)).log10() - 2.41;
        assert_relative_eq!(m, expected, epsilon = 1e-9);
        assert_relative_eq!(
            m,
            expected_mag(&[4000.0, 5000.0, 6000.0], &[1.0, 2.0, 1.0], &[0.1, 0.9, 0.1]),
            epsilon = 1e-12
        );
        assert_eq!(e, 0.0);
    }

    #[test]
    fn test_negative_flux_is_interpolated() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        let bad = SpectrumRecord::flux_only(wl.clone(), vec![1.0, -1.0, 1.0]).unwrap();
        let clean = SpectrumRecord::flux_only(wl, vec![1.0, 1.0, 1.0]).unwrap();

        let (m_bad, _) = convert(&filter, &bad, None, 0.5).unwrap();
        let (m_clean, _) = convert(&filter, &clean, None, 0.5).unwrap();

        assert!(m_bad.is_finite());
        assert_eq!(m_bad, m_clean);
    }

    #[test]
    fn test_too_many_bad_pixels() {
        let filter = triangle();
        let spectrum =
            SpectrumRecord::flux_only(vec![4000.0, 5000.0, 6000.0], vec![-1.0, -1.0, 1.0]).unwrap();

        let (m, e) = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert_eq!(m, f64::INFINITY);
        assert_eq!(e, f64::INFINITY);
    }

    #[test]
    fn test_tolerance_boundary_is_strict() {
        let filter = FilterCurve::from_table(
            "r",
            vec![4000.0, 5000.0, 6000.0, 7000.0],
            vec![0.2, 0.8, 0.8, 0.2],
        )
        .unwrap();
        // 2 of 4 flagged: p_bad == 0.5 exactly
        let spectrum = SpectrumRecord::with_flag(
            vec![4000.0, 5000.0, 6000.0, 7000.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![0, 2, 3, 1],
        )
        .unwrap();

        let (m, e) = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert!(m.is_finite());
        assert_eq!(e, 0.0);

        let (m, _) = convert(&filter, &spectrum, None, 0.49).unwrap();
        assert_eq!(m, f64::INFINITY);
    }

    #[test]
    fn test_empty_window() {
        let filter = triangle();
        let spectrum = SpectrumRecord::with_error(
            vec![7000.0, 8000.0],
            vec![1.0, 1.0],
            vec![0.1, 0.1],
        )
        .unwrap();

        assert_eq!(
            convert(&filter, &spectrum, None, 0.5).unwrap(),
            (f64::INFINITY, f64::INFINITY)
        );

        let empty = SpectrumRecord::flux_only(vec![], vec![]).unwrap();
        assert_eq!(
            convert(&filter, &empty, None, 0.5).unwrap(),
            (f64::INFINITY, f64::INFINITY)
        );
    }

    #[test]
    fn test_single_sample_window() {
        let filter = triangle();
        let spectrum = SpectrumRecord::flux_only(vec![5000.0], vec![1.0]).unwrap();
        assert_eq!(
            convert(&filter, &spectrum, None, 0.5).unwrap(),
            (f64::INFINITY, f64::INFINITY)
        );
    }

    #[test]
    fn test_error_over_full_window_when_all_good() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        let flux = vec![1.0, 2.0, 1.0];
        let err = vec![0.1, 0.2, 0.1];
        let transm = [0.1, 0.9, 0.1];
        let spectrum = SpectrumRecord::with_error(wl.clone(), flux.clone(), err.clone()).unwrap();

        let (_, e) = convert(&filter, &spectrum, None, 0.5).unwrap();

        let variance: f64 = (0..3)
            .map(|i| transm[i] * transm[i] * err[i] * err[i] * wl[i] * wl[i])
            .sum();
        let signal: f64 = (0..3).map(|i| flux[i] * transm[i] * wl[i]).sum();
        assert_relative_eq!(e, 1.0857362047581294 * variance.sqrt() / signal, epsilon = 1e-12);
    }

    #[test]
    fn test_error_skips_bad_samples() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        // Middle sample has a non-positive error: bad, flux kept by interpolation
        let spectrum =
            SpectrumRecord::with_error(wl.clone(), vec![1.0, 3.0, 1.0], vec![0.1, 0.0, 0.1])
                .unwrap();

        let (m, e) = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert_relative_eq!(
            m,
            expected_mag(&wl, &[1.0, 1.0, 1.0], &[0.1, 0.9, 0.1]),
            epsilon = 1e-12
        );

        // Only the two outer samples count: T = 0.1, σ = 0.1, filled f = 1
        let variance = 0.1f64.powi(4) * (4000.0f64.powi(2) + 6000.0f64.powi(2));
        let signal = 0.1 * 4000.0 + 0.1 * 6000.0;
        assert_relative_eq!(e, MAGNITUDE_ERROR_SCALE * variance.sqrt() / signal, epsilon = 1e-12);
    }

    #[test]
    fn test_error_and_flag_both_classify() {
        let wl = vec![4000.0, 5000.0, 6000.0, 7000.0, 8000.0];
        let flux = vec![2.0, 9.0, 9.0, 2.0, -2.0];
        let channels = SpectrumChannels::FluxWithErrorAndFlag {
            errors: vec![0.1, 0.0, 0.1, 0.1, 0.1],
            flags: vec![0, 0, 3, 1, 0],
        };
        // error <= 0, flag > 1 and negative flux are bad; flag 1 is still good
        assert_eq!(
            classify_samples(&flux, &channels),
            vec![true, false, false, true, false]
        );

        let filter = FilterCurve::from_table("i", wl[..4].to_vec(), vec![0.2, 0.8, 0.8, 0.2])
            .unwrap();
        let spectrum = SpectrumRecord::with_error_and_flag(
            wl[..4].to_vec(),
            flux[..4].to_vec(),
            vec![0.1, 0.0, 0.1, 0.1],
            vec![0, 0, 3, 1],
        )
        .unwrap();

        // 2 of 4 bad sits exactly on the 0.5 tolerance
        let (m, e) = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert_relative_eq!(
            m,
            expected_mag(&wl[..4], &[2.0, 2.0, 2.0, 2.0], &[0.2, 0.8, 0.8, 0.2]),
            epsilon = 1e-12
        );

        let variance = 0.2f64.powi(2) * 0.1f64.powi(2) * (4000.0f64.powi(2) + 7000.0f64.powi(2));
        let signal = 2.0 * 0.2 * 4000.0 + 2.0 * 0.2 * 7000.0;
        assert_relative_eq!(e, MAGNITUDE_ERROR_SCALE * variance.sqrt() / signal, epsilon = 1e-12);

        let strict = convert(&filter, &spectrum, None, 0.4).unwrap();
        assert_eq!(strict, (f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn test_model_fills_bad_samples() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        let spectrum = SpectrumRecord::with_flag(wl.clone(), vec![1.0, 1.0, 1.0], vec![0, 5, 0])
            .unwrap();
        let model = ModelSpectrumRecord::new(wl.clone(), vec![9.0, 4.0, 9.0]).unwrap();

        let (m, e) = convert(&filter, &spectrum, Some(&model), 0.5).unwrap();
        assert_relative_eq!(
            m,
            expected_mag(&wl, &[1.0, 4.0, 1.0], &[0.1, 0.9, 0.1]),
            epsilon = 1e-12
        );
        assert_eq!(e, 0.0);
    }

    #[test]
    fn test_model_resampled_onto_observed_grid() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        let spectrum = SpectrumRecord::flux_only(wl.clone(), vec![1.0, -5.0, 1.0]).unwrap();
        // Coarser model grid; value at 5000 is the midpoint 3.0
        let model = ModelSpectrumRecord::new(vec![4000.0, 5500.0, 6000.0], vec![0.0, 4.5, 0.0])
            .unwrap();

        let (m, _) = convert(&filter, &spectrum, Some(&model), 0.5).unwrap();
        assert_relative_eq!(
            m,
            expected_mag(&wl, &[1.0, 3.0, 1.0], &[0.1, 0.9, 0.1]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_model_outside_window_is_discarded() {
        let filter = triangle();
        let wl = vec![4000.0, 5000.0, 6000.0];
        let spectrum = SpectrumRecord::flux_only(wl.clone(), vec![1.0, -1.0, 1.0]).unwrap();
        let model = ModelSpectrumRecord::new(vec![8000.0, 9000.0], vec![50.0, 50.0]).unwrap();

        let with_model = convert(&filter, &spectrum, Some(&model), 0.5).unwrap();
        let without = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert_eq!(with_model, without);
    }

    #[test]
    fn test_filter_resampled_onto_spectrum() {
        let filter = triangle();
        let wl: Vec<f64> = (0..=20).map(|i| 4000.0 + 100.0 * i as f64).collect();
        let flux = vec![1.0; wl.len()];
        let spectrum = SpectrumRecord::flux_only(wl.clone(), flux.clone()).unwrap();

        let transm: Vec<f64> = wl.iter().map(|&w| filter.at(w)).collect();
        let (m, _) = convert(&filter, &spectrum, None, 0.5).unwrap();
        assert_relative_eq!(
            m,
            expected_mag(&wl, &flux, &transm),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_caller_spectrum_untouched_and_idempotent() {
        let filter = triangle();
        let spectrum =
            SpectrumRecord::flux_only(vec![4000.0, 5000.0, 6000.0], vec![1.0, -1.0, 1.0]).unwrap();
        let before = spectrum.clone();

        let first = convert(&filter, &spectrum, None, 0.5).unwrap();
        let second = convert(&filter, &spectrum, None, 0.5).unwrap();

        assert_eq!(spectrum, before);
        assert_eq!(first.0.to_bits(), second.0.to_bits());
        assert_eq!(first.1.to_bits(), second.1.to_bits());
    }

    #[test]
    fn test_all_bad_with_full_tolerance() {
        let filter = triangle();
        let spectrum =
            SpectrumRecord::flux_only(vec![4000.0, 5000.0, 6000.0], vec![-1.0, -1.0, -1.0])
                .unwrap();
        assert_eq!(
            convert(&filter, &spectrum, None, 1.0).unwrap(),
            (f64::INFINITY, f64::INFINITY)
        );
    }
}
