//! Synthetic photometry over every filter of a set

use rayon::prelude::*;

use crate::filters::{FilterCurve, FilterSet};

use super::convert::convert;
use super::spectrum::{MagnitudeResult, ModelSpectrumRecord, SpectrumRecord};

fn convert_one(
    filter: &FilterCurve,
    spectrum: &SpectrumRecord,
    model: Option<&ModelSpectrumRecord>,
    bad_pixel_tolerance: f64,
) -> MagnitudeResult {
    match convert(filter, spectrum, model, bad_pixel_tolerance) {
        Ok((magnitude, magnitude_error)) => {
            log::info!(
                "Magnitude to filter {}: {:.2}, error: {:.2}",
                filter.id(),
                magnitude,
                magnitude_error
            );
            MagnitudeResult::new(filter.id(), magnitude, magnitude_error)
        }
        Err(e) => {
            log::warn!("Filter {} failed: {}", filter.id(), e);
            MagnitudeResult::unmeasurable(filter.id())
        }
    }
}

/// Convert a spectrum through every filter of `filter_set`
///
/// Returns one result per filter in ascending filter id order. Filters are
/// independent, so a failure on one is logged and reported as
/// unmeasurable without affecting the others.
pub fn convert_all(
    filter_set: &FilterSet,
    spectrum: &SpectrumRecord,
    model: Option<&ModelSpectrumRecord>,
    bad_pixel_tolerance: f64,
) -> Vec<MagnitudeResult> {
    filter_set
        .curves()
        .map(|filter| convert_one(filter, spectrum, model, bad_pixel_tolerance))
        .collect()
}

/// Parallel variant of [`convert_all`], one task per filter
///
/// Output order matches [`convert_all`].
pub fn par_convert_all(
    filter_set: &FilterSet,
    spectrum: &SpectrumRecord,
    model: Option<&ModelSpectrumRecord>,
    bad_pixel_tolerance: f64,
) -> Vec<MagnitudeResult> {
    let filters: Vec<&FilterCurve> = filter_set.curves().collect();

    filters
        .into_par_iter()
        .map(|filter| convert_one(filter, spectrum, model, bad_pixel_tolerance))
        .collect()
}
