//! Named collections of filter curves for one detector region

use std::collections::BTreeMap;

use super::{FilterCurve, FilterError};

/// All filter curves registered under one (set, detector region) pair
///
/// Filters are keyed by id and always iterate in ascending id order, which
/// is the order magnitudes are reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    set_id: String,
    region: String,
    filters: BTreeMap<String, FilterCurve>,
}

impl FilterSet {
    /// Build a set from curves; a later curve with a repeated id replaces
    /// the earlier one.
    pub fn new(
        set_id: impl Into<String>,
        region: impl Into<String>,
        curves: impl IntoIterator<Item = FilterCurve>,
    ) -> Self {
        let filters = curves
            .into_iter()
            .map(|curve| (curve.id().to_string(), curve))
            .collect();

        Self {
            set_id: set_id.into(),
            region: region.into(),
            filters,
        }
    }

    pub fn set_id(&self) -> &str {
        &self.set_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn get(&self, filter_id: &str) -> Option<&FilterCurve> {
        self.filters.get(filter_id)
    }

    /// Filter ids in ascending order
    pub fn filter_ids(&self) -> Vec<&str> {
        self.filters.keys().map(String::as_str).collect()
    }

    /// Curves in ascending id order
    pub fn curves(&self) -> impl Iterator<Item = &FilterCurve> {
        self.filters.values()
    }

    /// Copy of this set with every curve resampled to a uniform grid
    ///
    /// See [`FilterCurve::resample_uniform`] for the grid definition and
    /// the single-sample behaviour.
    pub fn resample_uniform(&self, delta_lambda: f64) -> Result<FilterSet, FilterError> {
        let curves = self
            .curves()
            .map(|curve| curve.resample_uniform(delta_lambda))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Resampled {} filters of {}/{} to a {} Å grid",
            curves.len(),
            self.set_id,
            self.region,
            delta_lambda
        );

        Ok(FilterSet::new(self.set_id.clone(), self.region.clone(), curves))
    }

    /// Unweighted mean wavelength of each filter, keyed by filter id
    pub fn mean_wavelengths(&self) -> BTreeMap<String, f64> {
        self.filters
            .iter()
            .map(|(id, curve)| (id.clone(), curve.mean_wavelength()))
            .collect()
    }
}
