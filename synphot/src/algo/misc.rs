//! Linear interpolation helpers shared by the filter and photometry code.
//!
//! Two flavours are provided, matching the two ways spectra get resampled:
//!
//! - **Clamped**: outside the tabulated range the end values are held
//!   ([`interp`], [`interp_onto`]). Used for filter transmissions and for
//!   filling bad samples from their good neighbours.
//! - **Filled**: outside the tabulated range a fixed value is returned
//!   ([`interp_or`], [`interp_onto_or`]). Used for model spectra, which
//!   contribute zero flux where they have no coverage.

use thiserror::Error;

/// Errors that can occur during interpolation operations.
#[derive(Error, Debug, PartialEq)]
pub enum InterpError {
    #[error("Input vectors must have at least 1 point")]
    InsufficientData,
    #[error("Input vectors must have the same length ({0} vs {1})")]
    MismatchedLengths(usize, usize),
    #[error("X values must be sorted in strictly ascending order (index {0})")]
    UnsortedData(usize),
}

fn validate(xs: &[f64], ys: &[f64]) -> Result<(), InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths(xs.len(), ys.len()));
    }

    if xs.is_empty() {
        return Err(InterpError::InsufficientData);
    }

    match xs.windows(2).position(|pair| pair[1] <= pair[0]) {
        Some(i) => Err(InterpError::UnsortedData(i + 1)),
        None => Ok(()),
    }
}

/// Interpolate inside `[xs[0], xs[n-1]]`; caller guarantees validated input
/// and an in-range `x`.
fn interp_inside(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let hi = match xs.binary_search_by(|probe| probe.total_cmp(&x)) {
        Ok(exact) => return ys[exact],
        // -0.0 sorts below 0.0 under total_cmp
        Err(0) => return ys[0],
        Err(insert_at) => insert_at,
    };
    let lo = hi - 1;

    let frac = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + frac * (ys[hi] - ys[lo])
}

fn interp_unchecked(x: f64, xs: &[f64], ys: &[f64], left: f64, right: f64) -> f64 {
    let last = xs.len() - 1;
    if x.is_nan() {
        f64::NAN
    } else if x < xs[0] {
        left
    } else if x > xs[last] {
        right
    } else {
        interp_inside(x, xs, ys)
    }
}

/// Linear interpolation holding the end values outside the tabulated range.
///
/// A single-point table evaluates to that point's value everywhere.
///
/// # Examples
///
/// ```rust
/// use synphot::algo::misc::interp;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let xs = vec![0.0, 1.0, 2.0];
/// let ys = vec![0.0, 1.0, 4.0];
///
/// assert_eq!(interp(1.5, &xs, &ys)?, 2.5);
/// assert_eq!(interp(-3.0, &xs, &ys)?, 0.0);
/// assert_eq!(interp(9.0, &xs, &ys)?, 4.0);
/// # Ok(())
/// # }
/// ```
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate(xs, ys)?;
    Ok(interp_unchecked(x, xs, ys, ys[0], ys[ys.len() - 1]))
}

/// Linear interpolation returning `left` / `right` outside the tabulated range.
pub fn interp_or(
    x: f64,
    xs: &[f64],
    ys: &[f64],
    left: f64,
    right: f64,
) -> Result<f64, InterpError> {
    validate(xs, ys)?;
    Ok(interp_unchecked(x, xs, ys, left, right))
}

/// Evaluate [`interp`] at every point of `targets`.
pub fn interp_onto(targets: &[f64], xs: &[f64], ys: &[f64]) -> Result<Vec<f64>, InterpError> {
    validate(xs, ys)?;
    let (left, right) = (ys[0], ys[ys.len() - 1]);
    Ok(targets
        .iter()
        .map(|&x| interp_unchecked(x, xs, ys, left, right))
        .collect())
}

/// Evaluate [`interp_or`] at every point of `targets`.
pub fn interp_onto_or(
    targets: &[f64],
    xs: &[f64],
    ys: &[f64],
    left: f64,
    right: f64,
) -> Result<Vec<f64>, InterpError> {
    validate(xs, ys)?;
    Ok(targets
        .iter()
        .map(|&x| interp_unchecked(x, xs, ys, left, right))
        .collect())
}
