//! Composite trapezoid rule over tabulated wavelength grids

use thiserror::Error;

/// Errors that can occur during trapezoidal integration
#[derive(Debug, Error, PartialEq)]
pub enum TrapezoidError {
    #[error("Insufficient points for integration, need at least 2 points")]
    InsufficientPoints,

    #[error("Points must be in ascending order")]
    NotAscending,

    #[error("Sample and abscissa lengths differ ({0} vs {1})")]
    LengthMismatch(usize, usize),
}

/// Performs trapezoidal integration of tabulated samples.
///
/// # Arguments
///
/// * `xs` - The x coordinates of the trapezoid corners in ascending order
/// * `ys` - The sampled values at each corner
///
/// # Returns
///
/// The integral, or an error if the grid is too short, unsorted or
/// mismatched with the samples.
pub fn trapz(xs: &[f64], ys: &[f64]) -> Result<f64, TrapezoidError> {
    if xs.len() != ys.len() {
        return Err(TrapezoidError::LengthMismatch(xs.len(), ys.len()));
    }

    if xs.len() < 2 {
        return Err(TrapezoidError::InsufficientPoints);
    }

    if xs.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(TrapezoidError::NotAscending);
    }

    // Σ (x[i+1] - x[i]) · (y[i] + y[i+1]) / 2
    let area = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) * 0.5)
        .sum();

    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integrate_parabola() {
        // Panels 0.5 + 2.5 + 6.5 for x^2 on 0..3
        let wl = [0.0, 1.0, 2.0, 3.0];
        let values: Vec<f64> = wl.iter().map(|x| x * x).collect();
        let area = trapz(&wl, &values).unwrap();
        assert_relative_eq!(area, 9.5, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_wavelength_steps() {
        let wl = [4000.0, 4001.0, 4003.0];
        let transmission = [2.0, 2.0, 4.0];
        // 1*2 + 2*3
        assert_relative_eq!(trapz(&wl, &transmission).unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_sample_rejected() {
        assert_eq!(
            trapz(&[5000.0], &[0.8]),
            Err(TrapezoidError::InsufficientPoints)
        );
    }

    #[test]
    fn test_descending_grid_rejected() {
        let wl = [4000.0, 4002.0, 4001.0, 4003.0];
        assert_eq!(trapz(&wl, &wl), Err(TrapezoidError::NotAscending));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            trapz(&[0.0, 1.0], &[1.0]),
            Err(TrapezoidError::LengthMismatch(2, 1))
        );
    }
}
