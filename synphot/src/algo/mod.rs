//! Numeric helpers for resampling and integrating tabulated spectra

pub mod misc;
pub mod trapezoid;

pub use misc::{interp, interp_onto, interp_onto_or, interp_or, InterpError};
pub use trapezoid::{trapz, TrapezoidError};
