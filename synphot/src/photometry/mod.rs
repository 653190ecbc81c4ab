//! Spectrum to AB magnitude conversion

pub mod convert;
pub mod filterset;
pub mod photometer;
pub mod spectrum;

pub use convert::{
    convert, PhotometryError, AB_ZERO_POINT_OFFSET, DEFAULT_BAD_PIXEL_TOLERANCE,
    MAGNITUDE_ERROR_SCALE,
};
pub use filterset::{convert_all, par_convert_all};
pub use photometer::Photometer;
pub use spectrum::{
    MagnitudeResult, ModelSpectrumRecord, Observation, SpectrumChannels, SpectrumError,
    SpectrumRecord,
};
