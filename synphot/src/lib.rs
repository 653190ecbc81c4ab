//! Synthetic broadband photometry from flux-calibrated spectra
//!
//! Integrates observed (or model) spectra against filter transmission
//! curves to produce AB magnitudes comparable to survey photometry.

pub mod algo;
pub mod config;
pub mod filters;
pub mod photometry;

pub use config::{ConfigError, ConfigOverrides, PhotometryConfig};
pub use filters::{
    FilterCurve, FilterError, FilterSet, FilterStore, JsonFilterStore, MemoryFilterStore,
};
pub use photometry::{
    MagnitudeResult, ModelSpectrumRecord, Observation, Photometer, PhotometryError,
    SpectrumChannels, SpectrumError, SpectrumRecord,
};
