//! Filter transmission curves, filter sets and their backing store

pub mod curve;
pub mod set;
pub mod store;

use thiserror::Error;

pub use curve::FilterCurve;
pub use set::FilterSet;
pub use store::{FilterStore, JsonFilterStore, MemoryFilterStore};

/// Errors that can occur while building or loading filter curves
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Filter set '{set_id}' with region '{region}' not found")]
    NotFound { set_id: String, region: String },

    #[error("Filter set '{0}' not found")]
    SetNotFound(String),

    #[error("Filter '{filter_id}': {wavelengths} wavelengths but {transmissions} transmissions")]
    LengthMismatch {
        filter_id: String,
        wavelengths: usize,
        transmissions: usize,
    },

    #[error("Filter '{0}' has no samples")]
    Empty(String),

    #[error("Filter '{filter_id}': wavelengths must be strictly ascending (index {index})")]
    NotAscending { filter_id: String, index: usize },

    #[error("Filter '{filter_id}': invalid sample (wl={wavelength}, transm={transmission})")]
    InvalidValue {
        filter_id: String,
        wavelength: f64,
        transmission: f64,
    },

    #[error("Invalid resampling step {0}: must be positive, finite and fit the grid")]
    InvalidDelta(f64),

    #[error("Unsupported filter file: {0}")]
    UnsupportedFormat(String),

    #[error("Filter file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filter file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
