//! File-format adapters and batch driver for synphot
//!
//! Turns survey spectrum files into [`synphot::Observation`]s and collects
//! the resulting magnitudes into exportable tables.

pub mod adapters;
pub mod batch;

pub use adapters::{AdapterError, SourceFormat, SourceInput, SpectrumSource};
pub use batch::{run_batch, BatchError, MagnitudeTable};
