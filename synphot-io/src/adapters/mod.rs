//! Readers that turn survey-specific spectrum files into [`Observation`]s
//!
//! Each supported format has its own adapter, chosen explicitly by the
//! caller through [`SourceFormat`]. Adapters do all unit conversion
//! (log-wavelength to linear, flux scale) so the photometry core never has to.

pub mod sdss;
pub mod starlight;

use std::path::PathBuf;

use clap::ValueEnum;
use synphot::{Observation, SpectrumError};
use thiserror::Error;

pub use sdss::SdssFitsAdapter;
pub use starlight::StarlightAdapter;

/// Flux unit used by both STARLIGHT and SDSS files: 1e-17 erg s⁻¹ cm⁻² Å⁻¹
pub const FLUX_UNIT: f64 = 1e-17;

/// Errors that can occur while reading a spectrum file
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: missing '{block}' block", path.display())]
    MissingBlock { path: PathBuf, block: &'static str },

    #[error("FITS I/O error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    #[error("Invalid spectrum: {0}")]
    InvalidSpectrum(#[from] SpectrumError),
}

/// Paths making up one object: the observed spectrum and, for formats
/// that keep it in a separate file, the model spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInput {
    pub spectrum: PathBuf,
    pub model: Option<PathBuf>,
}

impl SourceInput {
    pub fn new(spectrum: impl Into<PathBuf>) -> Self {
        Self {
            spectrum: spectrum.into(),
            model: None,
        }
    }

    pub fn with_model(spectrum: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            spectrum: spectrum.into(),
            model: Some(model.into()),
        }
    }

    /// Identifier used for this object in output tables: the spectrum
    /// file stem
    pub fn id(&self) -> String {
        self.spectrum
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.spectrum.display().to_string())
    }
}

/// Parse `PATH` or `PATH,MODEL_PATH`
impl std::str::FromStr for SourceInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [spectrum] if !spectrum.is_empty() => Ok(Self::new(*spectrum)),
            [spectrum, model] if !spectrum.is_empty() && !model.is_empty() => {
                Ok(Self::with_model(*spectrum, *model))
            }
            _ => Err(format!(
                "Input must be in format 'PATH' or 'PATH,MODEL_PATH', got '{s}'"
            )),
        }
    }
}

/// Reader for one spectrum file format
pub trait SpectrumSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn read(&self, input: &SourceInput) -> Result<Observation, AdapterError>;
}

/// Supported spectrum formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// STARLIGHT ASCII input, optionally paired with a synthesis output file
    Starlight,
    /// SDSS spec-*.fits files (COADD table)
    Sdss,
}

impl SourceFormat {
    pub fn adapter(&self) -> Box<dyn SpectrumSource> {
        match self {
            SourceFormat::Starlight => Box::new(StarlightAdapter),
            SourceFormat::Sdss => Box::new(SdssFitsAdapter::default()),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Starlight => write!(f, "starlight"),
            SourceFormat::Sdss => write!(f, "sdss"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_input() {
        let input: SourceInput = "spec/a.txt".parse().unwrap();
        assert_eq!(input, SourceInput::new("spec/a.txt"));
        assert_eq!(input.id(), "a");

        let input: SourceInput = "a.txt, a.out".parse().unwrap();
        assert_eq!(input, SourceInput::with_model("a.txt", "a.out"));

        assert!("".parse::<SourceInput>().is_err());
        assert!("a,b,c".parse::<SourceInput>().is_err());
        assert!("a,".parse::<SourceInput>().is_err());
    }

    #[test]
    fn test_format_selects_adapter() {
        assert_eq!(SourceFormat::Starlight.adapter().name(), "starlight");
        assert_eq!(SourceFormat::Sdss.adapter().name(), "sdss");
        assert_eq!(SourceFormat::Sdss.to_string(), "sdss");
    }
}
