//! SDSS `spec-PLATE-MJD-FIBER.fits` spectra
//!
//! Reads the `COADD` binary table, which stores wavelength as `loglam`
//! (log10 Å), flux and best-fit `model` in 1e-17 erg s⁻¹ cm⁻² Å⁻¹, the
//! inverse variance `ivar` and the pixel `and_mask`.

use std::path::Path;

use fitsio::FitsFile;
use synphot::{ModelSpectrumRecord, Observation, SpectrumRecord};

use super::{AdapterError, SourceInput, SpectrumSource, FLUX_UNIT};

/// Adapter for SDSS spectroscopic FITS files
#[derive(Debug, Clone)]
pub struct SdssFitsAdapter {
    /// Name of the binary table HDU holding the coadded spectrum
    pub hdu_name: String,
    /// Attach the pipeline's best-fit model for bad-pixel fill-in
    pub use_model: bool,
}

impl Default for SdssFitsAdapter {
    fn default() -> Self {
        Self {
            hdu_name: "COADD".to_string(),
            use_model: true,
        }
    }
}

/// Raw `COADD` columns, in file units
#[derive(Debug, Clone, Default)]
pub struct CoaddColumns {
    pub loglam: Vec<f32>,
    pub flux: Vec<f32>,
    pub ivar: Vec<f32>,
    pub and_mask: Vec<i32>,
    pub model: Vec<f32>,
}

impl CoaddColumns {
    fn read(path: &Path, hdu_name: &str) -> Result<Self, AdapterError> {
        let mut fptr = FitsFile::open(path)?;
        let hdu = fptr.hdu(hdu_name)?;

        Ok(Self {
            loglam: hdu.read_col(&mut fptr, "loglam")?,
            flux: hdu.read_col(&mut fptr, "flux")?,
            ivar: hdu.read_col(&mut fptr, "ivar")?,
            and_mask: hdu.read_col(&mut fptr, "and_mask")?,
            model: hdu.read_col(&mut fptr, "model")?,
        })
    }

    /// Convert to physical units
    ///
    /// Wavelength becomes `10^loglam` Å. The 1σ error is `1/sqrt(ivar)`;
    /// pixels with `ivar <= 0` get an error of 0, which marks them bad.
    pub fn into_observation(self, use_model: bool) -> Result<Observation, AdapterError> {
        let wavelengths: Vec<f64> = self
            .loglam
            .iter()
            .map(|&loglam| 10f64.powf(loglam as f64))
            .collect();
        let fluxes: Vec<f64> = self.flux.iter().map(|&f| f as f64 * FLUX_UNIT).collect();
        let errors: Vec<f64> = self
            .ivar
            .iter()
            .map(|&ivar| {
                if ivar > 0.0 {
                    FLUX_UNIT / (ivar as f64).sqrt()
                } else {
                    0.0
                }
            })
            .collect();
        let flags: Vec<i64> = self.and_mask.iter().map(|&mask| mask as i64).collect();

        let model = if use_model {
            let model_flux = self.model.iter().map(|&f| f as f64 * FLUX_UNIT).collect();
            Some(ModelSpectrumRecord::new(wavelengths.clone(), model_flux)?)
        } else {
            None
        };

        let spectrum = SpectrumRecord::with_error_and_flag(wavelengths, fluxes, errors, flags)?;
        Ok(Observation { spectrum, model })
    }
}

impl SpectrumSource for SdssFitsAdapter {
    fn name(&self) -> &'static str {
        "sdss"
    }

    fn read(&self, input: &SourceInput) -> Result<Observation, AdapterError> {
        if input.model.is_some() {
            log::warn!(
                "{}: SDSS files carry their own model, ignoring the extra model path",
                input.spectrum.display()
            );
        }

        let columns = CoaddColumns::read(&input.spectrum, &self.hdu_name)?;
        log::debug!(
            "Read {} SDSS samples from {}",
            columns.loglam.len(),
            input.spectrum.display()
        );
        columns.into_observation(self.use_model)
    }
}
