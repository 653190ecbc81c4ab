//! STARLIGHT spectral synthesis files
//!
//! The observed spectrum comes from a STARLIGHT *input* file: whitespace
//! separated `λ flux [error [flag]]` rows, in units of 1e-17 erg s⁻¹ cm⁻² Å⁻¹.
//!
//! The optional model comes from the matching synthesis *output* file. Only
//! two parts of it are used:
//!
//! ```text
//!   1.23456E+01  [fobs_norm (in input units)]
//!   ...
//! ## Synthetic spectrum (Best Model) ##l_obs f_obs f_syn wei
//! 1901  [Nl_obs]
//!    3650.0   0.4314   0.4123   1.0000
//!    ...
//! ```
//!
//! The model flux is `f_syn`, normalised to `fobs_norm`, so it is rescaled by
//! `fobs_norm · 1e-17` to match the observed flux.

use std::path::Path;

use synphot::{ModelSpectrumRecord, Observation, SpectrumChannels, SpectrumRecord};

use super::{AdapterError, SourceInput, SpectrumSource, FLUX_UNIT};

const FOBS_NORM_TAG: &str = "[fobs_norm";
const SYNTHETIC_HEADER: &str = "## Synthetic spectrum";
const NL_OBS_TAG: &str = "[Nl_obs]";

/// Adapter for STARLIGHT input (and optional synthesis output) files
#[derive(Debug, Clone, Copy, Default)]
pub struct StarlightAdapter;

fn read_text(path: &Path) -> Result<String, AdapterError> {
    std::fs::read_to_string(path).map_err(|source| AdapterError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> AdapterError {
    AdapterError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn parse_f64(path: &Path, line: usize, token: &str) -> Result<f64, AdapterError> {
    token
        .parse::<f64>()
        .map_err(|_| parse_error(path, line, format!("invalid number '{token}'")))
}

fn parse_flag(path: &Path, line: usize, token: &str) -> Result<i64, AdapterError> {
    if let Ok(flag) = token.parse::<i64>() {
        return Ok(flag);
    }
    // Some writers emit flags as floats, e.g. "0.0"
    let value = parse_f64(path, line, token)?;
    if value.fract() != 0.0 {
        return Err(parse_error(path, line, format!("non-integer flag '{token}'")));
    }
    Ok(value as i64)
}

/// Parse a STARLIGHT input table into a spectrum scaled to erg s⁻¹ cm⁻² Å⁻¹
pub fn parse_input(path: &Path, text: &str) -> Result<SpectrumRecord, AdapterError> {
    let mut wavelengths = Vec::new();
    let mut fluxes = Vec::new();
    let mut errors = Vec::new();
    let mut flags = Vec::new();
    let mut n_columns: Option<usize> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let columns = tokens.len().min(4);
        if columns < 2 {
            return Err(parse_error(path, line_no, "expected at least 'wl flux' columns"));
        }
        match n_columns {
            None => n_columns = Some(columns),
            Some(expected) if expected != columns => {
                return Err(parse_error(
                    path,
                    line_no,
                    format!("expected {expected} columns, found {columns}"),
                ));
            }
            Some(_) => {}
        }

        wavelengths.push(parse_f64(path, line_no, tokens[0])?);
        fluxes.push(parse_f64(path, line_no, tokens[1])? * FLUX_UNIT);
        if columns >= 3 {
            errors.push(parse_f64(path, line_no, tokens[2])? * FLUX_UNIT);
        }
        if columns >= 4 {
            flags.push(parse_flag(path, line_no, tokens[3])?);
        }
    }

    let channels = match n_columns {
        Some(4) => SpectrumChannels::FluxWithErrorAndFlag { errors, flags },
        Some(3) => SpectrumChannels::FluxWithError { errors },
        _ => SpectrumChannels::FluxOnly,
    };

    log::debug!(
        "Read {} STARLIGHT input samples from {}",
        wavelengths.len(),
        path.display()
    );
    Ok(SpectrumRecord::new(wavelengths, fluxes, channels)?)
}

/// Parse the best-model synthetic spectrum out of a STARLIGHT output file
pub fn parse_synthesis(path: &Path, text: &str) -> Result<ModelSpectrumRecord, AdapterError> {
    let lines: Vec<&str> = text.lines().collect();

    let fobs_norm = lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.contains(FOBS_NORM_TAG))
        .map(|(idx, line)| {
            let token = line.split_whitespace().next().unwrap_or("");
            parse_f64(path, idx + 1, token)
        })
        .ok_or_else(|| AdapterError::MissingBlock {
            path: path.to_path_buf(),
            block: "fobs_norm",
        })??;

    let header = lines
        .iter()
        .position(|line| line.trim_start().starts_with(SYNTHETIC_HEADER))
        .ok_or_else(|| AdapterError::MissingBlock {
            path: path.to_path_buf(),
            block: "Synthetic spectrum",
        })?;

    let count_idx = lines[header + 1..]
        .iter()
        .position(|line| line.contains(NL_OBS_TAG))
        .map(|offset| header + 1 + offset)
        .ok_or_else(|| AdapterError::MissingBlock {
            path: path.to_path_buf(),
            block: "Nl_obs",
        })?;

    let count_token = lines[count_idx].split_whitespace().next().unwrap_or("");
    let n_lambda: usize = count_token.parse().map_err(|_| {
        parse_error(path, count_idx + 1, format!("invalid Nl_obs '{count_token}'"))
    })?;

    let scale = fobs_norm * FLUX_UNIT;
    let mut wavelengths = Vec::with_capacity(n_lambda);
    let mut fluxes = Vec::with_capacity(n_lambda);

    for (idx, raw) in lines
        .iter()
        .enumerate()
        .skip(count_idx + 1)
        .filter(|(_, line)| !line.trim().is_empty())
        .take(n_lambda)
    {
        let line_no = idx + 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(parse_error(path, line_no, "expected 'l_obs f_obs f_syn' columns"));
        }
        wavelengths.push(parse_f64(path, line_no, tokens[0])?);
        fluxes.push(parse_f64(path, line_no, tokens[2])? * scale);
    }

    if wavelengths.len() != n_lambda {
        return Err(parse_error(
            path,
            lines.len(),
            format!("expected {n_lambda} synthetic samples, found {}", wavelengths.len()),
        ));
    }

    Ok(ModelSpectrumRecord::new(wavelengths, fluxes)?)
}

impl SpectrumSource for StarlightAdapter {
    fn name(&self) -> &'static str {
        "starlight"
    }

    fn read(&self, input: &SourceInput) -> Result<Observation, AdapterError> {
        let spectrum = parse_input(&input.spectrum, &read_text(&input.spectrum)?)?;

        let model = match &input.model {
            Some(path) => Some(parse_synthesis(path, &read_text(path)?)?),
            None => None,
        };

        Ok(Observation { spectrum, model })
    }
}
