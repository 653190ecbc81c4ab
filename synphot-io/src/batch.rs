//! Batch conversion of many spectra into a magnitude table
//!
//! One row per input spectrum, one magnitude/error column pair per filter.
//! Exported as delimited text with a leading identifier column:
//!
//! ```text
//! id,g,g_err,r,r_err
//! spec-0266-51630-0001,17.512,0.021,16.904,0.013
//! spec-0266-51630-0002,inf,inf,18.330,0.044
//! ```

use std::io::Write;
use std::path::Path;

use synphot::{FilterSet, MagnitudeResult, Photometer};
use thiserror::Error;

use crate::adapters::{SourceInput, SpectrumSource};

/// Errors that can occur while building or writing a magnitude table
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Row '{id}' has filters {got:?}, table expects {expected:?}")]
    FilterMismatch {
        id: String,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Magnitudes of one spectrum, aligned with the table's filter ids
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeRow {
    pub id: String,
    pub results: Vec<MagnitudeResult>,
}

/// Table of magnitudes for a batch of spectra through one filter set
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeTable {
    filter_ids: Vec<String>,
    rows: Vec<MagnitudeRow>,
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

impl MagnitudeTable {
    pub fn new(filter_ids: Vec<String>) -> Self {
        Self {
            filter_ids,
            rows: Vec::new(),
        }
    }

    pub fn for_filter_set(filter_set: &FilterSet) -> Self {
        Self::new(
            filter_set
                .filter_ids()
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    pub fn filter_ids(&self) -> &[String] {
        &self.filter_ids
    }

    pub fn rows(&self) -> &[MagnitudeRow] {
        &self.rows
    }

    /// Append a row; results must be in the table's filter order
    pub fn push(
        &mut self,
        id: impl Into<String>,
        results: Vec<MagnitudeResult>,
    ) -> Result<(), BatchError> {
        let id = id.into();
        let matches = results.len() == self.filter_ids.len()
            && results
                .iter()
                .zip(self.filter_ids.iter())
                .all(|(result, filter_id)| &result.filter_id == filter_id);

        if !matches {
            return Err(BatchError::FilterMismatch {
                id,
                expected: self.filter_ids.clone(),
                got: results.into_iter().map(|r| r.filter_id).collect(),
            });
        }

        self.rows.push(MagnitudeRow { id, results });
        Ok(())
    }

    /// Append a row for a spectrum that could not be processed at all
    pub fn push_failure(&mut self, id: impl Into<String>) {
        let results = self
            .filter_ids
            .iter()
            .map(|filter_id| MagnitudeResult::unmeasurable(filter_id.as_str()))
            .collect();
        self.rows.push(MagnitudeRow {
            id: id.into(),
            results,
        });
    }

    /// Write the table as comma-separated text
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), BatchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(1 + 2 * self.filter_ids.len());
        header.push("id".to_string());
        for filter_id in &self.filter_ids {
            header.push(filter_id.clone());
            header.push(format!("{filter_id}_err"));
        }
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.id.clone());
            for result in &row.results {
                record.push(format_value(result.magnitude));
                record.push(format_value(result.magnitude_error));
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), BatchError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}

/// Convert every input through `filter_set`
///
/// Inputs that fail to load are logged and recorded as unmeasurable rows;
/// the batch always runs to completion.
pub fn run_batch(
    photometer: &Photometer,
    filter_set: &FilterSet,
    source: &dyn SpectrumSource,
    inputs: &[SourceInput],
) -> MagnitudeTable {
    let mut table = MagnitudeTable::for_filter_set(filter_set);

    for (i, input) in inputs.iter().enumerate() {
        let id = input.id();
        log::info!("[{}/{}] {} ({})", i + 1, inputs.len(), id, source.name());

        match source.read(input) {
            Ok(observation) => {
                let results = photometer.convert_all(filter_set, &observation);
                if let Err(e) = table.push(id.clone(), results) {
                    log::warn!("{}: {}", id, e);
                    table.push_failure(id);
                }
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", input.spectrum.display(), e);
                table.push_failure(id);
            }
        }
    }

    table
}
