//! Storage backends that provide filter sets by (set id, detector region)
//!
//! The backing layout is hierarchical, `/<set_id>/<region>/<filter_id>`,
//! with each leaf holding two same-length columns `wl` and `transm`.
//! [`JsonFilterStore`] reads that layout from a JSON document:
//!
//! ```json
//! {
//!   "sdss": {
//!     "1": {
//!       "g": { "wl": [3630.0, 3640.0], "transm": [0.0, 0.0012] },
//!       "r": { "wl": [5380.0, 5390.0], "transm": [0.0, 0.0009] }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FilterCurve, FilterError, FilterSet};

/// Provider of filter sets keyed by set id and detector region
///
/// Implementations are read-only after construction and can be shared
/// between threads.
pub trait FilterStore: Send + Sync {
    /// Top-level filter set ids, ascending
    fn set_ids(&self) -> Vec<String>;

    /// Detector regions registered under `set_id`
    fn regions(&self, set_id: &str) -> Result<Vec<String>, FilterError>;

    /// All curves registered under (`set_id`, `region`)
    fn load_set(&self, set_id: &str, region: &str) -> Result<FilterSet, FilterError>;
}

type RegionTable = BTreeMap<String, BTreeMap<String, FilterCurve>>;

/// In-memory table of filter curves
#[derive(Debug, Clone, Default)]
pub struct MemoryFilterStore {
    sets: BTreeMap<String, RegionTable>,
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a curve under (`set_id`, `region`), replacing any curve
    /// with the same id.
    pub fn insert(&mut self, set_id: &str, region: &str, curve: FilterCurve) {
        self.sets
            .entry(set_id.to_string())
            .or_default()
            .entry(region.to_string())
            .or_default()
            .insert(curve.id().to_string(), curve);
    }

    fn not_found(set_id: &str, region: &str) -> FilterError {
        FilterError::NotFound {
            set_id: set_id.to_string(),
            region: region.to_string(),
        }
    }
}

impl FilterStore for MemoryFilterStore {
    fn set_ids(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }

    fn regions(&self, set_id: &str) -> Result<Vec<String>, FilterError> {
        self.sets
            .get(set_id)
            .map(|regions| regions.keys().cloned().collect())
            .ok_or_else(|| FilterError::SetNotFound(set_id.to_string()))
    }

    fn load_set(&self, set_id: &str, region: &str) -> Result<FilterSet, FilterError> {
        let curves = self
            .sets
            .get(set_id)
            .and_then(|regions| regions.get(region))
            .ok_or_else(|| Self::not_found(set_id, region))?;

        Ok(FilterSet::new(set_id, region, curves.values().cloned()))
    }
}

/// Column pair stored at each `/<set>/<region>/<filter>` leaf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterColumns {
    pub wl: Vec<f64>,
    pub transm: Vec<f64>,
}

/// On-disk document: set → region → filter → columns
pub type FilterDocument = BTreeMap<String, BTreeMap<String, BTreeMap<String, FilterColumns>>>;

/// Filter store backed by a JSON document, fully loaded at open time
#[derive(Debug, Clone)]
pub struct JsonFilterStore {
    inner: MemoryFilterStore,
}

impl JsonFilterStore {
    /// Open and validate a filter document
    ///
    /// # Errors
    ///
    /// * [`FilterError::UnsupportedFormat`] for a file without a `.json` extension
    /// * [`FilterError::Io`] if the file cannot be read
    /// * [`FilterError::Parse`] for a malformed document
    /// * any curve validation error for an invalid leaf
    pub fn open(path: &Path) -> Result<Self, FilterError> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            return Err(FilterError::UnsupportedFormat(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path)?;
        let document: FilterDocument = serde_json::from_str(&text)?;
        let store = Self::from_document(document)?;

        log::info!(
            "Loaded filter file {} with sets {:?}",
            path.display(),
            store.set_ids()
        );
        Ok(store)
    }

    pub fn from_document(document: FilterDocument) -> Result<Self, FilterError> {
        let mut inner = MemoryFilterStore::new();
        for (set_id, regions) in document {
            for (region, filters) in regions {
                for (filter_id, columns) in filters {
                    let curve = FilterCurve::from_table(filter_id, columns.wl, columns.transm)?;
                    inner.insert(&set_id, &region, curve);
                }
            }
        }
        Ok(Self { inner })
    }

    /// Write a filter set store to disk in the same layout `open` reads
    pub fn save_document(document: &FilterDocument, path: &Path) -> Result<(), FilterError> {
        let json = serde_json::to_string_pretty(document)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl FilterStore for JsonFilterStore {
    fn set_ids(&self) -> Vec<String> {
        self.inner.set_ids()
    }

    fn regions(&self, set_id: &str) -> Result<Vec<String>, FilterError> {
        self.inner.regions(set_id)
    }

    fn load_set(&self, set_id: &str, region: &str) -> Result<FilterSet, FilterError> {
        self.inner.load_set(set_id, region)
    }
}
