//! File-backed dataset repository.
//!
//! Each dataset is stored as one versioned JSON record, `<id>.json`, in
//! the repository directory. Records hold plain tables (headers, names,
//! values), never validated model types, so every load goes back through
//! the model constructors and their checks.
//!
//! Loaded datasets are kept in an in-memory cache owned by the
//! repository. The cache is read through by [`DatasetRepository::load`]
//! and invalidated by [`DatasetRepository::remove`] and
//! [`DatasetRepository::evict`].
//!
//! # Record layout (version 1)
//!
//! ```text
//! { "version": 1, "id": "...", "name": "...",
//!   "genotypes": { "name", "headers", "marker_names", "allele_names",
//!                  "frequencies", "scores": { "ploidy", "values" } | null } | null,
//!   "phenotypes": { "name", "headers", "features", "values" } | null,
//!   "distances": { "name", "headers", "distances" } | null }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreHunterError, Result};
use crate::models::{
    AccessionHeader, CoreHunterData, DistanceMatrixData, Feature, GenotypeData, PhenotypeData,
    PhenotypeValue,
};

/// Schema version written by this crate.
pub const RECORD_VERSION: u32 = 1;

const RECORD_EXTENSION: &str = "json";

/// Stored genotype table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenotypeRecord {
    pub name: String,
    pub headers: Vec<AccessionHeader>,
    pub marker_names: Vec<Option<String>>,
    pub allele_names: Vec<Vec<Option<String>>>,
    /// `frequencies[accession][marker][allele]`.
    pub frequencies: Vec<Vec<Vec<Option<f64>>>>,
    /// Present when the data was built from dosage scores.
    pub scores: Option<ScoreRecord>,
}

/// Stored dosage scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub ploidy: u32,
    /// `values[accession][marker]`.
    pub values: Vec<Vec<Option<u32>>>,
}

impl From<&GenotypeData> for GenotypeRecord {
    fn from(data: &GenotypeData) -> Self {
        let scores = match (data.ploidy(), data.score_array()) {
            (Some(ploidy), Some(values)) => Some(ScoreRecord { ploidy, values }),
            _ => None,
        };
        Self {
            name: data.name().to_string(),
            headers: data.headers().to_vec(),
            marker_names: data.marker_names().to_vec(),
            allele_names: data.allele_names_by_marker(),
            frequencies: data.frequency_array(),
            scores,
        }
    }
}

impl GenotypeRecord {
    /// Rebuilds validated genotype data.
    pub fn into_data(self) -> Result<GenotypeData> {
        let data = match self.scores {
            Some(scores) => GenotypeData::from_scores(
                self.headers,
                Some(self.marker_names),
                &scores.values,
                scores.ploidy,
            )?,
            None => GenotypeData::from_frequencies(
                self.headers,
                Some(self.marker_names),
                Some(self.allele_names),
                &self.frequencies,
            )?,
        };
        Ok(data.with_name(self.name))
    }
}

/// Stored phenotype table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeRecord {
    pub name: String,
    pub headers: Vec<AccessionHeader>,
    pub features: Vec<Feature>,
    pub values: Vec<Vec<Option<PhenotypeValue>>>,
}

impl From<&PhenotypeData> for PhenotypeRecord {
    fn from(data: &PhenotypeData) -> Self {
        let values = (0..data.size())
            .map(|i| {
                (0..data.number_of_features())
                    .map(|f| data.value(i, f).cloned())
                    .collect()
            })
            .collect();
        Self {
            name: data.name().to_string(),
            headers: data.headers().to_vec(),
            features: data.features().to_vec(),
            values,
        }
    }
}

impl PhenotypeRecord {
    pub fn into_data(self) -> Result<PhenotypeData> {
        Ok(PhenotypeData::new(self.headers, self.features, self.values)?.with_name(self.name))
    }
}

/// Stored distance matrix (full square form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub name: String,
    pub headers: Vec<AccessionHeader>,
    pub distances: Vec<Vec<f64>>,
}

impl From<&DistanceMatrixData> for DistanceRecord {
    fn from(data: &DistanceMatrixData) -> Self {
        Self {
            name: data.name().to_string(),
            headers: data.headers().to_vec(),
            distances: data.to_matrix(),
        }
    }
}

impl DistanceRecord {
    pub fn into_data(self) -> Result<DistanceMatrixData> {
        Ok(DistanceMatrixData::new(self.headers, &self.distances)?.with_name(self.name))
    }
}

/// One stored dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Schema version; see [`RECORD_VERSION`].
    pub version: u32,
    pub id: String,
    pub name: String,
    pub genotypes: Option<GenotypeRecord>,
    pub phenotypes: Option<PhenotypeRecord>,
    pub distances: Option<DistanceRecord>,
}

impl DatasetRecord {
    /// Captures a dataset under the given identifier and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: &CoreHunterData) -> Self {
        Self {
            version: RECORD_VERSION,
            id: id.into(),
            name: name.into(),
            genotypes: data.genotypes().map(GenotypeRecord::from),
            phenotypes: data.phenotypes().map(PhenotypeRecord::from),
            distances: data.distances().map(DistanceRecord::from),
        }
    }

    /// Number of accessions, taken from the first stored table.
    pub fn size(&self) -> usize {
        self.genotypes
            .as_ref()
            .map(|g| g.frequencies.len())
            .or_else(|| self.phenotypes.as_ref().map(|p| p.values.len()))
            .or_else(|| self.distances.as_ref().map(|d| d.distances.len()))
            .unwrap_or(0)
    }

    /// Rebuilds the validated dataset.
    ///
    /// # Errors
    /// If the record version is not supported or any table fails
    /// validation.
    pub fn into_data(self) -> Result<CoreHunterData> {
        if self.version != RECORD_VERSION {
            return Err(CoreHunterError::invalid_argument(format!(
                "Dataset '{}' has record version {}, expected {RECORD_VERSION}",
                self.id, self.version
            )));
        }
        CoreHunterData::new(
            self.genotypes.map(GenotypeRecord::into_data).transpose()?,
            self.phenotypes.map(PhenotypeRecord::into_data).transpose()?,
            self.distances.map(DistanceRecord::into_data).transpose()?,
        )
    }
}

/// Datasets stored as JSON records in one directory.
#[derive(Debug)]
pub struct DatasetRepository {
    root: PathBuf,
    cache: Mutex<HashMap<String, Arc<CoreHunterData>>>,
}

impl DatasetRepository {
    /// Opens a repository rooted at `path`, creating the directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(path = %root.display(), "Opened dataset repository");
        Ok(Self {
            root,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Storage directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Stores a new dataset.
    ///
    /// # Errors
    /// If the identifier is not a plain name (letters, digits, `-`, `_`,
    /// `.`), a dataset with this identifier already exists, or writing
    /// fails.
    pub fn add(&self, id: &str, name: &str, data: &CoreHunterData) -> Result<()> {
        let path = self.record_path(id)?;
        if path.exists() {
            return Err(CoreHunterError::invalid_argument(format!(
                "Dataset '{id}' already exists"
            )));
        }

        let record = DatasetRecord::new(id, name, data);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(&record)?)?;
        fs::rename(&staging, &path)?;
        info!(id, accessions = data.size(), "Stored dataset");
        Ok(())
    }

    /// Reads the stored record of a dataset.
    pub fn get(&self, id: &str) -> Result<DatasetRecord> {
        let path = self.record_path(id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreHunterError::UnknownDataset { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Identifiers of all stored datasets, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Validated dataset, read through the cache.
    pub fn load(&self, id: &str) -> Result<Arc<CoreHunterData>> {
        if let Some(data) = self.cache().get(id) {
            return Ok(Arc::clone(data));
        }

        let data = Arc::new(self.get(id)?.into_data()?);
        debug!(id, accessions = data.size(), "Loaded dataset");
        let mut cache = self.cache();
        let cached = cache.entry(id.to_string()).or_insert(data);
        Ok(Arc::clone(cached))
    }

    /// Drops a dataset from the cache. Returns whether it was cached.
    pub fn evict(&self, id: &str) -> bool {
        self.cache().remove(id).is_some()
    }

    /// Deletes a stored dataset. Returns whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id)?;
        self.evict(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(id, "Removed dataset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(CoreHunterError::invalid_argument(format!(
                "Invalid dataset identifier '{id}'"
            )));
        }
        Ok(self.root.join(format!("{id}.{RECORD_EXTENSION}")))
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Arc<CoreHunterData>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
