//! Combined core selection dataset.
//!
//! Up to one genotype, one phenotype and one distance source share a
//! single accession index space. Sources are held behind `Arc` so the
//! same immutable data can be read concurrently by search workers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreHunterError, Result, ValidationErrorKind};

use super::{AccessionHeader, DistanceMatrixData, GenotypeData, PhenotypeData};

/// Which data sources a dataset carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataCapabilities {
    pub genotypes: bool,
    pub phenotypes: bool,
    pub distances: bool,
}

impl DataCapabilities {
    /// Number of sources present.
    pub fn count(&self) -> usize {
        [self.genotypes, self.phenotypes, self.distances]
            .iter()
            .filter(|&&present| present)
            .count()
    }
}

/// Genotypes, phenotypes and/or distances for one collection.
#[derive(Debug, Clone)]
pub struct CoreHunterData {
    genotypes: Option<Arc<GenotypeData>>,
    phenotypes: Option<Arc<PhenotypeData>>,
    distances: Option<Arc<DistanceMatrixData>>,
    /// Merged headers: first assigned id and name per index.
    headers: Vec<AccessionHeader>,
    index: HashMap<String, usize>,
}

impl CoreHunterData {
    /// Combines the given sources.
    ///
    /// # Errors
    /// If no source is given, sources differ in size, or two sources
    /// assign different identifiers to the same index.
    pub fn new(
        genotypes: Option<GenotypeData>,
        phenotypes: Option<PhenotypeData>,
        distances: Option<DistanceMatrixData>,
    ) -> Result<Self> {
        Self::from_shared(
            genotypes.map(Arc::new),
            phenotypes.map(Arc::new),
            distances.map(Arc::new),
        )
    }

    /// Combines already shared sources.
    pub fn from_shared(
        genotypes: Option<Arc<GenotypeData>>,
        phenotypes: Option<Arc<PhenotypeData>>,
        distances: Option<Arc<DistanceMatrixData>>,
    ) -> Result<Self> {
        let mut sources: Vec<(&str, &[AccessionHeader])> = Vec::new();
        if let Some(g) = &genotypes {
            sources.push(("genotypes", g.headers()));
        }
        if let Some(p) = &phenotypes {
            sources.push(("phenotypes", p.headers()));
        }
        if let Some(d) = &distances {
            sources.push(("distances", d.headers()));
        }
        let Some(&(first_name, first)) = sources.first() else {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::EmptyData,
                "At least one of genotypes, phenotypes or distances is required",
            ));
        };

        let size = first.len();
        for &(name, headers) in &sources[1..] {
            if headers.len() != size {
                return Err(CoreHunterError::validation(
                    ValidationErrorKind::InconsistentDatasets,
                    format!(
                        "Size of {name} ({}) does not match size of {first_name} ({size})",
                        headers.len()
                    ),
                ));
            }
        }

        let mut merged = vec![AccessionHeader::default(); size];
        for &(name, headers) in &sources {
            for (i, header) in headers.iter().enumerate() {
                let target = &mut merged[i];
                match (&target.id, &header.id) {
                    (Some(existing), Some(id)) if existing != id => {
                        return Err(CoreHunterError::validation(
                            ValidationErrorKind::InconsistentDatasets,
                            format!(
                                "Identifier '{id}' of accession {i} in {name} does not match '{existing}'"
                            ),
                        ));
                    }
                    (None, Some(id)) => target.id = Some(id.clone()),
                    _ => {}
                }
                if target.name.is_none() {
                    target.name = header.name.clone();
                }
            }
        }

        let mut index = HashMap::new();
        for (i, header) in merged.iter().enumerate() {
            if let Some(id) = &header.id {
                if index.insert(id.clone(), i).is_some() {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::DuplicateId,
                        format!("Duplicate identifier '{id}' at accession {i}"),
                    ));
                }
            }
        }

        Ok(Self {
            genotypes,
            phenotypes,
            distances,
            headers: merged,
            index,
        })
    }

    /// Returns a copy with the genotype source replaced.
    pub fn with_genotypes(self, genotypes: GenotypeData) -> Result<Self> {
        Self::from_shared(Some(Arc::new(genotypes)), self.phenotypes, self.distances)
    }

    /// Returns a copy with the phenotype source replaced.
    pub fn with_phenotypes(self, phenotypes: PhenotypeData) -> Result<Self> {
        Self::from_shared(self.genotypes, Some(Arc::new(phenotypes)), self.distances)
    }

    /// Returns a copy with the distance source replaced.
    pub fn with_distances(self, distances: DistanceMatrixData) -> Result<Self> {
        Self::from_shared(self.genotypes, self.phenotypes, Some(Arc::new(distances)))
    }

    pub fn genotypes(&self) -> Option<&GenotypeData> {
        self.genotypes.as_deref()
    }

    pub fn phenotypes(&self) -> Option<&PhenotypeData> {
        self.phenotypes.as_deref()
    }

    pub fn distances(&self) -> Option<&DistanceMatrixData> {
        self.distances.as_deref()
    }

    pub fn has_genotypes(&self) -> bool {
        self.genotypes.is_some()
    }

    pub fn has_phenotypes(&self) -> bool {
        self.phenotypes.is_some()
    }

    pub fn has_distances(&self) -> bool {
        self.distances.is_some()
    }

    pub fn capabilities(&self) -> DataCapabilities {
        DataCapabilities {
            genotypes: self.has_genotypes(),
            phenotypes: self.has_phenotypes(),
            distances: self.has_distances(),
        }
    }

    /// Number of accessions.
    #[inline]
    pub fn size(&self) -> usize {
        self.headers.len()
    }

    /// Merged header of accession `index`.
    ///
    /// # Panics
    /// If `index >= size()`.
    pub fn header(&self, index: usize) -> &AccessionHeader {
        &self.headers[index]
    }

    pub fn headers(&self) -> &[AccessionHeader] {
        &self.headers
    }

    /// Identifiers by index; `None` where unassigned.
    pub fn ids(&self) -> Vec<Option<&str>> {
        self.headers.iter().map(|h| h.id.as_deref()).collect()
    }

    /// Index of the accession with unique identifier `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Identifiers of the given indices.
    pub fn ids_from_indices(&self, indices: &[usize]) -> Vec<Option<&str>> {
        indices.iter().map(|&i| self.headers[i].id.as_deref()).collect()
    }

    /// Indices of the given identifiers.
    ///
    /// # Errors
    /// If an identifier is unknown.
    pub fn indices_from_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<usize>> {
        ids.iter()
            .map(|id| {
                self.index_of(id.as_ref()).ok_or_else(|| {
                    CoreHunterError::invalid_argument(format!("Unknown accession identifier '{}'", id.as_ref()))
                })
            })
            .collect()
    }
}
