//! Core collection selection for genebank accessions.
//!
//! Selects a subset (the core) of a germplasm collection that maximally
//! represents its diversity, measured on genotypes, phenotypic traits
//! and/or precomputed distances. Several diversity objectives can be
//! combined; their values are rescaled into comparable ranges before
//! weighting.
//!
//! # Modules
//!
//! - **`models`**: Validated accession data: `GenotypeData`,
//!   `PhenotypeData`, `DistanceMatrixData`, combined in `CoreHunterData`
//! - **`validation`**: Frequency sum rules and header/name checks
//! - **`distance`**: Modified Rogers, Cavalli-Sforza & Edwards, Gower and
//!   precomputed distance measures
//! - **`objectives`**: Diversity objectives and the weighted combination
//! - **`search`**: Subset solutions, stop conditions, listeners and the
//!   random descent optimizer
//! - **`normalization`**: Per-objective ranges from single-objective runs
//! - **`execution`**: Settings, arguments and the `CoreHunter` executor
//! - **`io`**: Delimited text readers and writers
//! - **`repository`**: File-backed dataset store with an in-memory cache
//! - **`interop`**: Flat-array constructors and R missing-value encoding
//!
//! # Example
//!
//! ```no_run
//! use core_hunter::execution::{CoreHunter, CoreHunterArguments, ExecutionSettings};
//! use core_hunter::models::{CoreHunterData, DistanceMatrixData};
//! use std::sync::Arc;
//!
//! let matrix = vec![vec![0.0, 0.4, 0.9], vec![0.4, 0.0, 0.6], vec![0.9, 0.6, 0.0]];
//! let distances = DistanceMatrixData::new(Vec::new(), &matrix)?;
//! let data = Arc::new(CoreHunterData::new(None, None, Some(distances))?);
//!
//! let arguments = CoreHunterArguments::new(data, 2, Vec::new());
//! let settings = ExecutionSettings::default().with_max_steps(100).with_seed(7);
//! let core = CoreHunter::new(settings).execute(&arguments)?;
//! assert_eq!(core.subset_size(), 2);
//! # Ok::<(), core_hunter::error::CoreHunterError>(())
//! ```
//!
//! # References
//!
//! - Thachuk et al. (2009), "Core Hunter: an algorithm for sampling genetic
//!   resources based on multiple genetic measures", BMC Bioinformatics
//! - De Beukelaer et al. (2012), "Core Hunter II: fast core subset selection
//!   based on multiple genetic diversity measures using Mixed Replica search"
//! - Gower (1971), "A general coefficient of similarity and some of its
//!   properties", Biometrics

pub mod distance;
pub mod error;
pub mod execution;
pub mod interop;
pub mod io;
pub mod models;
pub mod normalization;
pub mod objectives;
pub mod repository;
pub mod search;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{CoreHunterError, Result};
