//! Core selection domain models.
//!
//! Immutable, validated data sources keyed by a 0-based accession index,
//! and their aggregation into one dataset.
//!
//! # Sources
//!
//! | Type | Content | Distance measures |
//! |------|---------|-------------------|
//! | `GenotypeData` | allele frequencies per marker | Modified Rogers, Cavalli-Sforza & Edwards |
//! | `PhenotypeData` | typed trait values | Gower |
//! | `DistanceMatrixData` | precomputed distances | lookup |

mod dataset;
mod distance;
mod genotype;
mod header;
mod phenotype;

pub use dataset::{CoreHunterData, DataCapabilities};
pub use distance::{DISTANCE_DATA_NAME, DistanceMatrixData, SYMMETRY_TOLERANCE};
pub use genotype::{
    BIALLELIC_DATA_NAME, DEFAULT_DATA_NAME, FREQUENCY_DATA_NAME, GenotypeData, MarkerColumns,
    infer_marker_columns, is_missing_genotype, marker_base_name,
};
pub use header::{AccessionHeader, headers_from_ids};
pub use phenotype::{Feature, PHENOTYPE_DATA_NAME, PhenotypeData, PhenotypeValue, ScaleType};
