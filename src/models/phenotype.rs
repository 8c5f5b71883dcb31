//! Phenotype data model.
//!
//! Typed trait values per accession and feature. Each feature declares a
//! measurement scale and, for numeric scales, an optional `[min, max]`
//! range used by range-normalized distances such as Gower.
//!
//! | Scale | Accepted values | Gower contribution |
//! |-------|-----------------|--------------------|
//! | Nominal | any | 0/1 mismatch |
//! | Ordinal | integer, real | `|x - y| / range` |
//! | Interval | integer, real | `|x - y| / range` |
//! | Ratio | integer, real | `|x - y| / range` |

use serde::{Deserialize, Serialize};

use crate::error::{CoreHunterError, Result, ValidationErrorKind};
use crate::validation::validate_headers;

use super::AccessionHeader;

/// Default dataset name for phenotype data.
pub const PHENOTYPE_DATA_NAME: &str = "Phenotypic trait data";

/// Measurement scale of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleType {
    /// Unordered categories.
    Nominal,
    /// Ordered categories encoded as numbers.
    Ordinal,
    /// Numbers with arbitrary zero.
    Interval,
    /// Numbers with a true zero.
    Ratio,
}

impl ScaleType {
    /// Whether values on this scale are compared numerically.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScaleType::Nominal)
    }

    /// Abbreviation used in data files.
    pub fn abbreviation(&self) -> char {
        match self {
            ScaleType::Nominal => 'N',
            ScaleType::Ordinal => 'O',
            ScaleType::Interval => 'I',
            ScaleType::Ratio => 'R',
        }
    }

    /// Parses the scale abbreviation used in data files (`N`, `O`, `I`, `R`).
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" | "NOMINAL" => Some(ScaleType::Nominal),
            "O" | "ORDINAL" => Some(ScaleType::Ordinal),
            "I" | "INTERVAL" => Some(ScaleType::Interval),
            "R" | "RATIO" => Some(ScaleType::Ratio),
            _ => None,
        }
    }
}

/// One trait value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhenotypeValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
}

impl PhenotypeValue {
    /// Numeric view of integer and real values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PhenotypeValue::Integer(v) => Some(*v as f64),
            PhenotypeValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            PhenotypeValue::Integer(_) => "integer",
            PhenotypeValue::Real(_) => "real",
            PhenotypeValue::Text(_) => "string",
            PhenotypeValue::Boolean(_) => "boolean",
        }
    }
}

/// Feature metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name.
    pub name: String,
    /// Measurement scale.
    pub scale: ScaleType,
    /// Lower bound of numeric values; inferred from the data when absent.
    pub min: Option<f64>,
    /// Upper bound of numeric values; inferred from the data when absent.
    pub max: Option<f64>,
}

impl Feature {
    /// Creates a feature without explicit bounds.
    pub fn new(name: impl Into<String>, scale: ScaleType) -> Self {
        Self {
            name: name.into(),
            scale,
            min: None,
            max: None,
        }
    }

    /// Sets explicit bounds.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// `max - min`, when both bounds are known.
    pub fn range(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }
}

/// Validated, immutable phenotype data.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenotypeData {
    name: String,
    headers: Vec<AccessionHeader>,
    features: Vec<Feature>,
    /// `values[accession][feature]`.
    values: Vec<Vec<Option<PhenotypeValue>>>,
}

impl PhenotypeData {
    /// Creates phenotype data.
    ///
    /// Every row must have one value per feature. Numeric scales accept
    /// only integer and real values, which must be finite and lie within
    /// the feature's explicit bounds. Missing bounds of numeric features
    /// are inferred from the observed values.
    pub fn new(
        headers: Vec<AccessionHeader>,
        mut features: Vec<Feature>,
        values: Vec<Vec<Option<PhenotypeValue>>>,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::EmptyData,
                "Empty phenotype matrix",
            ));
        }
        if features.is_empty() {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::EmptyData,
                "No phenotypic features",
            ));
        }
        let headers = validate_headers(headers, values.len())?;

        for (i, row) in values.iter().enumerate() {
            if row.len() != features.len() {
                return Err(CoreHunterError::validation(
                    ValidationErrorKind::DimensionMismatch,
                    format!(
                        "Incorrect number of values for accession {i}. Expected: {}, actual: {}",
                        features.len(),
                        row.len()
                    ),
                ));
            }
        }

        for (f, feature) in features.iter_mut().enumerate() {
            if let (Some(min), Some(max)) = (feature.min, feature.max) {
                if min > max {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::OutOfRange,
                        format!("Feature '{}' has minimum {min} above maximum {max}", feature.name),
                    ));
                }
            }

            let mut observed_min = f64::INFINITY;
            let mut observed_max = f64::NEG_INFINITY;
            for (i, row) in values.iter().enumerate() {
                let Some(value) = &row[f] else { continue };
                if !feature.scale.is_numeric() {
                    continue;
                }
                let x = value.as_f64().ok_or_else(|| {
                    CoreHunterError::validation(
                        ValidationErrorKind::TypeMismatch,
                        format!(
                            "Feature '{}' of accession {i} has a {} value on a {:?} scale",
                            feature.name,
                            value.type_name(),
                            feature.scale
                        ),
                    )
                })?;
                let below = feature.min.is_some_and(|min| x < min);
                let above = feature.max.is_some_and(|max| x > max);
                if !x.is_finite() || below || above {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::OutOfRange,
                        format!("Value {x} of feature '{}' in accession {i} is out of range", feature.name),
                    ));
                }
                observed_min = observed_min.min(x);
                observed_max = observed_max.max(x);
            }

            if feature.scale.is_numeric() && observed_min <= observed_max {
                feature.min.get_or_insert(observed_min);
                feature.max.get_or_insert(observed_max);
            }
        }

        Ok(Self {
            name: PHENOTYPE_DATA_NAME.to_string(),
            headers,
            features,
            values,
        })
    }

    /// Sets the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of accessions.
    pub fn size(&self) -> usize {
        self.headers.len()
    }

    pub fn header(&self, index: usize) -> &AccessionHeader {
        &self.headers[index]
    }

    pub fn headers(&self) -> &[AccessionHeader] {
        &self.headers
    }

    pub fn number_of_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, feature: usize) -> &Feature {
        &self.features[feature]
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Value of a feature for one accession; `None` if missing.
    pub fn value(&self, accession: usize, feature: usize) -> Option<&PhenotypeValue> {
        self.values[accession][feature].as_ref()
    }

    /// Range of a numeric feature (explicit or inferred bounds).
    pub fn range(&self, feature: usize) -> Option<f64> {
        let feature = &self.features[feature];
        if feature.scale.is_numeric() {
            feature.range()
        } else {
            None
        }
    }
}
