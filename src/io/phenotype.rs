//! Phenotype files.
//!
//! The header row holds the leading `ID`/`NAME` cells followed by the
//! feature names. A `TYPE` row gives one code per feature: the scale
//! (`N`, `O`, `I`, `R`) optionally followed by the value type (`I`
//! integer, `D` or `F` real, `B` boolean, `S` or `T` text). Without a
//! value type, nominal features hold text and numeric features reals.
//! Optional `MIN` and `MAX` rows set the bounds of numeric features.
//!
//! ```text
//! ID,NAME,height,colour,awned
//! TYPE,,RD,NS,NB
//! MIN,,0,,
//! MAX,,5,,
//! acc-1,Alice,1.5,red,true
//! acc-2,,,blue,false
//! ```

use std::path::Path;

use tracing::debug;

use crate::error::{CoreHunterError, Result};
use crate::models::{Feature, PhenotypeData, PhenotypeValue, ScaleType};

use super::{FileType, ID_HEADER, LeadingColumns, NAME_HEADER, Row, create_writer, dataset_name, read_rows};

/// Label of the feature type row.
pub const TYPE_ROW_HEADER: &str = "TYPE";
/// Label of the lower bound row.
pub const MIN_ROW_HEADER: &str = "MIN";
/// Label of the upper bound row.
pub const MAX_ROW_HEADER: &str = "MAX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Integer,
    Real,
    Boolean,
    Text,
}

impl ValueType {
    fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'I' => Some(ValueType::Integer),
            'D' | 'F' => Some(ValueType::Real),
            'B' => Some(ValueType::Boolean),
            'S' | 'T' => Some(ValueType::Text),
            _ => None,
        }
    }

    fn code(&self) -> char {
        match self {
            ValueType::Integer => 'I',
            ValueType::Real => 'D',
            ValueType::Boolean => 'B',
            ValueType::Text => 'S',
        }
    }

    fn default_for(scale: ScaleType) -> Self {
        if scale.is_numeric() { ValueType::Real } else { ValueType::Text }
    }

    fn of(value: &PhenotypeValue) -> Self {
        match value {
            PhenotypeValue::Integer(_) => ValueType::Integer,
            PhenotypeValue::Real(_) => ValueType::Real,
            PhenotypeValue::Boolean(_) => ValueType::Boolean,
            PhenotypeValue::Text(_) => ValueType::Text,
        }
    }

    fn parse(&self, cell: &str, line: usize) -> Result<Option<PhenotypeValue>> {
        if cell.is_empty() {
            return Ok(None);
        }
        let invalid = |what: &str| CoreHunterError::parse(line, format!("Invalid {what} value '{cell}'"));
        let value = match self {
            ValueType::Integer => PhenotypeValue::Integer(cell.parse().map_err(|_| invalid("integer"))?),
            ValueType::Real => PhenotypeValue::Real(cell.parse().map_err(|_| invalid("real"))?),
            ValueType::Boolean => match cell.to_ascii_lowercase().as_str() {
                "true" => PhenotypeValue::Boolean(true),
                "false" => PhenotypeValue::Boolean(false),
                _ => return Err(invalid("boolean")),
            },
            ValueType::Text => PhenotypeValue::Text(cell.to_string()),
        };
        Ok(Some(value))
    }
}

/// Parses a `TYPE` cell into a scale and value type.
fn parse_type_code(code: &str, line: usize) -> Result<(ScaleType, ValueType)> {
    let invalid = || CoreHunterError::parse(line, format!("Invalid feature type '{code}'"));
    let mut chars = code.chars();
    let scale = chars
        .next()
        .and_then(|c| ScaleType::from_abbreviation(&c.to_string()))
        .ok_or_else(invalid)?;
    let value_type = match (chars.next(), chars.next()) {
        (None, _) => ValueType::default_for(scale),
        (Some(c), None) => ValueType::from_code(c).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok((scale, value_type))
}

fn is_labelled(row: &Row, label: &str) -> bool {
    row.cells[0].eq_ignore_ascii_case(label)
}

fn parse_bounds(row: &Row, skip: usize, features: &[(ScaleType, ValueType)]) -> Result<Vec<Option<f64>>> {
    row.cells[skip..]
        .iter()
        .zip(features)
        .map(|(cell, (scale, _))| {
            if cell.is_empty() {
                return Ok(None);
            }
            if !scale.is_numeric() {
                return Err(CoreHunterError::parse(row.line, format!("Bound '{cell}' on a nominal feature")));
            }
            cell.parse::<f64>()
                .map(Some)
                .map_err(|_| CoreHunterError::parse(row.line, format!("Invalid bound '{cell}'")))
        })
        .collect()
}

/// Reads phenotype data. The dataset is named after the file.
pub fn read_phenotype_data(path: &Path, file_type: FileType) -> Result<PhenotypeData> {
    let rows = read_rows(path, file_type)?;
    let header = &rows[0];
    let leading = LeadingColumns::detect(&header.cells);
    if leading.id.is_none() {
        return Err(CoreHunterError::parse(
            header.line,
            format!("Phenotype files start with an {ID_HEADER} column"),
        ));
    }
    let skip = leading.count();
    let names = &header.cells[skip..];
    if let Some(c) = names.iter().position(String::is_empty) {
        return Err(CoreHunterError::parse(
            header.line,
            format!("Missing feature name in column {}", c + skip + 1),
        ));
    }

    let type_row = match rows.get(1) {
        Some(row) if is_labelled(row, TYPE_ROW_HEADER) => row,
        _ => {
            let line = rows.get(1).map_or(header.line + 1, |r| r.line);
            return Err(CoreHunterError::parse(line, format!("Expected {TYPE_ROW_HEADER} row")));
        }
    };
    let types = type_row.cells[skip..]
        .iter()
        .map(|code| parse_type_code(code, type_row.line))
        .collect::<Result<Vec<_>>>()?;

    let mut min = vec![None; types.len()];
    let mut max = vec![None; types.len()];
    let mut next = 2;
    while let Some(row) = rows.get(next) {
        if is_labelled(row, MIN_ROW_HEADER) {
            min = parse_bounds(row, skip, &types)?;
        } else if is_labelled(row, MAX_ROW_HEADER) {
            max = parse_bounds(row, skip, &types)?;
        } else {
            break;
        }
        next += 1;
    }

    let features: Vec<Feature> = names
        .iter()
        .zip(&types)
        .enumerate()
        .map(|(f, (name, (scale, _)))| Feature {
            name: name.clone(),
            scale: *scale,
            min: min[f],
            max: max[f],
        })
        .collect();

    let mut headers = Vec::with_capacity(rows.len() - next);
    let mut values = Vec::with_capacity(rows.len() - next);
    for row in &rows[next..] {
        headers.push(leading.header(&row.cells));
        let row_values = row.cells[skip..]
            .iter()
            .zip(&types)
            .map(|(cell, (_, value_type))| value_type.parse(cell, row.line))
            .collect::<Result<Vec<_>>>()?;
        values.push(row_values);
    }

    let data = PhenotypeData::new(headers, features, values)?;
    debug!(
        path = %path.display(),
        accessions = data.size(),
        features = data.number_of_features(),
        "Read phenotype data"
    );
    Ok(match dataset_name(path) {
        Some(name) => data.with_name(name),
        None => data,
    })
}

/// Value type written for feature `f`: the shared type of its values,
/// reals when integers and reals are mixed.
fn column_type(data: &PhenotypeData, f: usize) -> Result<ValueType> {
    let feature = data.feature(f);
    let mut column = None;
    for i in 0..data.size() {
        let Some(value) = data.value(i, f) else { continue };
        let value_type = ValueType::of(value);
        column = match column {
            None => Some(value_type),
            Some(t) if t == value_type => Some(t),
            Some(ValueType::Integer | ValueType::Real)
                if matches!(value_type, ValueType::Integer | ValueType::Real) =>
            {
                Some(ValueType::Real)
            }
            Some(_) => {
                return Err(CoreHunterError::invalid_argument(format!(
                    "Feature '{}' mixes value types and cannot be written",
                    feature.name
                )));
            }
        };
    }
    Ok(column.unwrap_or_else(|| ValueType::default_for(feature.scale)))
}

fn format_value(value: Option<&PhenotypeValue>) -> String {
    match value {
        None => String::new(),
        Some(PhenotypeValue::Integer(v)) => v.to_string(),
        Some(PhenotypeValue::Real(v)) => v.to_string(),
        Some(PhenotypeValue::Boolean(v)) => v.to_string(),
        Some(PhenotypeValue::Text(v)) => v.clone(),
    }
}

/// Writes phenotype data with `ID` and `NAME` columns, a `TYPE` row and
/// the `MIN`/`MAX` bounds of numeric features.
///
/// # Errors
/// [`CoreHunterError::InvalidArgument`] if a feature mixes value types
/// that cannot share one type code; nothing is written then.
pub fn write_phenotype_data(data: &PhenotypeData, path: &Path, file_type: FileType) -> Result<()> {
    let types = (0..data.number_of_features())
        .map(|f| column_type(data, f))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = create_writer(path, file_type)?;
    let mut record = vec![ID_HEADER.to_string(), NAME_HEADER.to_string()];
    record.extend(data.features().iter().map(|f| f.name.clone()));
    writer.write_record(&record)?;

    let mut record = vec![TYPE_ROW_HEADER.to_string(), String::new()];
    record.extend(
        data.features()
            .iter()
            .zip(&types)
            .map(|(f, t)| format!("{}{}", f.scale.abbreviation(), t.code())),
    );
    writer.write_record(&record)?;

    let bounds: [(&str, fn(&Feature) -> Option<f64>); 2] =
        [(MIN_ROW_HEADER, |f| f.min), (MAX_ROW_HEADER, |f| f.max)];
    for (label, bound) in bounds {
        let mut record = vec![label.to_string(), String::new()];
        record.extend(data.features().iter().map(|f| {
            if f.scale.is_numeric() {
                bound(f).map(|b| b.to_string()).unwrap_or_default()
            } else {
                String::new()
            }
        }));
        writer.write_record(&record)?;
    }

    for i in 0..data.size() {
        let header = data.header(i);
        let mut cells = vec![
            header.id.clone().unwrap_or_default(),
            header.name.clone().unwrap_or_default(),
        ];
        cells.extend((0..data.number_of_features()).map(|f| format_value(data.value(i, f))));
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}
