//! Genotype files.
//!
//! | Format | Header rows | Cells |
//! |--------|-------------|-------|
//! | Frequency | marker names (one per allele column), optional `ALLELE` row of allele names | frequencies |
//! | Biallelic | marker names | dosage scores `0..=2` |
//! | Default | column names (`mk1-1`, `mk1-2`, ...) | observed allele labels |

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreHunterError, Result};
use crate::models::GenotypeData;

use super::{
    FileType, ID_HEADER, LeadingColumns, NAME_HEADER, Row, create_writer, dataset_name, format_optional,
    non_empty, parse_frequency, read_rows,
};

/// Label of the allele-name row in frequency files.
pub const ALLELE_ROW_HEADER: &str = "ALLELE";

/// Ploidy of dosage score files.
pub const BIALLELIC_PLOIDY: u32 = 2;

/// Genotype file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenotypeFormat {
    /// Allele frequencies, one column per allele.
    Frequency,
    /// Diploid dosage scores, one column per marker.
    Biallelic,
    /// Observed allele labels, one column per chromosome copy.
    Default,
}

/// Reads genotype data. The dataset is named after the file.
pub fn read_genotype_data(path: &Path, file_type: FileType, format: GenotypeFormat) -> Result<GenotypeData> {
    let rows = read_rows(path, file_type)?;
    let data = match format {
        GenotypeFormat::Frequency => parse_frequency_rows(&rows)?,
        GenotypeFormat::Biallelic => parse_score_rows(&rows)?,
        GenotypeFormat::Default => parse_default_rows(&rows)?,
    };
    debug!(
        path = %path.display(),
        accessions = data.size(),
        markers = data.number_of_markers(),
        "Read genotype data"
    );
    Ok(match dataset_name(path) {
        Some(name) => data.with_name(name),
        None => data,
    })
}

/// Writes genotype data with `ID` and `NAME` columns.
///
/// # Errors
/// If a marker has no name, two markers share a name, the biallelic format is requested for data
/// not built from diploid scores, or the default format is requested
/// (allele labels cannot be recovered from frequencies).
pub fn write_genotype_data(
    data: &GenotypeData,
    path: &Path,
    file_type: FileType,
    format: GenotypeFormat,
) -> Result<()> {
    let marker_names = data
        .marker_names()
        .iter()
        .enumerate()
        .map(|(m, name)| {
            name.clone().ok_or_else(|| {
                CoreHunterError::invalid_argument(format!("Marker {m} has no name; marker names are required"))
            })
        })
        .collect::<Result<Vec<String>>>()?;
    let mut seen = HashSet::new();
    if let Some(name) = marker_names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(CoreHunterError::invalid_argument(format!(
            "Duplicate marker name '{name}'; marker names must be unique to be read back"
        )));
    }
    match format {
        GenotypeFormat::Biallelic if data.ploidy() != Some(BIALLELIC_PLOIDY) => {
            return Err(CoreHunterError::invalid_argument(
                "Biallelic files require data built from diploid dosage scores",
            ));
        }
        GenotypeFormat::Default => {
            return Err(CoreHunterError::invalid_argument(
                "Genotype data can not be written in the default format",
            ));
        }
        _ => {}
    }

    let mut writer = create_writer(path, file_type)?;
    let mut record = vec![ID_HEADER.to_string(), NAME_HEADER.to_string()];
    match format {
        GenotypeFormat::Frequency => {
            for (m, name) in marker_names.iter().enumerate() {
                record.extend(std::iter::repeat(name.clone()).take(data.number_of_alleles(m)));
            }
            writer.write_record(&record)?;

            let mut alleles = vec![ALLELE_ROW_HEADER.to_string(), String::new()];
            for names in data.allele_names_by_marker() {
                alleles.extend(names.into_iter().map(Option::unwrap_or_default));
            }
            writer.write_record(&alleles)?;

            for i in 0..data.size() {
                let mut row = header_cells(data, i);
                for m in 0..data.number_of_markers() {
                    row.extend(data.marker_frequencies(i, m).iter().map(|f| format_optional(*f)));
                }
                writer.write_record(&row)?;
            }
        }
        _ => {
            record.extend(marker_names);
            writer.write_record(&record)?;
            for i in 0..data.size() {
                let mut row = header_cells(data, i);
                row.extend((0..data.number_of_markers()).map(|m| format_optional(data.allele_score(i, m))));
                writer.write_record(&row)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn header_cells(data: &GenotypeData, i: usize) -> Vec<String> {
    let header = data.header(i);
    vec![
        header.id.clone().unwrap_or_default(),
        header.name.clone().unwrap_or_default(),
    ]
}

/// Splits rows into leading columns, the header row(s) and data rows.
fn split_header(rows: &[Row]) -> (LeadingColumns, &Row, &[Row]) {
    let leading = LeadingColumns::detect(&rows[0].cells);
    (leading, &rows[0], &rows[1..])
}

fn require_data(data_rows: &[Row], header: &Row) -> Result<()> {
    if data_rows.is_empty() {
        return Err(CoreHunterError::parse(header.line, "No accessions after the header rows"));
    }
    Ok(())
}

fn parse_frequency_rows(rows: &[Row]) -> Result<GenotypeData> {
    let (leading, header, rest) = split_header(rows);
    let skip = leading.count();
    let columns = &header.cells[skip..];

    let mut markers: Vec<(String, usize)> = Vec::new();
    let mut seen = HashSet::new();
    for (c, name) in columns.iter().enumerate() {
        if name.is_empty() {
            return Err(CoreHunterError::parse(
                header.line,
                format!("Missing marker name in column {}", c + skip + 1),
            ));
        }
        match markers.last_mut() {
            Some((last, count)) if last == name => *count += 1,
            _ => {
                if !seen.insert(name.as_str()) {
                    return Err(CoreHunterError::parse(
                        header.line,
                        format!("Columns of marker '{name}' are not consecutive"),
                    ));
                }
                markers.push((name.clone(), 1));
            }
        }
    }

    let has_allele_row = rest.first().is_some_and(|row| {
        if skip > 0 {
            row.cells[0].eq_ignore_ascii_case(ALLELE_ROW_HEADER)
        } else {
            row.cells.iter().any(|c| !c.is_empty() && c.parse::<f64>().is_err())
        }
    });
    let (allele_row, data_rows) = if has_allele_row {
        (Some(&rest[0]), &rest[1..])
    } else {
        (None, rest)
    };
    require_data(data_rows, header)?;

    let allele_names = allele_row.map(|row| {
        let mut offset = skip;
        markers
            .iter()
            .map(|(_, count)| {
                let names: Vec<Option<String>> =
                    row.cells[offset..offset + count].iter().map(|c| non_empty(c)).collect();
                offset += count;
                names
            })
            .collect::<Vec<Vec<Option<String>>>>()
    });

    let mut headers = Vec::with_capacity(data_rows.len());
    let mut frequencies = Vec::with_capacity(data_rows.len());
    for row in data_rows {
        headers.push(leading.header(&row.cells));
        let mut offset = skip;
        let mut accession = Vec::with_capacity(markers.len());
        for (_, count) in &markers {
            let freqs = row.cells[offset..offset + count]
                .iter()
                .map(|c| parse_frequency(c, row.line))
                .collect::<Result<Vec<_>>>()?;
            offset += count;
            accession.push(freqs);
        }
        frequencies.push(accession);
    }

    let marker_names = markers.into_iter().map(|(name, _)| Some(name)).collect();
    GenotypeData::from_frequencies(headers, Some(marker_names), allele_names, &frequencies)
}

fn parse_score_rows(rows: &[Row]) -> Result<GenotypeData> {
    let (leading, header, data_rows) = split_header(rows);
    require_data(data_rows, header)?;
    let skip = leading.count();
    let marker_names = header.cells[skip..].iter().map(|c| non_empty(c)).collect();

    let mut headers = Vec::with_capacity(data_rows.len());
    let mut scores = Vec::with_capacity(data_rows.len());
    for row in data_rows {
        headers.push(leading.header(&row.cells));
        let values = row.cells[skip..]
            .iter()
            .map(|c| {
                if c.is_empty() {
                    return Ok(None);
                }
                c.parse::<u32>()
                    .map(Some)
                    .map_err(|_| CoreHunterError::parse(row.line, format!("Invalid allele score '{c}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        scores.push(values);
    }
    GenotypeData::from_scores(headers, Some(marker_names), &scores, BIALLELIC_PLOIDY)
}

fn parse_default_rows(rows: &[Row]) -> Result<GenotypeData> {
    let (leading, header, data_rows) = split_header(rows);
    require_data(data_rows, header)?;
    let skip = leading.count();
    let columns = header.cells[skip..].to_vec();

    let headers = data_rows.iter().map(|row| leading.header(&row.cells)).collect();
    let genotypes: Vec<Vec<Option<String>>> = data_rows
        .iter()
        .map(|row| row.cells[skip..].iter().map(|c| non_empty(c)).collect())
        .collect();
    GenotypeData::from_default(headers, &columns, &genotypes)
}
