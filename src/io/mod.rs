//! Delimited text files for genotypes, phenotypes and distance matrices.
//!
//! `.txt` files are tab separated, `.csv` files comma separated. Cells are
//! trimmed and unquoted (double quotes by the CSV parser, single quotes
//! here); an empty cell is a missing value.
//!
//! # Leading columns
//! Up to two leading columns carry accession identifiers and names. They
//! are recognized by the header cells `ID` and `NAME` (any case) at the
//! start of the first row.
//!
//! ```text
//! ID,NAME,mk1,mk1,mk2,mk2
//! ALLELE,,a,b,a,b
//! acc-1,Alice,0.5,0.5,1.0,0.0
//! acc-2,,,,0.2,0.8
//! ```
//!
//! # Submodules
//!
//! - [`read_genotype_data`] / [`write_genotype_data`]: frequency, biallelic
//!   score and allele label files
//! - [`read_phenotype_data`] / [`write_phenotype_data`]: typed trait values
//!   with scale codes and bounds
//! - [`read_distance_data`] / [`write_distance_data`]: square distance
//!   matrices

mod distance;
mod genotype;
mod phenotype;

pub use distance::{read_distance_data, write_distance_data};
pub use genotype::{BIALLELIC_PLOIDY, GenotypeFormat, read_genotype_data, write_genotype_data};
pub use phenotype::{MAX_ROW_HEADER, MIN_ROW_HEADER, TYPE_ROW_HEADER, read_phenotype_data, write_phenotype_data};

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CoreHunterError, Result};
use crate::models::AccessionHeader;

/// Header cell of the identifier column.
pub const ID_HEADER: &str = "ID";
/// Header cell of the name column.
pub const NAME_HEADER: &str = "NAME";

/// Supported file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Tab separated.
    Txt,
    /// Comma separated.
    Csv,
}

impl FileType {
    /// Field delimiter.
    pub fn delimiter(&self) -> u8 {
        match self {
            FileType::Txt => b'\t',
            FileType::Csv => b',',
        }
    }

    /// File type from the extension of `path`, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("txt") {
            Some(FileType::Txt)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(FileType::Csv)
        } else {
            None
        }
    }
}

/// One parsed line with its 1-based line number.
#[derive(Debug, Clone)]
struct Row {
    line: usize,
    cells: Vec<String>,
}

/// Leading identifier/name columns of a file.
#[derive(Debug, Clone, Copy, Default)]
struct LeadingColumns {
    id: Option<usize>,
    name: Option<usize>,
}

impl LeadingColumns {
    fn detect(header: &[String]) -> Self {
        let mut leading = LeadingColumns::default();
        for (c, cell) in header.iter().take(2).enumerate() {
            if cell.eq_ignore_ascii_case(ID_HEADER) && leading.id.is_none() {
                leading.id = Some(c);
            } else if cell.eq_ignore_ascii_case(NAME_HEADER) && leading.name.is_none() {
                leading.name = Some(c);
            } else {
                break;
            }
        }
        leading
    }

    fn count(&self) -> usize {
        usize::from(self.id.is_some()) + usize::from(self.name.is_some())
    }

    fn header(&self, cells: &[String]) -> AccessionHeader {
        let cell = |c: Option<usize>| c.and_then(|c| non_empty(&cells[c]));
        AccessionHeader::from_parts(cell(self.id), cell(self.name))
    }
}

fn non_empty(cell: &str) -> Option<String> {
    if cell.is_empty() { None } else { Some(cell.to_string()) }
}

/// Strips one pair of surrounding single quotes.
fn unquote(cell: &str) -> &str {
    let cell = cell.trim();
    if cell.len() >= 2 && cell.starts_with('\'') && cell.ends_with('\'') {
        &cell[1..cell.len() - 1]
    } else {
        cell
    }
}

/// Reads all non-empty rows, checking that they have equal length.
fn read_rows(path: &Path, file_type: FileType) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(file_type.delimiter())
        .from_path(path)?;

    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(rows.len() + 1, |p| p.line() as usize);
        let cells: Vec<String> = record.iter().map(|c| unquote(c).to_string()).collect();
        if let Some(first) = rows.first() {
            if cells.len() != first.cells.len() {
                return Err(CoreHunterError::parse(
                    line,
                    format!("Expected {} cells, found {}", first.cells.len(), cells.len()),
                ));
            }
        }
        rows.push(Row { line, cells });
    }
    if rows.is_empty() {
        return Err(CoreHunterError::parse(1, format!("File {} is empty", path.display())));
    }
    Ok(rows)
}

fn create_writer(path: &Path, file_type: FileType) -> Result<Writer<File>> {
    Ok(WriterBuilder::new()
        .delimiter(file_type.delimiter())
        .flexible(false)
        .from_path(path)?)
}

/// Dataset name derived from the file name.
fn dataset_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

fn parse_frequency(cell: &str, line: usize) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| CoreHunterError::parse(line, format!("Invalid frequency '{cell}'")))
}

fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
