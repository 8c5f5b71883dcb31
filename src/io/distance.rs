//! Distance matrix files.
//!
//! The header row holds the leading `ID`/`NAME` cells followed by one
//! label per accession column; each following row holds the leading
//! cells and one distance per accession.

use std::path::Path;

use tracing::debug;

use crate::error::{CoreHunterError, Result};
use crate::models::DistanceMatrixData;

use super::{FileType, ID_HEADER, LeadingColumns, NAME_HEADER, create_writer, dataset_name, read_rows};

/// Reads a square distance matrix. The dataset is named after the file.
pub fn read_distance_data(path: &Path, file_type: FileType) -> Result<DistanceMatrixData> {
    let rows = read_rows(path, file_type)?;
    let leading = LeadingColumns::detect(&rows[0].cells);
    let skip = leading.count();
    let data_rows = &rows[1..];
    let n = rows[0].cells.len() - skip;
    if data_rows.len() != n {
        return Err(CoreHunterError::parse(
            rows[0].line,
            format!("Expected {n} rows for {n} columns, found {}", data_rows.len()),
        ));
    }

    let mut headers = Vec::with_capacity(n);
    let mut distances = Vec::with_capacity(n);
    for row in data_rows {
        headers.push(leading.header(&row.cells));
        let values = row.cells[skip..]
            .iter()
            .map(|c| {
                c.parse::<f64>()
                    .map_err(|_| CoreHunterError::parse(row.line, format!("Invalid distance '{c}'")))
            })
            .collect::<Result<Vec<f64>>>()?;
        distances.push(values);
    }

    let data = DistanceMatrixData::new(headers, &distances)?;
    debug!(path = %path.display(), accessions = data.size(), "Read distance matrix");
    Ok(match dataset_name(path) {
        Some(name) => data.with_name(name),
        None => data,
    })
}

/// Writes a distance matrix with `ID` and `NAME` columns. Column labels
/// are the accession identifiers.
pub fn write_distance_data(data: &DistanceMatrixData, path: &Path, file_type: FileType) -> Result<()> {
    let mut writer = create_writer(path, file_type)?;
    let mut record = vec![ID_HEADER.to_string(), NAME_HEADER.to_string()];
    record.extend(data.headers().iter().map(|h| h.id.clone().unwrap_or_default()));
    writer.write_record(&record)?;

    for (i, row) in data.to_matrix().into_iter().enumerate() {
        let header = data.header(i);
        let mut cells = vec![
            header.id.clone().unwrap_or_default(),
            header.name.clone().unwrap_or_default(),
        ];
        cells.extend(row.iter().map(f64::to_string));
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{distances, headers};
    use std::fs;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let data = DistanceMatrixData::new(headers(), &distances()).unwrap();
        let path = dir.path().join("dist.txt");
        write_distance_data(&data, &path, FileType::Txt).unwrap();
        let back = read_distance_data(&path, FileType::Txt).unwrap();
        assert_eq!(back.name(), "dist");
        assert_eq!(back.headers(), data.headers());
        assert_eq!(back.to_matrix(), data.to_matrix());
    }

    #[test]
    fn test_read_without_leading_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        fs::write(&path, "a,b\n0,0.5\n0.5,0\n").unwrap();
        let data = read_distance_data(&path, FileType::Csv).unwrap();
        assert_eq!(data.distance(0, 1), 0.5);
        assert!(data.header(0).is_blank());
    }

    #[test]
    fn test_rejects_non_square() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rect.csv");
        fs::write(&path, "ID,a,b\nx,0,1\n").unwrap();
        let err = read_distance_data(&path, FileType::Csv).unwrap_err();
        assert!(matches!(err, CoreHunterError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_rejects_missing_distance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gap.csv");
        fs::write(&path, "a,b\n0,\n0.5,0\n").unwrap();
        let err = read_distance_data(&path, FileType::Csv).unwrap_err();
        assert!(matches!(err, CoreHunterError::Parse { line: 2, .. }));
    }
}
