//! Dataset loading from spreadsheet exports (CSV), JSON and YAML.

use crate::dataset::{AttenuationDataset, ENERGY_COLUMN, PhaseColumn};
use crate::error::{DataError, DataResult};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Parse a CSV table whose header contains `Energy (kV)` plus one column per phase.
///
/// Row numbers in errors count data rows from 1 (the header is not counted).
pub fn from_csv_reader<R: Read>(reader: R, filter_phase: &str) -> DataResult<AttenuationDataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let energy_idx = headers
        .iter()
        .position(|h| h == ENERGY_COLUMN)
        .ok_or_else(|| DataError::MissingColumn {
            column: ENERGY_COLUMN.to_string(),
        })?;

    let mut energies = Vec::new();
    let mut columns: Vec<PhaseColumn> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != energy_idx)
        .map(|(_, name)| PhaseColumn {
            name: name.to_string(),
            coefficients: Vec::new(),
        })
        .collect();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        energies.push(parse_cell(record.get(energy_idx), row, ENERGY_COLUMN)?);

        let mut col = 0;
        for (j, header) in headers.iter().enumerate() {
            if j == energy_idx {
                continue;
            }
            let value = parse_cell(record.get(j), row, header)?;
            columns[col].coefficients.push(value);
            col += 1;
        }
    }

    let dataset = AttenuationDataset::new(energies, columns, filter_phase)?;
    debug!(
        rows = dataset.len(),
        phases = dataset.columns().len(),
        "parsed attenuation table"
    );
    Ok(dataset)
}

fn parse_cell(cell: Option<&str>, row: usize, column: &str) -> DataResult<f64> {
    let text = cell.unwrap_or("").trim();
    if text.is_empty() {
        return Err(DataError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    text.parse::<f64>().map_err(|_| DataError::InvalidNumber {
        row,
        column: column.to_string(),
        value: text.to_string(),
    })
}

/// Load a CSV export.
pub fn load_csv(path: &Path, filter_phase: &str) -> DataResult<AttenuationDataset> {
    let file = std::fs::File::open(path).map_err(|e| DataError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    from_csv_reader(file, filter_phase)
}

/// Load a JSON dataset (`{ energies_kv, phases: [{name, coefficients}], filter_phase }`).
pub fn load_json(path: &Path) -> DataResult<AttenuationDataset> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a YAML dataset with the same shape as the JSON form.
pub fn load_yaml(path: &Path) -> DataResult<AttenuationDataset> {
    let content = read(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load by file extension (`csv`, `json`, `yaml`/`yml`).
///
/// `filter_phase` names the filter column; for JSON/YAML files it overrides the
/// value stored in the file.
pub fn load_dataset(path: &Path, filter_phase: &str) -> DataResult<AttenuationDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let dataset = match ext.as_deref() {
        Some("csv") => load_csv(path, filter_phase)?,
        Some("json") => load_json(path)?.with_filter_phase(filter_phase)?,
        Some("yaml") | Some("yml") => load_yaml(path)?.with_filter_phase(filter_phase)?,
        _ => {
            return Err(DataError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    debug!(path = %path.display(), rows = dataset.len(), "loaded attenuation dataset");
    Ok(dataset)
}

fn read(path: &Path) -> DataResult<String> {
    std::fs::read_to_string(path).map_err(|e| DataError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_column_may_be_anywhere() {
        let csv = "Water,Energy (kV),Fe\n5.33,10,1343\n0.81,20,202.2\n";
        let ds = from_csv_reader(csv.as_bytes(), "Fe").unwrap();
        assert_eq!(ds.energies_kv(), &[10.0, 20.0]);
        assert_eq!(ds.phase("Water").unwrap(), &[5.33, 0.81]);
        assert_eq!(ds.phase_names(), vec!["Water", "Fe"]);
    }

    #[test]
    fn missing_energy_column() {
        let csv = "Water,Fe\n5.33,1343\n";
        let err = from_csv_reader(csv.as_bytes(), "Fe").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn blank_cell_reports_position() {
        let csv = "Energy (kV),Water,Fe\n10,5.33,1343\n20,,202.2\n";
        let err = from_csv_reader(csv.as_bytes(), "Fe").unwrap_err();
        match err {
            DataError::MissingValue { row, column } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Water");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_cell() {
        let csv = "Energy (kV),Water,Fe\n10,five,1343\n";
        let err = from_csv_reader(csv.as_bytes(), "Fe").unwrap_err();
        assert!(matches!(err, DataError::InvalidNumber { row: 1, .. }));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_dataset(Path::new("table.xlsx"), "Fe").unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat { .. }));
    }
}
