//! Dataset errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised while building or loading an attenuation dataset.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Dataset has no energy rows")]
    Empty,

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Phase '{phase}' has {len} coefficients but the dataset has {expected} energies")]
    RaggedColumn {
        phase: String,
        len: usize,
        expected: usize,
    },

    #[error("Invalid energy in row {row}: {value} kV ({reason})")]
    InvalidEnergy {
        row: usize,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid coefficient for phase '{phase}' at {energy_kv} kV: {value}")]
    InvalidCoefficient {
        phase: String,
        energy_kv: f64,
        value: f64,
    },

    #[error("Invalid phase name: '{phase}'")]
    InvalidPhaseName { phase: String },

    #[error("Duplicate phase column: {phase}")]
    DuplicatePhase { phase: String },

    #[error("Unknown phase: {phase}")]
    UnknownPhase { phase: String },

    #[error("Missing value in row {row}, column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Invalid number '{value}' in row {row}, column '{column}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unsupported dataset format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read dataset file: {}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DataError::MissingColumn {
            column: "Energy (kV)".into(),
        };
        assert!(err.to_string().contains("Energy (kV)"));

        let err = DataError::InvalidNumber {
            row: 3,
            column: "Fe".into(),
            value: "abc".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("abc"));
    }
}
