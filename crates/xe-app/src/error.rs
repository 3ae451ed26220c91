//! Error types for the xe-app service layer.

use std::path::PathBuf;
use xe_model::ModelError;

/// Application error shared by every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Plan error: {0}")]
    Project(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Spectrum cannot be estimated: {0}")]
    DegenerateFit(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for xe-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn invalid(field: &str, value: impl ToString, reason: &str) -> Self {
        AppError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InputOutOfRange {
                field,
                value,
                reason,
            } => AppError::invalid(field, value, reason),
            ModelError::UnknownPhase { phase } => AppError::UnknownPhase(phase),
            ModelError::DegenerateFit { reason } => AppError::DegenerateFit(reason),
        }
    }
}

impl From<xe_project::ProjectError> for AppError {
    fn from(err: xe_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<xe_data::DataError> for AppError {
    fn from(err: xe_data::DataError) -> Self {
        AppError::Dataset(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Report(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Report(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Report(err.to_string())
    }
}
