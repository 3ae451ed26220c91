//! Model errors.

use thiserror::Error;
use xe_core::XeError;
use xe_fit::FitError;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the planning models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// An input outside its declared domain.
    #[error("Input out of range: {field} = {value} ({reason})")]
    InputOutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A phase that is not a column of the attenuation dataset.
    #[error("Unknown phase: {phase}")]
    UnknownPhase { phase: String },

    /// The spectrum fits could not produce usable values.
    #[error("Spectrum cannot be estimated for this composition and diameter: {reason}")]
    DegenerateFit { reason: String },
}

impl ModelError {
    pub fn out_of_range(field: &'static str, value: f64, reason: &'static str) -> Self {
        ModelError::InputOutOfRange {
            field,
            value,
            reason,
        }
    }
}

impl From<FitError> for ModelError {
    fn from(err: FitError) -> Self {
        ModelError::DegenerateFit {
            reason: err.to_string(),
        }
    }
}

impl From<XeError> for ModelError {
    fn from(err: XeError) -> Self {
        match err {
            XeError::NonFinite { what, value } => {
                ModelError::out_of_range(what, value, "must be finite")
            }
            XeError::OutOfRange { what, value, .. } => {
                ModelError::out_of_range(what, value, "outside allowed range")
            }
        }
    }
}

/// Failure to parse a setting from text (CLI flags, plan files).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
pub struct ParseSettingError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
