//! Error types for curve fitting.

use thiserror::Error;

/// Errors that can occur while fitting a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Too few points: {points} points for {params} parameters")]
    TooFewPoints { points: usize, params: usize },

    #[error("Length mismatch: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("Initial guess has {got} parameters, model expects {expected}")]
    ParameterCount { got: usize, expected: usize },

    #[error("Non-finite value in {what}")]
    NonFinite { what: &'static str },
}

pub type FitResult<T> = Result<T, FitError>;
