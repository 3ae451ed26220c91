//! Parametric model trait and fitted curves.

use crate::error::{FitError, FitResult};
use crate::levenberg::Termination;
use serde::{Deserialize, Serialize};

/// A scalar model `y = f(x; p)` with a fixed number of parameters.
pub trait ParametricModel {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    fn n_params(&self) -> usize;

    /// Evaluate the model. `params.len()` equals `n_params()`.
    fn eval(&self, x: f64, params: &[f64]) -> f64;
}

/// Model together with the parameters a fit produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve<M> {
    pub model: M,
    pub params: Vec<f64>,
    /// Half the residual sum of squares at `params`.
    pub cost: f64,
    pub iterations: usize,
    pub termination: Termination,
}

impl<M: ParametricModel> FittedCurve<M> {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.model.eval(x, &self.params)
    }

    /// Evaluate, rejecting NaN/inf.
    pub fn evaluate_finite(&self, x: f64, what: &'static str) -> FitResult<f64> {
        let y = self.evaluate(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(FitError::NonFinite { what })
        }
    }

    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }

    pub fn summary(&self) -> FitSummary {
        FitSummary {
            model: self.model.name().to_string(),
            params: self.params.clone(),
            cost: self.cost,
            iterations: self.iterations,
            converged: self.converged(),
        }
    }
}

/// Serializable snapshot of a fit, for diagnostics and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub model: String,
    pub params: Vec<f64>,
    pub cost: f64,
    pub iterations: usize,
    pub converged: bool,
}
