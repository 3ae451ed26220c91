//! Levenberg-Marquardt curve fitter.

use crate::error::{FitError, FitResult};
use crate::jacobian::finite_difference_jacobian;
use crate::model::{FittedCurve, ParametricModel};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

/// Fitter configuration.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Maximum accepted-step iterations
    pub max_iterations: usize,
    /// Stop when the relative cost reduction of a step falls below this
    pub ftol: f64,
    /// Stop when the step norm falls below `xtol * (|p| + xtol)`
    pub xtol: f64,
    /// Stop when the largest gradient component falls below this
    pub gtol: f64,
    /// Starting damping factor
    pub initial_lambda: f64,
    /// Damping above which no descent step is considered to exist
    pub max_lambda: f64,
    /// Relative finite-difference step for the Jacobian
    pub fd_epsilon: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
            initial_lambda: 1e-3,
            max_lambda: 1e16,
            fd_epsilon: 1e-8,
        }
    }
}

/// Why the fitter stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    CostTolerance,
    StepTolerance,
    GradientTolerance,
    /// No damping level produced a lower cost: numerically a local minimum.
    Stalled,
    /// Stalled before the first accepted step; the parameters are the start point.
    NoProgress,
    MaxIterations,
}

impl Termination {
    pub fn is_converged(self) -> bool {
        !matches!(self, Termination::NoProgress | Termination::MaxIterations)
    }
}

/// Fit `model` to `(xs, ys)` starting from `p0`.
///
/// Minimises half the residual sum of squares with Marquardt-scaled damping.
/// Running out of iterations is not an error: the best parameters found are
/// returned with [`Termination::MaxIterations`].
pub fn curve_fit<M: ParametricModel>(
    model: M,
    xs: &[f64],
    ys: &[f64],
    p0: &[f64],
    config: &FitConfig,
) -> FitResult<FittedCurve<M>> {
    let n = model.n_params();
    if xs.len() != ys.len() {
        return Err(FitError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if p0.len() != n {
        return Err(FitError::ParameterCount {
            got: p0.len(),
            expected: n,
        });
    }
    if xs.len() < n {
        return Err(FitError::TooFewPoints {
            points: xs.len(),
            params: n,
        });
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite { what: "fit data" });
    }

    let residual_fn = |p: &DVector<f64>| -> FitResult<DVector<f64>> {
        let r = DVector::from_iterator(
            xs.len(),
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| model.eval(x, p.as_slice()) - y),
        );
        if r.iter().all(|v| v.is_finite()) {
            Ok(r)
        } else {
            Err(FitError::NonFinite { what: "residuals" })
        }
    };

    let mut p = DVector::from_column_slice(p0);
    let mut r = residual_fn(&p)?;
    let mut cost = 0.5 * r.norm_squared();
    let mut lambda = config.initial_lambda;

    let mut termination = Termination::MaxIterations;
    let mut iterations = config.max_iterations;

    for iter in 0..config.max_iterations {
        let jac = finite_difference_jacobian(&p, &r, residual_fn, config.fd_epsilon)?;
        let jtj = jac.transpose() * &jac;
        let grad = jac.transpose() * &r;

        if grad.amax() < config.gtol {
            termination = Termination::GradientTolerance;
            iterations = iter;
            break;
        }

        let scale = DVector::from_iterator(n, jtj.diagonal().iter().map(|d| d.max(1e-12)));

        // Raise damping until a step lowers the cost.
        let mut accepted = None;
        while lambda < config.max_lambda {
            let lhs = &jtj + DMatrix::from_diagonal(&(&scale * lambda));
            if let Some(step) = lhs.lu().solve(&(-grad.clone())) {
                let trial = &p + &step;
                // A trial that produces NaN/inf is treated like an uphill step.
                if let Ok(r_trial) = residual_fn(&trial) {
                    let trial_cost = 0.5 * r_trial.norm_squared();
                    if trial_cost < cost {
                        accepted = Some((step, trial, r_trial, trial_cost));
                        break;
                    }
                }
            }
            lambda *= 10.0;
        }

        let Some((step, trial, r_trial, trial_cost)) = accepted else {
            termination = if iter == 0 {
                Termination::NoProgress
            } else {
                Termination::Stalled
            };
            iterations = iter;
            break;
        };

        let reduction = if cost > 0.0 {
            (cost - trial_cost) / cost
        } else {
            0.0
        };
        let small_step = step.norm() < config.xtol * (p.norm() + config.xtol);

        p = trial;
        r = r_trial;
        cost = trial_cost;
        lambda = (lambda / 10.0).max(1e-12);

        if reduction < config.ftol {
            termination = Termination::CostTolerance;
            iterations = iter + 1;
            break;
        }
        if small_step {
            termination = Termination::StepTolerance;
            iterations = iter + 1;
            break;
        }
    }

    if !cost.is_finite() || p.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite {
            what: "fitted parameters",
        });
    }

    if termination == Termination::MaxIterations {
        warn!(
            model = model.name(),
            iterations, cost, "curve fit hit the iteration limit"
        );
    } else if termination == Termination::NoProgress {
        warn!(model = model.name(), cost, "curve fit found no downhill step");
    } else {
        debug!(model = model.name(), iterations, cost, ?termination, "curve fit finished");
    }

    Ok(FittedCurve {
        model,
        params: p.as_slice().to_vec(),
        cost,
        iterations,
        termination,
    })
}
