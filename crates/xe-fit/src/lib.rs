//! Nonlinear least-squares curve fitting.
//!
//! This crate provides a Levenberg-Marquardt fitter for scalar models
//! `y = f(x; p)` with a forward-difference Jacobian, plus the two rational
//! models used by the transmission engine. Every numerical failure is reported
//! as a [`FitError`]; nothing in here panics on bad data.

pub mod error;
pub mod jacobian;
pub mod levenberg;
pub mod model;
pub mod rational;

pub use error::{FitError, FitResult};
pub use levenberg::{FitConfig, Termination, curve_fit};
pub use model::{FitSummary, FittedCurve, ParametricModel};
pub use rational::{AttenuationVsEnergy, EnergyVsTransmission};
