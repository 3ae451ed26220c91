//! The two rational models used by the transmission engine.
//!
//! Both take seven parameters named `a..g` and stored in that order. The two
//! forms use the letters in different roles; they are independent models.

use crate::model::ParametricModel;

/// Energy (kV) as a function of sample transmission (%):
///
/// ```text
/// E(T) = (a + bT + cT² + dT³ + gT⁴) / (eT + fT² + 1)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyVsTransmission;

impl ParametricModel for EnergyVsTransmission {
    fn name(&self) -> &'static str {
        "energy_vs_transmission"
    }

    fn n_params(&self) -> usize {
        7
    }

    fn eval(&self, x: f64, p: &[f64]) -> f64 {
        let [a, b, c, d, e, f, g] = [p[0], p[1], p[2], p[3], p[4], p[5], p[6]];
        let x2 = x * x;
        let x3 = x2 * x;
        let x4 = x3 * x;
        (a + b * x + c * x2 + d * x3 + g * x4) / (e * x + f * x2 + 1.0)
    }
}

/// Filter attenuation (cm⁻¹) as a function of energy (kV):
///
/// ```text
/// µ(E) = b + fE + gE² / (b + cE + aE² + dE³ + eE⁵)
/// ```
///
/// Only the `gE²` term is divided.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttenuationVsEnergy;

impl ParametricModel for AttenuationVsEnergy {
    fn name(&self) -> &'static str {
        "attenuation_vs_energy"
    }

    fn n_params(&self) -> usize {
        7
    }

    fn eval(&self, x: f64, p: &[f64]) -> f64 {
        let [a, b, c, d, e, f, g] = [p[0], p[1], p[2], p[3], p[4], p[5], p[6]];
        let x2 = x * x;
        let x3 = x2 * x;
        let x5 = x3 * x2;
        b + f * x + g * x2 / (b + c * x + a * x2 + d * x3 + e * x5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levenberg::{FitConfig, curve_fit};

    const ONES: [f64; 7] = [1.0; 7];

    #[test]
    fn energy_form_at_unit_parameters() {
        // (1 + 2 + 4 + 8 + 16) / (2 + 4 + 1)
        let v = EnergyVsTransmission.eval(2.0, &ONES);
        assert!((v - 31.0 / 7.0).abs() < 1e-12);
        // T = 0 leaves the constant term
        assert_eq!(EnergyVsTransmission.eval(0.0, &[3.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0]), 3.0);
    }

    #[test]
    fn attenuation_form_divides_only_quadratic_term() {
        // b + f*x + g*x^2 / (b + c*x + a*x^2 + d*x^3 + e*x^5) at x = 1
        let p = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let expected = 2.0 + 6.0 + 7.0 / (2.0 + 3.0 + 1.0 + 4.0 + 5.0);
        assert!((AttenuationVsEnergy.eval(1.0, &p) - expected).abs() < 1e-12);
    }

    #[test]
    fn parameter_roles_differ() {
        let p = [0.5, 1.5, 2.0, 0.1, 0.01, 0.3, 4.0];
        assert_ne!(
            EnergyVsTransmission.eval(3.0, &p),
            AttenuationVsEnergy.eval(3.0, &p)
        );
    }

    #[test]
    fn recovers_energy_curve_generated_by_the_model() {
        let truth = [1.2, 0.9, 1.1, 1.0, 1.0, 0.8, 1.0];
        let xs = [0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 90.0];
        let ys: Vec<f64> = xs.iter().map(|&x| EnergyVsTransmission.eval(x, &truth)).collect();

        let config = FitConfig {
            max_iterations: 2000,
            ..FitConfig::default()
        };
        let fit = curve_fit(EnergyVsTransmission, &xs, &ys, &ONES, &config).unwrap();

        for (&x, &y) in xs.iter().zip(&ys) {
            let rel = (fit.evaluate(x) - y).abs() / y.abs().max(1.0);
            assert!(rel < 1e-3, "poor fit at x={x}: {} vs {y}", fit.evaluate(x));
        }
    }
}
