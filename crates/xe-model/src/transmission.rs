//! Beer-Lambert transmission spectra and filter selection.
//!
//! Pipeline:
//! 1. per-phase transmission `exp(-µ·f·d)` multiplied into the sample spectrum (%)
//! 2. candidate points for fitting (see [`select_fit_points`])
//! 3. fit energy as a function of transmission, read off E(10 %) and E(1 %)
//! 4. fit filter attenuation as a function of energy, read off µ at both energies
//! 5. filter thickness from the policy
//! 6. filter and combined spectra over the full energy grid

use crate::composition::Composition;
use crate::error::{ModelError, ModelResult};
use crate::settings::FilterPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use xe_core::units::{in_cm, mm};
use xe_data::AttenuationDataset;
use xe_fit::{AttenuationVsEnergy, EnergyVsTransmission, FitConfig, FitSummary, curve_fit};

/// Points with index below [`ALWAYS_FIT_FROM_INDEX`] need more transmission (%) than this.
pub const MIN_FIT_TRANSMISSION_PERCENT: f64 = 0.001;
/// Energies at or above this (kV) never enter the fits.
pub const MAX_FIT_ENERGY_KV: f64 = 310.0;
/// Rows from this index on are always fitted (below the energy cap), which
/// keeps the fit from running out of points on dense samples.
pub const ALWAYS_FIT_FROM_INDEX: usize = 5;
/// Both rational models have seven parameters.
pub const MIN_FIT_POINTS: usize = 7;

/// Sample transmission (%) that sets the Ideal filter.
pub const IDEAL_TARGET_PERCENT: f64 = 10.0;
/// Sample transmission (%) that sets the Fast filter.
pub const FAST_TARGET_PERCENT: f64 = 1.0;
/// Upper bound on the Ideal filter thickness, and the thickness used when
/// the fitted filter attenuation is not physical.
pub const MAX_IDEAL_FILTER_MM: f64 = 3.0;

/// Fraction of the beam the Ideal filter lets through at E(10 %).
const IDEAL_FILTER_TRANSMISSION: f64 = 0.2;
/// Fraction of the beam the Fast filter lets through at E(1 %).
const FAST_FILTER_TRANSMISSION: f64 = 0.5;

const INITIAL_PARAMS: [f64; 7] = [1.0; 7];

/// One row of the transmission table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransmissionPoint {
    pub energy_kv: f64,
    pub sample_percent: f64,
    pub filter_percent: f64,
    pub combined_percent: f64,
}

/// Points fed to the two curve fits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitPoints {
    pub transmission_percent: Vec<f64>,
    pub energy_kv: Vec<f64>,
    pub filter_attenuation: Vec<f64>,
}

impl FitPoints {
    pub fn len(&self) -> usize {
        self.energy_kv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_kv.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionResult {
    /// Full energy grid of the dataset.
    pub points: Vec<TransmissionPoint>,
    pub filter_policy: FilterPolicy,
    pub filter_thickness_mm: f64,
    /// The thickness is the fallback for a non-physical fitted attenuation.
    pub filter_fallback: bool,
    pub energy_at_10_percent_kv: f64,
    pub energy_at_1_percent_kv: f64,
    /// Fitted filter attenuation (cm⁻¹) at `energy_at_10_percent_kv`.
    pub filter_attenuation_at_10_percent: f64,
    /// Fitted filter attenuation (cm⁻¹) at `energy_at_1_percent_kv`.
    pub filter_attenuation_at_1_percent: f64,
    pub fit_point_count: usize,
    pub energy_fit: FitSummary,
    pub attenuation_fit: FitSummary,
}

/// Attenuation curve of one phase, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttenuationSeries {
    pub phase: String,
    /// (energy kV, µ cm⁻¹)
    pub points: Vec<(f64, f64)>,
}

/// Sample transmission (%) per dataset energy.
pub fn sample_transmission(
    dataset: &AttenuationDataset,
    composition: &Composition,
    diameter_mm: f64,
) -> ModelResult<Vec<f64>> {
    if !diameter_mm.is_finite() || diameter_mm < 0.0 {
        return Err(ModelError::out_of_range(
            "diameter_mm",
            diameter_mm,
            "must be finite and not negative",
        ));
    }
    let path_cm = in_cm(mm(diameter_mm));

    let mut transmission = vec![1.0; dataset.len()];
    for slot in composition.slots() {
        let mu = dataset
            .phase(&slot.phase)
            .map_err(|_| ModelError::UnknownPhase {
                phase: slot.phase.clone(),
            })?;
        for (t, &m) in transmission.iter_mut().zip(mu) {
            *t *= (-m * slot.fraction * path_cm).exp();
        }
    }

    Ok(transmission.into_iter().map(|t| t * 100.0).collect())
}

/// Candidate points for the two fits.
///
/// Row `i` is kept when its energy is below [`MAX_FIT_ENERGY_KV`] and either
/// `i >= ALWAYS_FIT_FROM_INDEX` or its transmission exceeds
/// [`MIN_FIT_TRANSMISSION_PERCENT`]. The index boundary is a literal property
/// of the reference table layout.
pub fn select_fit_points(dataset: &AttenuationDataset, sample_percent: &[f64]) -> FitPoints {
    let mut points = FitPoints::default();
    let rows = dataset
        .energies_kv()
        .iter()
        .zip(sample_percent)
        .zip(dataset.filter_coefficients())
        .enumerate();

    for (i, ((&energy, &t), &mu)) in rows {
        if energy >= MAX_FIT_ENERGY_KV {
            continue;
        }
        if i >= ALWAYS_FIT_FROM_INDEX || t > MIN_FIT_TRANSMISSION_PERCENT {
            points.transmission_percent.push(t);
            points.energy_kv.push(energy);
            points.filter_attenuation.push(mu);
        }
    }
    points
}

/// Filter thickness picked for a policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThickness {
    pub thickness_mm: f64,
    /// The fitted filter attenuation at the target energy was not positive,
    /// so the thickness is [`MAX_IDEAL_FILTER_MM`] rather than a computed value.
    pub fallback: bool,
}

/// Filter thickness (mm) for a policy, given fitted filter attenuation (cm⁻¹)
/// at E(10 %) and E(1 %).
///
/// Thin or light samples put the target energy far past the tabulated range,
/// where the attenuation fit can turn negative. Such a sample needs the
/// hardest beam on offer, so the thickness falls back to
/// [`MAX_IDEAL_FILTER_MM`] for both Ideal and Fast.
pub fn filter_thickness(policy: FilterPolicy, mu_at_10: f64, mu_at_1: f64) -> FilterThickness {
    let mu = match policy {
        FilterPolicy::NoFilter => {
            return FilterThickness {
                thickness_mm: 0.0,
                fallback: false,
            };
        }
        FilterPolicy::Ideal => mu_at_10,
        FilterPolicy::Fast => mu_at_1,
    };
    if !(mu.is_finite() && mu > 0.0) {
        return FilterThickness {
            thickness_mm: MAX_IDEAL_FILTER_MM,
            fallback: true,
        };
    }

    let thickness_mm = match policy {
        FilterPolicy::Ideal => {
            (-IDEAL_FILTER_TRANSMISSION.ln() * 10.0 / mu).min(MAX_IDEAL_FILTER_MM)
        }
        _ => -FAST_FILTER_TRANSMISSION.ln() * 10.0 / mu,
    };
    FilterThickness {
        thickness_mm,
        fallback: false,
    }
}

/// Run the whole transmission pipeline.
///
/// A point set the fits cannot use (too few points, a fit or a target energy
/// that is not finite) comes back as [`ModelError::DegenerateFit`]; the caller
/// decides how to present an unavailable spectrum. A non-physical filter
/// attenuation is not an error, see [`filter_thickness`].
pub fn compute_transmission(
    dataset: &AttenuationDataset,
    composition: &Composition,
    diameter_mm: f64,
    policy: FilterPolicy,
) -> ModelResult<TransmissionResult> {
    let sample = sample_transmission(dataset, composition, diameter_mm)?;

    let fit_points = select_fit_points(dataset, &sample);
    if fit_points.len() < MIN_FIT_POINTS {
        return Err(ModelError::DegenerateFit {
            reason: format!(
                "only {} usable spectrum points, at least {} needed",
                fit_points.len(),
                MIN_FIT_POINTS
            ),
        });
    }

    let config = FitConfig::default();

    let energy_fit = curve_fit(
        EnergyVsTransmission,
        &fit_points.transmission_percent,
        &fit_points.energy_kv,
        &INITIAL_PARAMS,
        &config,
    )?;
    let e10 = energy_fit.evaluate_finite(IDEAL_TARGET_PERCENT, "energy at 10% transmission")?;
    let e1 = energy_fit.evaluate_finite(FAST_TARGET_PERCENT, "energy at 1% transmission")?;

    let attenuation_fit = curve_fit(
        AttenuationVsEnergy,
        &fit_points.energy_kv,
        &fit_points.filter_attenuation,
        &INITIAL_PARAMS,
        &config,
    )?;
    let mu10 = attenuation_fit.evaluate_finite(e10, "filter attenuation at 10% transmission")?;
    let mu1 = attenuation_fit.evaluate_finite(e1, "filter attenuation at 1% transmission")?;

    let filter = filter_thickness(policy, mu10, mu1);
    if filter.fallback {
        debug!(mu10, mu1, ?policy, "non-physical filter attenuation, using the thickest filter");
    }
    let thickness_mm = filter.thickness_mm;
    let thickness_cm = in_cm(mm(thickness_mm));

    let points = dataset
        .energies_kv()
        .iter()
        .zip(&sample)
        .zip(dataset.filter_coefficients())
        .map(|((&energy_kv, &sample_percent), &mu)| {
            let filter_percent = (-mu * thickness_cm).exp() * 100.0;
            TransmissionPoint {
                energy_kv,
                sample_percent,
                filter_percent,
                combined_percent: sample_percent * filter_percent / 100.0,
            }
        })
        .collect();

    debug!(
        fit_points = fit_points.len(),
        e10,
        e1,
        thickness_mm,
        ?policy,
        "transmission computed"
    );

    Ok(TransmissionResult {
        points,
        filter_policy: policy,
        filter_thickness_mm: thickness_mm,
        filter_fallback: filter.fallback,
        energy_at_10_percent_kv: e10,
        energy_at_1_percent_kv: e1,
        filter_attenuation_at_10_percent: mu10,
        filter_attenuation_at_1_percent: mu1,
        fit_point_count: fit_points.len(),
        energy_fit: energy_fit.summary(),
        attenuation_fit: attenuation_fit.summary(),
    })
}

/// Attenuation curves of the given phases over the dataset energies.
pub fn attenuation_series(
    dataset: &AttenuationDataset,
    phases: &[&str],
) -> ModelResult<Vec<AttenuationSeries>> {
    phases
        .iter()
        .map(|&name| {
            let mu = dataset.phase(name).map_err(|_| ModelError::UnknownPhase {
                phase: name.to_string(),
            })?;
            Ok(AttenuationSeries {
                phase: name.to_string(),
                points: dataset
                    .energies_kv()
                    .iter()
                    .copied()
                    .zip(mu.iter().copied())
                    .collect(),
            })
        })
        .collect()
}
