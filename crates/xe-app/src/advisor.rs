//! Advisory orchestrator.
//!
//! Every input change produces a fresh [`DerivedState`] computed from scratch.
//! Snapshots are immutable and shared through `Arc`, so readers never see a
//! half-updated state.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xe_data::AttenuationDataset;
use xe_model::{
    Binning, Composition, DetectorWidth, FilterPolicy, GeometryResult, MAX_DIAMETER_MM,
    MAX_ENERGY_KV, MAX_SCAN_COUNT, MIN_DIAMETER_MM, ModelError, PhaseFraction,
    ScanGeometryInput, StudyPurpose, TimingInput, TimingResult, TransmissionResult,
    compute_minimum_feature, compute_timing, compute_transmission,
    compute_voxel_size_and_data_size,
};

use crate::error::{AppError, AppResult};

/// Complete set of user inputs for one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryInputs {
    pub diameter_mm: f64,
    pub purpose: StudyPurpose,
    pub binning: Binning,
    pub detector: DetectorWidth,
    pub phases: Vec<PhaseFraction>,
    pub filter: FilterPolicy,
    pub max_energy_kv: f64,
    pub scan_count: u32,
}

impl AdvisoryInputs {
    /// Check every field and build the composition. Fails on the first bad field.
    pub fn validate(&self, dataset: &AttenuationDataset) -> AppResult<Composition> {
        let d = self.diameter_mm;
        if !d.is_finite() || !(MIN_DIAMETER_MM..=MAX_DIAMETER_MM).contains(&d) {
            return Err(AppError::invalid("diameter_mm", d, "must be between 1 and 150 mm"));
        }
        let e = self.max_energy_kv;
        if !e.is_finite() || !(0.0..=MAX_ENERGY_KV).contains(&e) {
            return Err(AppError::invalid("max_energy_kv", e, "must be between 0 and 180 kV"));
        }
        if !(1..=MAX_SCAN_COUNT).contains(&self.scan_count) {
            return Err(AppError::invalid(
                "scan_count",
                self.scan_count,
                "must be between 1 and 100",
            ));
        }

        let composition = Composition::new(self.phases.clone())?;
        if let Some(missing) = composition
            .slots()
            .iter()
            .find(|slot| !dataset.contains_phase(&slot.phase))
        {
            return Err(AppError::UnknownPhase(missing.phase.clone()));
        }
        Ok(composition)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    pub fraction_sum: f64,
    pub porosity_percent: i64,
    /// Fractions add up to more than 1. Advisory only.
    pub overflow: bool,
}

impl From<&Composition> for CompositionSummary {
    fn from(c: &Composition) -> Self {
        Self {
            fraction_sum: c.fraction_sum(),
            porosity_percent: c.porosity_percent(),
            overflow: c.is_overflowing(),
        }
    }
}

/// Spectrum-dependent outputs. Timing needs the filter thickness, so it is
/// only available together with the transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpectrumState {
    Estimated {
        transmission: TransmissionResult,
        timing: TimingResult,
        /// E(10 %) lies above the maximum tube energy.
        low_count_warning: bool,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub inputs: AdvisoryInputs,
    pub geometry: GeometryResult,
    pub minimum_feature_um: i64,
    pub composition: CompositionSummary,
    pub spectrum: SpectrumState,
}

impl DerivedState {
    pub fn transmission(&self) -> Option<&TransmissionResult> {
        match &self.spectrum {
            SpectrumState::Estimated { transmission, .. } => Some(transmission),
            SpectrumState::Unavailable { .. } => None,
        }
    }

    pub fn timing(&self) -> Option<&TimingResult> {
        match &self.spectrum {
            SpectrumState::Estimated { timing, .. } => Some(timing),
            SpectrumState::Unavailable { .. } => None,
        }
    }

    pub fn low_count_warning(&self) -> bool {
        matches!(
            self.spectrum,
            SpectrumState::Estimated {
                low_count_warning: true,
                ..
            }
        )
    }

    pub fn over_budget_warning(&self) -> bool {
        self.timing().is_some_and(|t| t.over_budget)
    }
}

/// One full recomputation pass.
pub fn derive_state(dataset: &AttenuationDataset, inputs: &AdvisoryInputs) -> AppResult<DerivedState> {
    let composition = inputs.validate(dataset)?;

    let geometry = compute_voxel_size_and_data_size(&ScanGeometryInput {
        diameter_mm: inputs.diameter_mm,
        binning: inputs.binning,
        detector: inputs.detector,
    })?;
    let minimum_feature_um = compute_minimum_feature(geometry.voxel_size_um, inputs.purpose);

    let summary = CompositionSummary::from(&composition);
    if summary.overflow {
        warn!(
            porosity_percent = summary.porosity_percent,
            "phase fractions add up to more than 100%"
        );
    }

    let spectrum = match compute_transmission(
        dataset,
        &composition,
        inputs.diameter_mm,
        inputs.filter,
    ) {
        Ok(transmission) => {
            let timing = compute_timing(&TimingInput {
                binning: inputs.binning,
                detector: inputs.detector,
                filter_thickness_mm: transmission.filter_thickness_mm,
                max_energy_kv: inputs.max_energy_kv,
                voxel_size_um: geometry.voxel_size_um,
                scan_count: inputs.scan_count,
            })?;
            if transmission.filter_fallback {
                warn!(
                    thickness_mm = transmission.filter_thickness_mm,
                    "fitted filter attenuation is non-physical, using the thickest filter"
                );
            }
            let low_count_warning = transmission.energy_at_10_percent_kv > inputs.max_energy_kv;
            if low_count_warning {
                warn!(
                    e10 = transmission.energy_at_10_percent_kv,
                    max_energy_kv = inputs.max_energy_kv,
                    "low count: sample needs more energy than the tube delivers"
                );
            }
            if timing.over_budget {
                warn!(
                    scan_hours = timing.scan_hours,
                    threshold = timing.over_budget_threshold_hours,
                    "scan is longer than usual for this configuration"
                );
            }
            SpectrumState::Estimated {
                transmission,
                timing,
                low_count_warning,
            }
        }
        Err(ModelError::DegenerateFit { reason }) => {
            warn!(%reason, "spectrum cannot be estimated");
            SpectrumState::Unavailable { reason }
        }
        Err(other) => return Err(other.into()),
    };

    Ok(DerivedState {
        inputs: inputs.clone(),
        geometry,
        minimum_feature_um,
        composition: summary,
        spectrum,
    })
}

/// Owns the dataset and the latest snapshot.
pub struct Advisor {
    dataset: Arc<AttenuationDataset>,
    current: RwLock<Arc<DerivedState>>,
}

impl Advisor {
    pub fn new(dataset: Arc<AttenuationDataset>, inputs: AdvisoryInputs) -> AppResult<Self> {
        let state = derive_state(&dataset, &inputs)?;
        info!(phases = dataset.phase_names().len(), "advisor ready");
        Ok(Self {
            dataset,
            current: RwLock::new(Arc::new(state)),
        })
    }

    pub fn dataset(&self) -> &AttenuationDataset {
        &self.dataset
    }

    /// Current snapshot. Cheap; clones the `Arc`.
    pub fn snapshot(&self) -> Arc<DerivedState> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Recompute for new inputs and publish the result.
    ///
    /// On error the previous snapshot stays current. Inputs equal to the
    /// current ones return the current snapshot as is.
    pub fn update(&self, inputs: AdvisoryInputs) -> AppResult<Arc<DerivedState>> {
        let current = self.snapshot();
        if current.inputs == inputs {
            debug!("inputs unchanged, keeping snapshot");
            return Ok(current);
        }

        let next = Arc::new(derive_state(&self.dataset, &inputs)?);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&next);
        Ok(next)
    }

    /// Edit a copy of the current inputs and [`update`](Self::update) with it.
    pub fn modify(&self, edit: impl FnOnce(&mut AdvisoryInputs)) -> AppResult<Arc<DerivedState>> {
        let mut inputs = self.snapshot().inputs.clone();
        edit(&mut inputs);
        self.update(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xe_data::reference_dataset;

    fn inputs() -> AdvisoryInputs {
        AdvisoryInputs {
            diameter_mm: 10.0,
            purpose: StudyPurpose::Classify,
            binning: Binning::X2,
            detector: DetectorWidth::Px1920,
            phases: vec![
                PhaseFraction::new("Water", 0.5),
                PhaseFraction::new("Quartz", 0.3),
            ],
            filter: FilterPolicy::Ideal,
            max_energy_kv: 160.0,
            scan_count: 2,
        }
    }

    fn field_of(err: AppError) -> String {
        match err {
            AppError::InvalidInput { field, .. } => field,
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn validate_rejects_each_field() {
        let ds = reference_dataset().unwrap();

        let mut i = inputs();
        i.diameter_mm = 0.0;
        assert_eq!(field_of(i.validate(&ds).unwrap_err()), "diameter_mm");

        let mut i = inputs();
        i.max_energy_kv = 181.0;
        assert_eq!(field_of(i.validate(&ds).unwrap_err()), "max_energy_kv");

        let mut i = inputs();
        i.scan_count = 101;
        assert_eq!(field_of(i.validate(&ds).unwrap_err()), "scan_count");

        let mut i = inputs();
        i.phases[1].fraction = 1.5;
        assert_eq!(field_of(i.validate(&ds).unwrap_err()), "volume fraction");

        let mut i = inputs();
        i.phases[0].phase = "Granite".into();
        assert!(matches!(i.validate(&ds), Err(AppError::UnknownPhase(p)) if p == "Granite"));
    }

    #[test]
    fn derived_state_flags() {
        let ds = reference_dataset().unwrap();
        let state = derive_state(&ds, &inputs()).unwrap();
        assert!(state.transmission().is_some());
        assert!(!state.low_count_warning());

        let dense = AdvisoryInputs {
            diameter_mm: 40.0,
            phases: vec![
                PhaseFraction::new("Calcite", 0.5),
                PhaseFraction::new("Quartz", 0.3),
                PhaseFraction::new("Fe", 0.05),
            ],
            max_energy_kv: 10.0,
            ..inputs()
        };
        let state = derive_state(&ds, &dense).unwrap();
        assert!(state.low_count_warning());
        assert!(state.timing().is_some());
    }
}
