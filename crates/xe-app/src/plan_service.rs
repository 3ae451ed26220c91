//! Plan loading and dataset resolution.

use std::path::{Path, PathBuf};

use tracing::info;
use xe_data::{AttenuationDataset, DEFAULT_FILTER_PHASE, load_dataset, reference_dataset};
use xe_model::PhaseFraction;
use xe_project::ScanPlan;

use crate::advisor::AdvisoryInputs;
use crate::error::{AppError, AppResult};

/// Where the attenuation table came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    Reference,
    File(PathBuf),
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Reference => f.write_str("built-in reference table"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn load_plan(path: &Path) -> AppResult<ScanPlan> {
    let plan = xe_project::load_plan(path)?;
    info!(name = %plan.name, path = %path.display(), "plan loaded");
    Ok(plan)
}

pub fn save_plan(path: &Path, plan: &ScanPlan) -> AppResult<()> {
    xe_project::save_plan(path, plan)?;
    Ok(())
}

/// Load the attenuation table a plan asks for.
///
/// An explicit `override_path` wins, then the plan's own dataset (relative to
/// the plan file's directory), then the built-in reference table.
pub fn resolve_dataset(
    plan: &ScanPlan,
    plan_path: Option<&Path>,
    override_path: Option<&Path>,
) -> AppResult<(AttenuationDataset, DatasetSource)> {
    let filter_phase = plan
        .dataset
        .as_ref()
        .and_then(|d| d.filter_phase.as_deref())
        .unwrap_or(DEFAULT_FILTER_PHASE);

    let path = match (override_path, &plan.dataset) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(dataset)) if dataset.path.is_relative() => Some(
            plan_path
                .and_then(Path::parent)
                .map(|dir| dir.join(&dataset.path))
                .unwrap_or_else(|| dataset.path.clone()),
        ),
        (None, Some(dataset)) => Some(dataset.path.clone()),
        (None, None) => None,
    };

    match path {
        Some(path) => {
            let dataset = load_dataset(&path, filter_phase)?;
            info!(path = %path.display(), phases = dataset.phase_names().len(), "dataset loaded");
            Ok((dataset, DatasetSource::File(path)))
        }
        None => Ok((reference_dataset()?, DatasetSource::Reference)),
    }
}

pub fn inputs_from_plan(plan: &ScanPlan) -> AdvisoryInputs {
    AdvisoryInputs {
        diameter_mm: plan.sample.diameter_mm,
        purpose: plan.sample.purpose,
        binning: plan.acquisition.binning,
        detector: plan.acquisition.detector,
        phases: plan
            .phases
            .iter()
            .map(|p| PhaseFraction::new(p.phase.clone(), p.fraction))
            .collect(),
        filter: plan.spectrum.filter,
        max_energy_kv: plan.spectrum.max_energy_kv,
        scan_count: plan.spectrum.scan_count,
    }
}

impl Default for AdvisoryInputs {
    fn default() -> Self {
        inputs_from_plan(&ScanPlan::default())
    }
}

/// Every plan phase must be a column of the dataset.
pub fn check_plan_phases(plan: &ScanPlan, dataset: &AttenuationDataset) -> AppResult<()> {
    match plan.phases.iter().find(|p| !dataset.contains_phase(&p.phase)) {
        Some(p) => Err(AppError::UnknownPhase(p.phase.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xe_project::DatasetRef;

    #[test]
    fn default_plan_uses_reference_table() {
        let (ds, source) = resolve_dataset(&ScanPlan::default(), None, None).unwrap();
        assert_eq!(source, DatasetSource::Reference);
        assert!(ds.contains_phase("Calcite"));
        assert_eq!(source.to_string(), "built-in reference table");
    }

    #[test]
    fn relative_dataset_resolves_next_to_plan() {
        let dir = std::env::temp_dir().join("xe_app_relative_dataset");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("table.csv"),
            "Energy (kV),Rock,Fe\n10,5,100\n20,2,40\n",
        )
        .unwrap();

        let mut plan = ScanPlan::default();
        plan.dataset = Some(DatasetRef {
            path: "table.csv".into(),
            filter_phase: None,
        });
        let (ds, source) = resolve_dataset(&plan, Some(&dir.join("plan.yaml")), None).unwrap();
        assert_eq!(source, DatasetSource::File(dir.join("table.csv")));
        assert_eq!(ds.phase_names(), vec!["Rock", "Fe"]);

        // default phases are Air and Water, which this table lacks
        assert!(matches!(
            check_plan_phases(&plan, &ds),
            Err(AppError::UnknownPhase(p)) if p == "Air"
        ));
    }

    #[test]
    fn plan_converts_to_inputs() {
        let inputs = AdvisoryInputs::default();
        assert_eq!(inputs.diameter_mm, 20.0);
        assert_eq!(inputs.phases.len(), 4);
        assert_eq!(inputs.phases[1].phase, "Water");
        assert_eq!(inputs.scan_count, 1);
    }
}
