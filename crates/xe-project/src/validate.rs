//! Plan validation.
//!
//! Only checks what a plan can know on its own. Whether the phases exist in
//! the attenuation table is decided once the dataset is loaded.

use crate::schema::{LATEST_VERSION, ScanPlan};
use xe_model::{MAX_DIAMETER_MM, MAX_ENERGY_KV, MAX_PHASES, MAX_SCAN_COUNT, MIN_DIAMETER_MM};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn in_range(v: f64, min: f64, max: f64) -> bool {
    v.is_finite() && v >= min && v <= max
}

pub fn validate_plan(plan: &ScanPlan) -> Result<(), ValidationError> {
    if plan.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: plan.version,
        });
    }

    if plan.name.trim().is_empty() {
        return Err(invalid("name", &plan.name, "must not be empty"));
    }

    let d = plan.sample.diameter_mm;
    if !in_range(d, MIN_DIAMETER_MM, MAX_DIAMETER_MM) {
        return Err(invalid("sample.diameter_mm", d, "must be between 1 and 150 mm"));
    }

    if plan.phases.is_empty() || plan.phases.len() > MAX_PHASES {
        return Err(invalid(
            "phases",
            plan.phases.len(),
            "must list between 1 and 4 phases",
        ));
    }
    for (i, p) in plan.phases.iter().enumerate() {
        if p.phase.trim().is_empty() {
            return Err(invalid(format!("phases[{i}].phase"), &p.phase, "must not be empty"));
        }
        if !in_range(p.fraction, 0.0, 1.0) {
            return Err(invalid(
                format!("phases[{i}].fraction"),
                p.fraction,
                "must be between 0 and 1",
            ));
        }
    }

    let e = plan.spectrum.max_energy_kv;
    if !in_range(e, 0.0, MAX_ENERGY_KV) {
        return Err(invalid("spectrum.max_energy_kv", e, "must be between 0 and 180 kV"));
    }

    let n = plan.spectrum.scan_count;
    if !(1..=MAX_SCAN_COUNT).contains(&n) {
        return Err(invalid("spectrum.scan_count", n, "must be between 1 and 100"));
    }

    if let Some(dataset) = &plan.dataset {
        if dataset.path.as_os_str().is_empty() {
            return Err(invalid("dataset.path", "", "must not be empty"));
        }
        if let Some(filter) = &dataset.filter_phase {
            if filter.trim().is_empty() {
                return Err(invalid("dataset.filter_phase", filter, "must not be empty"));
            }
        }
    }

    Ok(())
}
