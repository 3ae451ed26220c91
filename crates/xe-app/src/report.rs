//! Reports and table exports.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xe_model::{
    AttenuationSeries, Binning, DetectorWidth, ScanGeometryInput, TransmissionResult,
    calibration_points, compute_voxel_size_and_data_size,
};

use crate::advisor::{DerivedState, SpectrumState};
use crate::error::{AppError, AppResult};

pub const TRANSMISSION_HEADER: [&str; 4] = ["Energy (kV)", "Sample", "Filter", "Filter+Sample"];
pub const CALIBRATION_HEADER: [&str; 3] = ["Diameter (mm)", "Measured (um)", "Model (um)"];

#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryReport {
    pub generated_at: DateTime<Utc>,
    pub plan: String,
    pub dataset: String,
    pub warnings: Vec<String>,
    pub state: DerivedState,
}

impl AdvisoryReport {
    pub fn new(plan: impl Into<String>, dataset: impl Into<String>, state: &DerivedState) -> Self {
        Self {
            generated_at: Utc::now(),
            plan: plan.into(),
            dataset: dataset.into(),
            warnings: warnings(state),
            state: state.clone(),
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Human-readable advisories for a snapshot.
pub fn warnings(state: &DerivedState) -> Vec<String> {
    let mut out = Vec::new();
    if state.composition.overflow {
        out.push(format!(
            "Phase fractions exceed 100% (porosity {}%)",
            state.composition.porosity_percent
        ));
    }
    match &state.spectrum {
        SpectrumState::Unavailable { reason } => {
            out.push(format!("Spectrum cannot be estimated: {reason}"));
        }
        SpectrumState::Estimated {
            transmission,
            timing,
            low_count_warning,
        } => {
            if transmission.filter_fallback {
                out.push(format!(
                    "Filter fit is outside the tabulated energies, using the thickest filter ({:.1} mm)",
                    transmission.filter_thickness_mm
                ));
            }
            if *low_count_warning {
                out.push(format!(
                    "Low count: 10% transmission needs {:.0} kV, above the {:.0} kV maximum",
                    transmission.energy_at_10_percent_kv, state.inputs.max_energy_kv
                ));
            }
            if timing.over_budget {
                out.push(format!(
                    "Scan time {:.1} h is above the usual {:.1} h for this configuration",
                    timing.scan_hours, timing.over_budget_threshold_hours
                ));
            }
        }
    }
    out
}

/// Transmission table, one row per dataset energy.
pub fn write_transmission_csv<W: Write>(writer: W, result: &TransmissionResult) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TRANSMISSION_HEADER)?;
    for p in &result.points {
        wtr.write_record(&[
            p.energy_kv.to_string(),
            p.sample_percent.to_string(),
            p.filter_percent.to_string(),
            p.combined_percent.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Attenuation table: energy column followed by one column per series.
///
/// All series must share the same energies.
pub fn write_attenuation_csv<W: Write>(writer: W, series: &[AttenuationSeries]) -> AppResult<()> {
    let Some(first) = series.first() else {
        return Err(AppError::Report("no phases to export".to_string()));
    };
    if series.iter().any(|s| s.points.len() != first.points.len()) {
        return Err(AppError::Report(
            "attenuation series have different lengths".to_string(),
        ));
    }

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Energy (kV)".to_string()];
    header.extend(series.iter().map(|s| s.phase.clone()));
    wtr.write_record(&header)?;

    for (row, &(energy, _)) in first.points.iter().enumerate() {
        let mut record = vec![energy.to_string()];
        record.extend(series.iter().map(|s| s.points[row].1.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Measured calibration points of one configuration next to the voxel size
/// the linear relation gives at the same diameters.
pub fn write_calibration_csv<W: Write>(
    writer: W,
    binning: Binning,
    detector: DetectorWidth,
) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CALIBRATION_HEADER)?;
    for (diameter_mm, measured_um) in calibration_points(binning, detector) {
        let model = compute_voxel_size_and_data_size(&ScanGeometryInput {
            diameter_mm,
            binning,
            detector,
        })?;
        wtr.write_record(&[
            diameter_mm.to_string(),
            measured_um.to_string(),
            model.voxel_size_um.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
