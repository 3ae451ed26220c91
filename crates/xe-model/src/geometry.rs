//! Voxel size and reconstructed data size from sample diameter.
//!
//! One calibrated linear relation per (binning, detector width):
//! `voxel = trunc(a * diameter + b)`. The data size only depends on the
//! configuration, not on the diameter.

use crate::error::{ModelError, ModelResult};
use crate::settings::{Binning, DetectorWidth, config_index};
use serde::{Deserialize, Serialize};
use xe_core::numeric::ensure_finite;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanGeometryInput {
    pub diameter_mm: f64,
    pub binning: Binning,
    pub detector: DetectorWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryResult {
    pub voxel_size_um: i64,
    pub data_size_gb: f64,
}

#[derive(Debug, Clone, Copy)]
struct GeometryCalibration {
    slope: f64,
    intercept: f64,
    data_size_gb: f64,
}

const fn cal(slope: f64, intercept: f64, data_size_gb: f64) -> GeometryCalibration {
    GeometryCalibration {
        slope,
        intercept,
        data_size_gb,
    }
}

/// Indexed by `config_index(binning, detector)`.
const GEOMETRY_CALIBRATION: [GeometryCalibration; 6] = [
    cal(0.5627, -0.5293, 11.0), // 1x, 1920
    cal(0.3626, 0.0151, 32.0),  // 1x, 2856
    cal(1.1254, -1.0585, 1.4),  // 2x, 1920
    cal(0.7236, 0.4404, 4.3),   // 2x, 2856
    cal(1.6881, -1.5878, 0.4),  // 3x, 1920
    cal(1.1254, -1.0585, 1.2),  // 3x, 2856
];

/// Reference (diameter mm, voxel µm) points for 1x binning on the 1920 px detector.
const REFERENCE_POINTS: [(f64, f64); 3] = [(12.0, 6.0), (40.0, 22.0), (150.0, 83.0)];

/// Voxel size (µm, truncated toward zero) and data size (Gb).
///
/// The relations are calibrated for diameters of roughly 12-150 mm. Below that
/// range the voxel size loses meaning and can reach zero or go negative
/// (3x/1920 gives -1 µm at 0 mm); the value is returned as computed.
/// Negative or non-finite diameters are rejected.
pub fn compute_voxel_size_and_data_size(input: &ScanGeometryInput) -> ModelResult<GeometryResult> {
    let d = ensure_finite(input.diameter_mm, "diameter_mm")?;
    if d < 0.0 {
        return Err(ModelError::out_of_range("diameter_mm", d, "must not be negative"));
    }

    let c = GEOMETRY_CALIBRATION[config_index(input.binning, input.detector)];
    Ok(GeometryResult {
        voxel_size_um: (c.slope * d + c.intercept).trunc() as i64,
        data_size_gb: c.data_size_gb,
    })
}

/// Calibration points behind the relation for one configuration, for charting.
///
/// Voxel sizes scale with the binning factor and by 2/3 on the 2856 px detector.
pub fn calibration_points(binning: Binning, detector: DetectorWidth) -> Vec<(f64, f64)> {
    let detector_scale = match detector {
        DetectorWidth::Px1920 => 1.0,
        DetectorWidth::Px2856 => 2.0 / 3.0,
    };
    let scale = binning.factor() as f64 * detector_scale;
    REFERENCE_POINTS
        .iter()
        .map(|&(diameter, voxel)| (diameter, voxel * scale))
        .collect()
}
