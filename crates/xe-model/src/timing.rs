//! Scan and experiment duration.
//!
//! `base = a·filter + b·max_energy + c·power + d` in hours, with coefficients
//! per binning, scaled by a detector multiplier and rounded to 0.1 h.

use crate::error::{ModelError, ModelResult};
use crate::limits::MAX_SCAN_COUNT;
use crate::settings::{Binning, DetectorWidth, config_index};
use serde::{Deserialize, Serialize};
use xe_core::numeric::{ensure_finite, round_to};
use xe_core::units::{Time, hours};

/// Voxel sizes below this (µm) time like this one.
pub const MIN_POWER_VOXEL_UM: i64 = 15;
/// Shortest scan the model reports (h).
pub const MIN_SCAN_HOURS: f64 = 0.1;
/// Warm-up overhead added to every scan (h).
pub const SCAN_OVERHEAD_HOURS: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
struct TimingCoefficients {
    filter: f64,
    energy: f64,
    power: f64,
    intercept: f64,
}

const fn coeffs(filter: f64, energy: f64, power: f64, intercept: f64) -> TimingCoefficients {
    TimingCoefficients {
        filter,
        energy,
        power,
        intercept,
    }
}

fn coefficients(binning: Binning) -> TimingCoefficients {
    match binning {
        Binning::X1 => coeffs(1.38, -0.0198, -0.0328, 6.048),
        Binning::X2 => coeffs(0.68, -0.0109, -0.0152, 2.607),
        Binning::X3 => coeffs(0.328, -0.0055, -0.0068, 1.19),
    }
}

fn detector_multiplier(detector: DetectorWidth) -> f64 {
    match detector {
        DetectorWidth::Px1920 => 1.0,
        DetectorWidth::Px2856 => 1.4875,
    }
}

/// Scan hours above which a configuration is flagged, indexed by `config_index`.
const OVER_BUDGET_HOURS: [f64; 6] = [
    4.2, // 1x, 1920
    6.2, // 1x, 2856
    2.2, // 2x, 1920
    3.2, // 2x, 2856
    1.5, // 3x, 1920
    2.2, // 3x, 2856
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingInput {
    pub binning: Binning,
    pub detector: DetectorWidth,
    pub filter_thickness_mm: f64,
    pub max_energy_kv: f64,
    pub voxel_size_um: i64,
    pub scan_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingResult {
    pub scan_hours: f64,
    pub experiment_hours: f64,
    /// Scan time above the configuration's typical maximum. Advisory only.
    pub over_budget: bool,
    pub over_budget_threshold_hours: f64,
}

impl TimingResult {
    pub fn scan_duration(&self) -> Time {
        hours(self.scan_hours)
    }

    pub fn experiment_duration(&self) -> Time {
        hours(self.experiment_hours)
    }
}

/// Scan and experiment hours for one configuration.
///
/// Hours are rounded to 0.1 h with [`round_to`], which breaks ties to even on
/// the binary value scaled by ten. A decimal tie such as 2.25 h is usually
/// not exact in binary, so the result can differ from decimal rounding in the
/// last place for those rare inputs.
pub fn compute_timing(input: &TimingInput) -> ModelResult<TimingResult> {
    if !(1..=MAX_SCAN_COUNT).contains(&input.scan_count) {
        return Err(ModelError::out_of_range(
            "scan_count",
            f64::from(input.scan_count),
            "must be between 1 and 100",
        ));
    }
    if !input.filter_thickness_mm.is_finite() || input.filter_thickness_mm < 0.0 {
        return Err(ModelError::out_of_range(
            "filter_thickness_mm",
            input.filter_thickness_mm,
            "must be finite and not negative",
        ));
    }
    ensure_finite(input.max_energy_kv, "max_energy_kv")?;

    let power = input.voxel_size_um.max(MIN_POWER_VOXEL_UM) as f64;
    let c = coefficients(input.binning);
    let base = c.filter * input.filter_thickness_mm
        + c.energy * input.max_energy_kv
        + c.power * power
        + c.intercept;

    let scan_hours = round_to(base * detector_multiplier(input.detector), 1).max(MIN_SCAN_HOURS);
    let experiment_hours = round_to(
        (scan_hours + SCAN_OVERHEAD_HOURS) * f64::from(input.scan_count),
        1,
    );
    let threshold = OVER_BUDGET_HOURS[config_index(input.binning, input.detector)];

    Ok(TimingResult {
        scan_hours,
        experiment_hours,
        over_budget: scan_hours > threshold,
        over_budget_threshold_hours: threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use xe_core::units::in_minutes;

    fn input(binning: Binning, detector: DetectorWidth) -> TimingInput {
        TimingInput {
            binning,
            detector,
            filter_thickness_mm: 3.0,
            max_energy_kv: 160.0,
            voxel_size_um: 21,
            scan_count: 1,
        }
    }

    #[test]
    fn two_x_1920_reference() {
        // 0.68*3 - 0.0109*160 - 0.0152*21 + 2.607 = 2.5838
        let t = compute_timing(&input(Binning::X2, DetectorWidth::Px1920)).unwrap();
        assert_eq!(t.scan_hours, 2.6);
        assert_eq!(t.experiment_hours, 2.8);
        assert!(t.over_budget);
        assert_eq!(t.over_budget_threshold_hours, 2.2);
        assert!((in_minutes(t.scan_duration()) - 156.0).abs() < 1e-9);
    }

    #[test]
    fn wide_detector_multiplier() {
        // 2.5838 * 1.4875 = 3.8434
        let t = compute_timing(&input(Binning::X2, DetectorWidth::Px2856)).unwrap();
        assert_eq!(t.scan_hours, 3.8);
        assert!(t.over_budget);
    }

    #[test]
    fn power_floor() {
        let mut small = input(Binning::X1, DetectorWidth::Px1920);
        small.voxel_size_um = 3;
        let mut floor = small;
        floor.voxel_size_um = 15;
        assert_eq!(compute_timing(&small).unwrap(), compute_timing(&floor).unwrap());
    }

    #[test]
    fn scan_time_floor() {
        let t = compute_timing(&TimingInput {
            binning: Binning::X3,
            detector: DetectorWidth::Px1920,
            filter_thickness_mm: 0.0,
            max_energy_kv: 180.0,
            voxel_size_um: 200,
            scan_count: 4,
        })
        .unwrap();
        assert_eq!(t.scan_hours, 0.1);
        assert_eq!(t.experiment_hours, 1.2);
        assert!(!t.over_budget);
    }

    #[test]
    fn scan_count_bounds() {
        for count in [0, 101] {
            let mut i = input(Binning::X1, DetectorWidth::Px1920);
            i.scan_count = count;
            let err = compute_timing(&i).unwrap_err();
            assert!(matches!(err, ModelError::InputOutOfRange { field: "scan_count", .. }));
        }
    }

    #[test]
    fn rejects_bad_filter() {
        let mut i = input(Binning::X1, DetectorWidth::Px1920);
        i.filter_thickness_mm = f64::NAN;
        assert!(compute_timing(&i).is_err());
        i.filter_thickness_mm = -0.5;
        assert!(compute_timing(&i).is_err());
    }

    fn any_input() -> impl Strategy<Value = TimingInput> {
        (
            0usize..3,
            0usize..2,
            0.0_f64..3.0,
            0.0_f64..180.0,
            -5_i64..300,
            1u32..=100,
        )
            .prop_map(|(b, d, filter, energy, voxel, count)| TimingInput {
                binning: Binning::ALL[b],
                detector: DetectorWidth::ALL[d],
                filter_thickness_mm: filter,
                max_energy_kv: energy,
                voxel_size_um: voxel,
                scan_count: count,
            })
    }

    proptest! {
        #[test]
        fn scan_time_never_below_floor(i in any_input()) {
            let t = compute_timing(&i).unwrap();
            prop_assert!(t.scan_hours >= MIN_SCAN_HOURS);
        }

        #[test]
        fn experiment_is_rounded_overhead_times_count(i in any_input()) {
            let t = compute_timing(&i).unwrap();
            let exact = (t.scan_hours + SCAN_OVERHEAD_HOURS) * f64::from(i.scan_count);
            prop_assert!((t.experiment_hours - exact).abs() <= 0.05 + 1e-9);
            prop_assert!((t.experiment_hours * 10.0 - (t.experiment_hours * 10.0).round()).abs() < 1e-6);
        }
    }
}
