//! xe-model: the empirical models behind the XCT scan planner.
//!
//! Provides:
//! - acquisition settings (binning, detector width, study purpose, filter policy)
//! - geometry: voxel size and data size from sample diameter
//! - minimum resolvable feature for a study purpose
//! - composition: phase volume fractions and porosity
//! - transmission: Beer-Lambert spectra, curve fits and filter thickness
//! - timing: scan and experiment duration with an over-budget flag
//!
//! All models are pure functions of their inputs. The calibration constants
//! describe one scanner family and are not meant to drive hardware.

pub mod composition;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod limits;
pub mod settings;
pub mod timing;
pub mod transmission;

pub use composition::{Composition, MAX_PHASES, PhaseFraction};
pub use error::{ModelError, ModelResult, ParseSettingError};
pub use feature::compute_minimum_feature;
pub use geometry::{
    GeometryResult, ScanGeometryInput, calibration_points, compute_voxel_size_and_data_size,
};
pub use limits::{MAX_DIAMETER_MM, MAX_ENERGY_KV, MAX_SCAN_COUNT, MIN_DIAMETER_MM};
pub use settings::{Binning, DetectorWidth, FilterPolicy, StudyPurpose};
pub use timing::{TimingInput, TimingResult, compute_timing};
pub use transmission::{
    AttenuationSeries, FilterThickness, FitPoints, TransmissionPoint, TransmissionResult,
    attenuation_series, compute_transmission, filter_thickness, sample_transmission,
    select_fit_points,
};
