//! Application service layer for the XCT scan planner.
//!
//! Frontends go through this crate for plan handling, the advisory
//! recomputation and report export.

pub mod advisor;
pub mod error;
pub mod plan_service;
pub mod report;

pub use advisor::{
    AdvisoryInputs, Advisor, CompositionSummary, DerivedState, SpectrumState, derive_state,
};
pub use error::{AppError, AppResult};
pub use plan_service::{
    DatasetSource, check_plan_phases, inputs_from_plan, load_plan, resolve_dataset, save_plan,
};
pub use report::{
    AdvisoryReport, warnings, write_attenuation_csv, write_calibration_csv,
    write_transmission_csv,
};
