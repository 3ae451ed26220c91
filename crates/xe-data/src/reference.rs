//! Built-in reference attenuation table.
//!
//! Linear attenuation coefficients (cm⁻¹) for a handful of phases commonly met
//! in geological and materials samples, computed from tabulated mass
//! attenuation coefficients and nominal densities. Fe is the filter material.

use crate::dataset::{AttenuationDataset, DEFAULT_FILTER_PHASE};
use crate::error::DataResult;
use crate::load::from_csv_reader;

/// Raw CSV of the reference table.
pub const REFERENCE_CSV: &str = include_str!("../data/reference_attenuation.csv");

/// Parse the built-in reference table.
pub fn reference_dataset() -> DataResult<AttenuationDataset> {
    from_csv_reader(REFERENCE_CSV.as_bytes(), DEFAULT_FILTER_PHASE)
}
