//! xe-data: the tabulated X-ray attenuation reference used by the explorer.
//!
//! Provides:
//! - `AttenuationDataset`: energies (kV) with one linear attenuation
//!   coefficient column (cm⁻¹) per phase, including the filter material
//! - loaders for CSV spreadsheets exports, JSON and YAML
//! - a built-in reference table for common sample phases
//!
//! # Example
//!
//! ```
//! use xe_data::reference::reference_dataset;
//!
//! let dataset = reference_dataset().unwrap();
//! let fe = dataset.filter_coefficients();
//! assert_eq!(fe.len(), dataset.len());
//! ```

pub mod dataset;
pub mod error;
pub mod load;
pub mod reference;

pub use dataset::{AttenuationDataset, DEFAULT_FILTER_PHASE, ENERGY_COLUMN, PhaseColumn};
pub use error::{DataError, DataResult};
pub use load::{from_csv_reader, load_csv, load_dataset, load_json, load_yaml};
pub use reference::reference_dataset;
