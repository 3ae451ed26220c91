//! Attenuation dataset (energies x phases).

use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the energy column in spreadsheet exports.
pub const ENERGY_COLUMN: &str = "Energy (kV)";

/// Phase used as the pre-hardening filter material unless told otherwise.
pub const DEFAULT_FILTER_PHASE: &str = "Fe";

/// One phase column: linear attenuation coefficients (cm⁻¹), parallel to the
/// dataset energies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseColumn {
    pub name: String,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatasetDef {
    energies_kv: Vec<f64>,
    phases: Vec<PhaseColumn>,
    #[serde(default = "default_filter_phase")]
    filter_phase: String,
}

fn default_filter_phase() -> String {
    DEFAULT_FILTER_PHASE.to_string()
}

/// Immutable attenuation reference table.
///
/// Invariants (checked by [`AttenuationDataset::new`]):
/// - at least one energy, energies finite and strictly increasing
/// - every phase column has exactly one coefficient per energy
/// - coefficients are finite and non-negative
/// - phase names are non-empty and unique
/// - the filter phase is one of the columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetDef", into = "DatasetDef")]
pub struct AttenuationDataset {
    energies_kv: Vec<f64>,
    phases: Vec<PhaseColumn>,
    filter_phase: String,
}

impl AttenuationDataset {
    pub fn new(
        energies_kv: Vec<f64>,
        phases: Vec<PhaseColumn>,
        filter_phase: impl Into<String>,
    ) -> DataResult<Self> {
        let filter_phase = filter_phase.into();

        if energies_kv.is_empty() {
            return Err(DataError::Empty);
        }

        for (row, &e) in energies_kv.iter().enumerate() {
            if !e.is_finite() || e < 0.0 {
                return Err(DataError::InvalidEnergy {
                    row: row + 1,
                    value: e,
                    reason: "must be finite and non-negative",
                });
            }
            if row > 0 && e <= energies_kv[row - 1] {
                return Err(DataError::InvalidEnergy {
                    row: row + 1,
                    value: e,
                    reason: "energies must be strictly increasing",
                });
            }
        }

        let mut seen = HashSet::new();
        for column in &phases {
            if column.name.trim().is_empty() || column.name == ENERGY_COLUMN {
                return Err(DataError::InvalidPhaseName {
                    phase: column.name.clone(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DataError::DuplicatePhase {
                    phase: column.name.clone(),
                });
            }
            if column.coefficients.len() != energies_kv.len() {
                return Err(DataError::RaggedColumn {
                    phase: column.name.clone(),
                    len: column.coefficients.len(),
                    expected: energies_kv.len(),
                });
            }
            for (&mu, &e) in column.coefficients.iter().zip(&energies_kv) {
                if !mu.is_finite() || mu < 0.0 {
                    return Err(DataError::InvalidCoefficient {
                        phase: column.name.clone(),
                        energy_kv: e,
                        value: mu,
                    });
                }
            }
        }

        if !seen.contains(filter_phase.as_str()) {
            return Err(DataError::MissingColumn {
                column: filter_phase,
            });
        }

        Ok(Self {
            energies_kv,
            phases,
            filter_phase,
        })
    }

    /// Same table with a different column designated as the filter material.
    pub fn with_filter_phase(self, filter_phase: impl Into<String>) -> DataResult<Self> {
        Self::new(self.energies_kv, self.phases, filter_phase)
    }

    /// Number of energy rows.
    pub fn len(&self) -> usize {
        self.energies_kv.len()
    }

    /// Always false for a constructed dataset; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.energies_kv.is_empty()
    }

    pub fn energies_kv(&self) -> &[f64] {
        &self.energies_kv
    }

    pub fn filter_phase(&self) -> &str {
        &self.filter_phase
    }

    /// Coefficients of the filter material, parallel to `energies_kv`.
    pub fn filter_coefficients(&self) -> &[f64] {
        // Presence is checked in `new`.
        self.column(&self.filter_phase)
            .map(|c| c.coefficients.as_slice())
            .unwrap_or(&[])
    }

    /// Coefficients of a named phase, parallel to `energies_kv`.
    pub fn phase(&self, name: &str) -> DataResult<&[f64]> {
        self.column(name)
            .map(|c| c.coefficients.as_slice())
            .ok_or_else(|| DataError::UnknownPhase {
                phase: name.to_string(),
            })
    }

    pub fn contains_phase(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Phase names in column order (filter material included).
    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[PhaseColumn] {
        &self.phases
    }

    /// Case-insensitive substring search over phase names.
    ///
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_ascii_lowercase();
        self.phases
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| query.is_empty() || name.to_ascii_lowercase().contains(&query))
            .collect()
    }

    fn column(&self, name: &str) -> Option<&PhaseColumn> {
        self.phases.iter().find(|c| c.name == name)
    }
}

impl TryFrom<DatasetDef> for AttenuationDataset {
    type Error = DataError;

    fn try_from(def: DatasetDef) -> Result<Self, Self::Error> {
        Self::new(def.energies_kv, def.phases, def.filter_phase)
    }
}

impl From<AttenuationDataset> for DatasetDef {
    fn from(ds: AttenuationDataset) -> Self {
        Self {
            energies_kv: ds.energies_kv,
            phases: ds.phases,
            filter_phase: ds.filter_phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, coefficients: &[f64]) -> PhaseColumn {
        PhaseColumn {
            name: name.to_string(),
            coefficients: coefficients.to_vec(),
        }
    }

    fn small() -> AttenuationDataset {
        AttenuationDataset::new(
            vec![10.0, 20.0, 30.0],
            vec![
                column("Water", &[5.33, 0.81, 0.376]),
                column("Fe", &[1343.0, 202.2, 64.38]),
            ],
            "Fe",
        )
        .unwrap()
    }

    #[test]
    fn accessors() {
        let ds = small();
        assert_eq!(ds.len(), 3);
        assert!(!ds.is_empty());
        assert_eq!(ds.filter_phase(), "Fe");
        assert_eq!(ds.filter_coefficients(), &[1343.0, 202.2, 64.38]);
        assert_eq!(ds.phase("Water").unwrap(), &[5.33, 0.81, 0.376]);
        assert_eq!(ds.phase_names(), vec!["Water", "Fe"]);
        assert!(ds.contains_phase("Fe"));
        assert!(!ds.contains_phase("fe"));
    }

    #[test]
    fn unknown_phase() {
        let err = small().phase("Gold").unwrap_err();
        assert!(matches!(err, DataError::UnknownPhase { .. }));
    }

    #[test]
    fn search_is_case_insensitive() {
        let ds = small();
        assert_eq!(ds.search("wat"), vec!["Water"]);
        assert_eq!(ds.search("  FE "), vec!["Fe"]);
        assert_eq!(ds.search("").len(), 2);
        assert!(ds.search("gold").is_empty());
    }

    #[test]
    fn rejects_empty() {
        let err = AttenuationDataset::new(vec![], vec![column("Fe", &[])], "Fe").unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn rejects_ragged_column() {
        let err = AttenuationDataset::new(
            vec![10.0, 20.0],
            vec![column("Fe", &[1.0, 2.0]), column("Water", &[1.0])],
            "Fe",
        )
        .unwrap_err();
        assert!(matches!(err, DataError::RaggedColumn { len: 1, expected: 2, .. }));
    }

    #[test]
    fn rejects_unordered_energies() {
        let err =
            AttenuationDataset::new(vec![20.0, 10.0], vec![column("Fe", &[1.0, 2.0])], "Fe")
                .unwrap_err();
        assert!(matches!(err, DataError::InvalidEnergy { row: 2, .. }));
    }

    #[test]
    fn rejects_negative_coefficient() {
        let err = AttenuationDataset::new(
            vec![10.0, 20.0],
            vec![column("Fe", &[1.0, 2.0]), column("Water", &[1.0, -0.1])],
            "Fe",
        )
        .unwrap_err();
        assert!(matches!(err, DataError::InvalidCoefficient { .. }));
    }

    #[test]
    fn rejects_duplicate_phase() {
        let err = AttenuationDataset::new(
            vec![10.0],
            vec![column("Fe", &[1.0]), column("Fe", &[2.0])],
            "Fe",
        )
        .unwrap_err();
        assert!(matches!(err, DataError::DuplicatePhase { .. }));
    }

    #[test]
    fn requires_filter_column() {
        let err =
            AttenuationDataset::new(vec![10.0], vec![column("Water", &[1.0])], "Fe").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn switch_filter_phase() {
        let ds = small().with_filter_phase("Water").unwrap();
        assert_eq!(ds.filter_coefficients(), &[5.33, 0.81, 0.376]);
        assert!(small().with_filter_phase("Cu").is_err());
    }

    #[test]
    fn json_round_trip_revalidates() {
        let ds = small();
        let json = serde_json::to_string(&ds).unwrap();
        let back: AttenuationDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(ds, back);

        let bad = r#"{"energies_kv":[10.0],"phases":[{"name":"Water","coefficients":[1.0]}]}"#;
        assert!(serde_json::from_str::<AttenuationDataset>(bad).is_err());
    }
}
