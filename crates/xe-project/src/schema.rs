//! Scan plan file schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use xe_model::{Binning, DetectorWidth, FilterPolicy, StudyPurpose};

pub const LATEST_VERSION: u32 = 1;

/// Everything needed to reproduce one scan-planning session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanPlan {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetRef>,
    pub sample: SampleDef,
    pub acquisition: AcquisitionDef,
    #[serde(default)]
    pub phases: Vec<PhaseDef>,
    pub spectrum: SpectrumDef,
}

/// Attenuation table on disk. Relative paths resolve against the plan file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetRef {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_phase: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleDef {
    pub diameter_mm: f64,
    pub purpose: StudyPurpose,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcquisitionDef {
    pub binning: Binning,
    pub detector: DetectorWidth,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDef {
    pub phase: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumDef {
    pub filter: FilterPolicy,
    pub max_energy_kv: f64,
    #[serde(default = "default_scan_count")]
    pub scan_count: u32,
}

fn default_scan_count() -> u32 {
    1
}

impl Default for ScanPlan {
    /// The starting point of a fresh session: a 20 mm sample with no phases
    /// filled in yet.
    fn default() -> Self {
        let phase = |name: &str| PhaseDef {
            phase: name.to_string(),
            fraction: 0.0,
        };
        Self {
            version: LATEST_VERSION,
            name: "Untitled plan".to_string(),
            dataset: None,
            sample: SampleDef {
                diameter_mm: 20.0,
                purpose: StudyPurpose::Qualitative,
            },
            acquisition: AcquisitionDef {
                binning: Binning::X2,
                detector: DetectorWidth::Px1920,
            },
            phases: vec![phase("Air"), phase("Water"), phase("Air"), phase("Air")],
            spectrum: SpectrumDef {
                filter: FilterPolicy::Ideal,
                max_energy_kv: 160.0,
                scan_count: default_scan_count(),
            },
        }
    }
}
