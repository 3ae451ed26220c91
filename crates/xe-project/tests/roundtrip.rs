use xe_model::{Binning, DetectorWidth, FilterPolicy, StudyPurpose};
use xe_project::schema::*;
use xe_project::{ProjectError, load_plan, load_yaml, save_plan, save_yaml, validate_plan};

fn carbonate_plan() -> ScanPlan {
    ScanPlan {
        version: LATEST_VERSION,
        name: "Carbonate core".to_string(),
        dataset: Some(DatasetRef {
            path: "tables/attenuation.csv".into(),
            filter_phase: Some("Fe".to_string()),
        }),
        sample: SampleDef {
            diameter_mm: 40.0,
            purpose: StudyPurpose::Classify,
        },
        acquisition: AcquisitionDef {
            binning: Binning::X1,
            detector: DetectorWidth::Px2856,
        },
        phases: vec![
            PhaseDef {
                phase: "Calcite".to_string(),
                fraction: 0.5,
            },
            PhaseDef {
                phase: "Quartz".to_string(),
                fraction: 0.3,
            },
        ],
        spectrum: SpectrumDef {
            filter: FilterPolicy::Fast,
            max_energy_kv: 180.0,
            scan_count: 3,
        },
    }
}

#[test]
fn roundtrip_yaml_default_plan() {
    let plan = ScanPlan::default();
    validate_plan(&plan).unwrap();

    let path = std::env::temp_dir().join("xe_project_roundtrip_default.yaml");
    save_yaml(&path, &plan).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(plan, loaded);
}

#[test]
fn roundtrip_by_extension() {
    let plan = carbonate_plan();
    for name in ["xe_project_roundtrip_carbonate.yml", "xe_project_roundtrip_carbonate.json"] {
        let path = std::env::temp_dir().join(name);
        save_plan(&path, &plan).unwrap();
        assert_eq!(load_plan(&path).unwrap(), plan);
    }
}

#[test]
fn settings_use_display_names() {
    let yaml = serde_yaml::to_string(&carbonate_plan()).unwrap();
    assert!(yaml.contains("binning: 1x"));
    assert!(yaml.contains("2856"));
    assert!(yaml.contains("filter: Fast"));
}

#[test]
fn hand_written_plan_loads() {
    let yaml = r#"
version: 1
name: Sandstone plug
sample:
  diameter_mm: 25
  purpose: Quantify
acquisition:
  binning: 2x
  detector: "1920"
phases:
  - { phase: Quartz, fraction: 0.7 }
  - { phase: Water, fraction: 0.1 }
spectrum:
  filter: No Filter
  max_energy_kv: 150
"#;
    let path = std::env::temp_dir().join("xe_project_hand_written.yaml");
    std::fs::write(&path, yaml).unwrap();
    let plan = load_yaml(&path).unwrap();

    assert_eq!(plan.sample.purpose, StudyPurpose::Quantify);
    assert_eq!(plan.spectrum.filter, FilterPolicy::NoFilter);
    assert_eq!(plan.spectrum.scan_count, 1);
    assert!(plan.dataset.is_none());
}

#[test]
fn invalid_plan_is_not_saved() {
    let mut plan = carbonate_plan();
    plan.phases[0].fraction = -0.1;
    let path = std::env::temp_dir().join("xe_project_invalid.yaml");
    let err = save_yaml(&path, &plan).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
}

#[test]
fn unknown_extension() {
    let path = std::env::temp_dir().join("xe_project_plan.toml");
    let err = load_plan(&path).unwrap_err();
    assert!(matches!(err, ProjectError::UnsupportedFormat { .. }));
}
