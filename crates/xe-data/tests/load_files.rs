use std::path::PathBuf;
use xe_data::{DataError, load_dataset, reference_dataset};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

#[test]
fn csv_file_round_trip_matches_reference() {
    let reference = reference_dataset().unwrap();
    let path = temp_path("xe_data_reference_copy.csv");
    std::fs::write(&path, xe_data::reference::REFERENCE_CSV).unwrap();

    let loaded = load_dataset(&path, "Fe").unwrap();
    assert_eq!(loaded, reference);
}

#[test]
fn json_and_yaml_files_load() {
    let reference = reference_dataset().unwrap();

    let json_path = temp_path("xe_data_reference.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&reference).unwrap()).unwrap();
    assert_eq!(load_dataset(&json_path, "Fe").unwrap(), reference);

    let yaml_path = temp_path("xe_data_reference.yaml");
    std::fs::write(&yaml_path, serde_yaml::to_string(&reference).unwrap()).unwrap();
    assert_eq!(load_dataset(&yaml_path, "Fe").unwrap(), reference);
}

#[test]
fn alternative_filter_column() {
    let path = temp_path("xe_data_filter_override.csv");
    std::fs::write(&path, xe_data::reference::REFERENCE_CSV).unwrap();

    let ds = load_dataset(&path, "Calcite").unwrap();
    assert_eq!(ds.filter_phase(), "Calcite");
    assert_eq!(ds.filter_coefficients()[0], 111.0);
}

#[test]
fn missing_file() {
    let err = load_dataset(&temp_path("xe_data_does_not_exist.csv"), "Fe").unwrap_err();
    assert!(matches!(err, DataError::FileRead { .. }));
}
