//! xe-project: scan plan file format and validation.

pub mod schema;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use validate::{ValidationError, validate_plan};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported plan format: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<ScanPlan> {
    let content = std::fs::read_to_string(path)?;
    let plan: ScanPlan = serde_yaml::from_str(&content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn save_yaml(path: &Path, plan: &ScanPlan) -> ProjectResult<()> {
    validate_plan(plan)?;
    let content = serde_yaml::to_string(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<ScanPlan> {
    let content = std::fs::read_to_string(path)?;
    let plan: ScanPlan = serde_json::from_str(&content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn save_json(path: &Path, plan: &ScanPlan) -> ProjectResult<()> {
    validate_plan(plan)?;
    let content = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

enum PlanFormat {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> ProjectResult<PlanFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml" | "yml") => Ok(PlanFormat::Yaml),
        Some("json") => Ok(PlanFormat::Json),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a plan, picking the format from the file extension.
pub fn load_plan(path: &Path) -> ProjectResult<ScanPlan> {
    match format_of(path)? {
        PlanFormat::Yaml => load_yaml(path),
        PlanFormat::Json => load_json(path),
    }
}

/// Save a plan, picking the format from the file extension.
pub fn save_plan(path: &Path, plan: &ScanPlan) -> ProjectResult<()> {
    match format_of(path)? {
        PlanFormat::Yaml => save_yaml(path, plan),
        PlanFormat::Json => save_json(path, plan),
    }
}
