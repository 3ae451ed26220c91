//! Input ranges shared by plan validation and the advisor.

/// Smallest sample diameter accepted as input (mm).
pub const MIN_DIAMETER_MM: f64 = 1.0;
/// Largest sample diameter accepted as input (mm).
pub const MAX_DIAMETER_MM: f64 = 150.0;
/// Highest tube voltage the scanner delivers (kV).
pub const MAX_ENERGY_KV: f64 = 180.0;
pub const MAX_SCAN_COUNT: u32 = 100;
