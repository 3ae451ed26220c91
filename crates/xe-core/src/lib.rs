//! xe-core: shared foundation for the XCT explorer crates.
//!
//! Contains:
//! - units (uom SI types + constructors for mm and hours)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{XeError, XeResult};
pub use numeric::*;
pub use units::*;
