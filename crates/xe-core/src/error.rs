use thiserror::Error;

pub type XeResult<T> = Result<T, XeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XeError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value out of range for {what}: {value} (allowed {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
