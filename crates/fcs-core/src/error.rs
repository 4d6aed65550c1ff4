use thiserror::Error;

pub type FcsResult<T> = Result<T, FcsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FcsError {
    #[error("non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Unknown unit '{unit}' for {what}")]
    UnknownUnit { what: &'static str, unit: String },
}
