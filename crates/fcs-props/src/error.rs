//! Property store errors.

use thiserror::Error;

/// Result type for property store operations.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Errors raised by the property store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    /// Name does not resolve to a node.
    #[error("Property not found: {name}")]
    NotFound { name: String },

    /// Name is empty or malformed after normalization.
    #[error("Invalid property name: '{name}'")]
    InvalidName { name: String },

    /// A second tie was attempted on an already tied node.
    #[error("Property already tied: {name}")]
    AlreadyTied { name: String },
}
