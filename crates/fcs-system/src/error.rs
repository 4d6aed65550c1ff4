//! Error types for the flight control system container.

use fcs_config::{ConfigError, ValidationError};
use fcs_controls::ControlError;
use fcs_props::PropertyError;

/// Errors raised while building or running a flight control system.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("Channel '{channel}' failed in frame {frame}: {source}")]
    Frame {
        channel: String,
        frame: u64,
        source: ControlError,
    },
}

/// Result type for fcs-system operations.
pub type SystemResult<T> = Result<T, SystemError>;
