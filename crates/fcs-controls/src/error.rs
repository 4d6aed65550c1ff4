//! Error types for flight control components.

use fcs_core::FcsError;
use fcs_props::PropertyError;
use thiserror::Error;

/// Result type for control component operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while building or running control components.
///
/// [`ControlError::InvertedClip`] and [`ControlError::NonFinite`] are raised
/// while running a frame. Everything else is a configuration error detected
/// at build time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A required configuration element is absent.
    #[error("Component '{component}': missing required element '{element}'")]
    MissingElement {
        component: String,
        element: &'static str,
    },

    /// A configuration element is present but unusable.
    #[error("Component '{component}': invalid '{element}': {what}")]
    InvalidElement {
        component: String,
        element: &'static str,
        what: String,
    },

    /// A condition expression could not be parsed.
    #[error("Component '{component}': malformed condition '{expression}'")]
    MalformedCondition {
        component: String,
        expression: String,
    },

    /// Clip bounds evaluated to `max < min` during a frame.
    #[error("Component '{component}': invalid clip range, max {max} is below min {min}")]
    InvertedClip {
        component: String,
        min: f64,
        max: f64,
    },

    /// A property binding could not be established.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// A NaN or infinite value reached an input, clip bound or output.
    #[error("Component '{component}': {source}")]
    NonFinite {
        component: String,
        #[source]
        source: FcsError,
    },
}

impl ControlError {
    pub(crate) fn missing(component: &str, element: &'static str) -> Self {
        Self::MissingElement {
            component: component.to_string(),
            element,
        }
    }

    pub(crate) fn non_finite(component: &str, source: FcsError) -> Self {
        Self::NonFinite {
            component: component.to_string(),
            source,
        }
    }

    pub(crate) fn invalid(component: &str, element: &'static str, what: impl Into<String>) -> Self {
        Self::InvalidElement {
            component: component.to_string(),
            element,
            what: what.into(),
        }
    }
}
