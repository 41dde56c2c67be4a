//! Error handling for the gesture pipeline
//!
//! One shared error type for all pipeline crates. Shape violations and
//! model-load failures are the only errors that cross component
//! boundaries; data gaps and feature degeneracy are repaired locally and
//! never surface here.

use core::fmt;

/// Result type alias for gesture pipeline operations
pub type GestureResult<T> = Result<T, GestureError>;

/// Error type for all gesture pipeline operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GestureError {
    /// Input to the conditioner or extractor is not a well-formed
    /// 2-D array (zero channels, ragged channels, empty segment, or a
    /// feature vector of the wrong length)
    InvalidShape {
        /// Description of the shape violation
        reason: String,
    },

    /// Pre-trained classifier state could not be loaded or is
    /// internally inconsistent. Fatal: the pipeline must not enter its
    /// polling loop without a usable classifier.
    ModelUnavailable {
        /// Description of the load failure
        reason: String,
    },

    /// Configuration rejected by validation
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// Upstream sample source failed to deliver a batch
    Source {
        /// Description of the source failure
        reason: String,
    },
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureError::InvalidShape { reason } => {
                write!(f, "Invalid input shape: {}", reason)
            }
            GestureError::ModelUnavailable { reason } => {
                write!(f, "Classifier model unavailable: {}", reason)
            }
            GestureError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
            GestureError::Source { reason } => {
                write!(f, "Sample source error: {}", reason)
            }
        }
    }
}

impl std::error::Error for GestureError {}

impl GestureError {
    /// Shorthand for shape errors built from formatted strings
    pub fn shape(reason: impl Into<String>) -> Self {
        GestureError::InvalidShape { reason: reason.into() }
    }

    /// Shorthand for model-load errors
    pub fn model(reason: impl Into<String>) -> Self {
        GestureError::ModelUnavailable { reason: reason.into() }
    }

    /// Shorthand for configuration errors
    pub fn config(reason: impl Into<String>) -> Self {
        GestureError::InvalidConfig { reason: reason.into() }
    }
}
