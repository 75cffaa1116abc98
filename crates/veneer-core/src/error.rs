//! Error types for the core crate.

use thiserror::Error;

use crate::animation::VariableId;

/// Errors raised by an animation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The variable does not exist (never created, or already released).
    #[error("unknown animation variable {0:?}")]
    UnknownVariable(VariableId),

    /// Variable bounds are inverted or not finite.
    #[error("invalid variable bounds [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },

    /// A transition parameter is out of range.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The engine refused the request (backend-specific failure).
    #[error("animation engine failure: {0}")]
    Engine(String),
}

/// Result type for animation operations.
pub type AnimationResult<T> = Result<T, AnimationError>;
