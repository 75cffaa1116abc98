//! Error types for the render crate.

use thiserror::Error;
use veneer_core::WindowHandle;

/// Errors that can occur during drawing operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The device context was lost; the surface and every resource created
    /// from it must be rebuilt before drawing again.
    #[error("render target must be recreated")]
    RecreateTarget,

    /// Device loss persisted across every allowed paint attempt.
    #[error("device loss persisted after {attempts} paint attempts")]
    RecoveryExhausted { attempts: u32 },

    /// Invalid surface dimensions (negative or non-finite).
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    /// No window with this handle can be drawn to.
    #[error("cannot bind a surface to window {0}")]
    InvalidWindow(WindowHandle),

    /// `begin_draw` was called while a frame was already open.
    #[error("a frame is already being drawn")]
    AlreadyDrawing,

    /// `end_draw` was called without a matching `begin_draw`.
    #[error("no frame is being drawn")]
    NotDrawing,

    /// A brush, text format or bitmap could not be created.
    #[error("failed to create {kind}: {reason}")]
    ResourceCreation { kind: &'static str, reason: String },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
