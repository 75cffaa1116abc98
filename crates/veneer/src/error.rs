//! Error types for the widget crate.

use thiserror::Error;
use veneer_core::{AnimationError, WindowHandle};
use veneer_render::{DeviceLoss, RenderError};

/// Errors reported by a [`WindowHost`](crate::WindowHost).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The handle does not name a live window.
    #[error("no such window: {0}")]
    InvalidWindow(WindowHandle),

    /// The window does not support the requested query or command.
    #[error("window {window} does not support {operation}")]
    Unsupported {
        window: WindowHandle,
        operation: &'static str,
    },

    /// The native call failed.
    #[error("{operation} failed: {reason}")]
    Failed {
        operation: &'static str,
        reason: String,
    },
}

/// Result type for window host calls.
pub type HostResult<T> = Result<T, HostError>;

/// Errors reported by the subclass system and its widgets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// `initialize` was called on an initialized system.
    #[error("the subclass system is already initialized")]
    AlreadyInitialized,

    /// The system has not been initialized, or was torn down.
    #[error("the subclass system is not initialized")]
    NotInitialized,

    /// Teardown was requested while widgets are still alive.
    #[error("{0} widget instance(s) still alive")]
    InstancesAlive(usize),

    /// A window handle was null or does not name a live window.
    #[error("invalid window handle {0}")]
    InvalidWindow(WindowHandle),

    /// `set_window` was called on a widget that already has a window.
    #[error("widget is already associated with window {0}")]
    AlreadyAssociated(WindowHandle),

    /// The operation needs a window but the widget has none yet.
    #[error("widget is not associated with a window")]
    NotAssociated,

    /// The widget is being dropped.
    #[error("widget is being dropped")]
    Expired,

    /// The configuration passed to `set_window` is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The window is not of the native class the widget wraps.
    #[error("window {window} has class {found:?}, expected {expected}")]
    WrongWindowClass {
        window: WindowHandle,
        expected: &'static str,
        found: crate::host::WindowClass,
    },

    /// A radio group already has a member with this control ID.
    #[error("radio group already has a member with id {0}")]
    DuplicateId(i32),

    /// A radio group has no member with this control ID.
    #[error("radio group has no member with id {0}")]
    UnknownId(i32),

    /// A radio button was activated before joining a group.
    #[error("radio button {0} does not belong to a radio group")]
    NotInGroup(i32),

    /// The window is not subclassed by a radio button.
    #[error("window {0} is not a subclassed radio button")]
    NotRadioButton(WindowHandle),

    /// A radio button can belong to one group only.
    #[error("radio button {0} already belongs to a radio group")]
    AlreadyGrouped(i32),

    /// An animation engine call failed.
    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),

    /// A drawing call failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A window host call failed.
    #[error("window host error: {0}")]
    Host(#[from] HostError),
}

impl DeviceLoss for WidgetError {
    fn is_device_loss(&self) -> bool {
        matches!(self, WidgetError::Render(RenderError::RecreateTarget))
    }
}

/// Result type for widget operations.
pub type WidgetResult<T> = Result<T, WidgetError>;
