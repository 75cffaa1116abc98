//! Veneer - owner-drawn, animated skins for native window controls.
//!
//! Veneer takes over the painting of existing native controls (push buttons,
//! radio buttons, edit boxes, drop-down lists, scrollbars and static labels)
//! by subclassing their windows, and animates their visual states through an
//! [`AnimationEngine`](veneer_core::AnimationEngine).
//!
//! The moving parts:
//!
//! - [`SubclassSystem`]: process-wide providers, the window registry and
//!   message dispatch. It must be initialized before any widget is created.
//! - [`WindowHost`]: the capability interface to the native windowing layer
//! - [`widgets`]: the concrete widgets, each bound to its windows with
//!   `set_window`
//! - [`ToolkitSettings`]: durations, retry caps and scroll tuning, loadable
//!   from TOML
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use veneer::{Providers, SubclassSystem, widgets::ButtonWidget};
//!
//! let system = SubclassSystem::new();
//! system.initialize(Providers::new(graphics, animation, theme, host, app_window))?;
//!
//! let button = ButtonWidget::new(&system)?;
//! button.lock().set_window(ok_button, Default::default())?;
//!
//! // From the native window procedure:
//! match system.dispatch(window, &message) {
//!     MessageResult::Handled(value) => value,
//!     MessageResult::Default => call_native_procedure(window, message),
//! }
//! ```

pub mod config;
mod error;
pub mod host;
pub mod message;
mod system;
pub mod widget;
pub mod widgets;

#[cfg(test)]
mod test_support;

pub use config::{
    AnimationDurations, AnimationSkip, ScrollSettings, SettingsError, SettingsResult,
    SubclassConfig, TextScaleLimits, ToolkitSettings,
};
pub use error::{HostError, HostResult, WidgetError, WidgetResult};
pub use host::{ComboInfo, ComboStyle, Notification, ScrollInfo, WindowClass, WindowHost};
pub use message::{Key, Message, MessageResult};
pub use system::{Providers, SubclassSystem};
pub use widget::{SubclassWidget, WidgetKind};

pub use veneer_core::WindowHandle;
