//! Widget subclassing foundation.
//!
//! This module provides what every owner-drawn widget is built from:
//!
//! - [`SubclassWidget`] trait: the message handler the subclass system
//!   dispatches to
//! - [`WidgetBase`]: the lifecycle gate (instance counting, one-time window
//!   association, subclass registration)
//! - [`Animator`]: the generic visual state machine, parameterized by a
//!   widget's [`VisualState`] enumeration
//! - [`drive`]: hover/press/focus input handling shared by interactive
//!   widgets through the [`Interactive`] trait
//!
//! # Creating a Widget
//!
//! 1. Define a struct with a `WidgetBase` field and an `Animator<YourState>`
//! 2. Build it with `Arc::new_cyclic` so it can register itself
//! 3. Implement `SubclassWidget`, routing input through [`drive`]
//!
//! ```ignore
//! impl SubclassWidget for MyButton {
//!     fn kind(&self) -> WidgetKind { WidgetKind::Button }
//!     fn base(&self) -> &WidgetBase { &self.base }
//!
//!     fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
//!         match message {
//!             Message::Paint => { self.paint(); MessageResult::Handled(0) }
//!             _ => match drive(self, host, message) {
//!                 Some(Err(err)) => { tracing::warn!(error = %err, "input failed"); MessageResult::Handled(0) }
//!                 Some(Ok(())) => MessageResult::Handled(0),
//!                 None => MessageResult::Default,
//!             },
//!         }
//!     }
//!
//!     fn refresh(&mut self) -> WidgetResult<()> { /* rebuild and replay */ }
//! }
//! ```

mod animator;
pub(crate) mod base;
pub mod interaction;
pub mod timer;

use std::fmt;

use veneer_core::WindowHandle;

use crate::error::WidgetResult;
use crate::message::{Message, MessageResult};

pub use animator::{AnimatedColor, Animator, Phase, StateTarget, VisualState};
pub use base::{SurfaceSlot, WidgetBase};
pub use interaction::{Interactive, PointerState, StateMap, drive};

/// The widget types this crate provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Button,
    ImageButton,
    RadioButton,
    Editbox,
    Dropdown,
    Scrollbar,
    StaticText,
}

impl WidgetKind {
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Button => "button",
            WidgetKind::ImageButton => "image button",
            WidgetKind::RadioButton => "radio button",
            WidgetKind::Editbox => "editbox",
            WidgetKind::Dropdown => "dropdown",
            WidgetKind::Scrollbar => "scrollbar",
            WidgetKind::StaticText => "static text",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A widget that subclasses one or more native windows.
pub trait SubclassWidget: Send + 'static {
    // =========================================================================
    // Required Methods
    // =========================================================================

    /// Which widget type this is.
    fn kind(&self) -> WidgetKind;

    /// Get a reference to the widget's base.
    fn base(&self) -> &WidgetBase;

    /// Handle a message sent to one of the widget's windows.
    ///
    /// Handlers never fail: errors are logged and the message is reported
    /// handled or passed on.
    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult;

    /// Rebuild device resources and replay the current visual state.
    ///
    /// Called after a resize or a theme change.
    fn refresh(&mut self) -> WidgetResult<()>;

    // =========================================================================
    // Provided Methods
    // =========================================================================

    /// The primary window, or the null handle before `set_window`.
    fn window(&self) -> WindowHandle {
        self.base().window()
    }

    /// Control ID of the primary window.
    fn control_id(&self) -> i32 {
        self.base().control_id()
    }

    /// Whether `set_window` succeeded.
    fn is_associated(&self) -> bool {
        self.base().is_associated()
    }
}
