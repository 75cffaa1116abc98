//! The native window host capability interface.
//!
//! Widgets never talk to the windowing system directly. Everything they need
//! from it (window queries, subclass installation, timers, input capture,
//! parent notifications, and the few control-specific queries for combo
//! boxes, scrollbars and rich edit controls) goes through [`WindowHost`].
//!
//! # Re-entrancy
//!
//! Widgets call the host while they are locked for message handling. A host
//! must therefore never deliver a message synchronously from inside one of
//! these calls; `set_focus`, `show_dropdown` and friends post whatever
//! messages they cause, and the message loop dispatches them afterwards.

use std::time::Duration;

use veneer_core::WindowHandle;
use veneer_render::{Color, Rect};

use crate::error::HostResult;
use crate::message::TimerId;

/// Native class of a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowClass {
    PushButton,
    RadioButton,
    Edit,
    Static,
    ComboBox,
    ComboList,
    ScrollBar,
    Other(String),
}

/// Notifications sent to a control's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The control was clicked or activated from the keyboard.
    Activated,
}

/// Combo box style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboStyle {
    Simple,
    DropDown,
    DropDownList,
}

/// What a combo box reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboInfo {
    /// The popup list window.
    pub list: WindowHandle,
    pub style: ComboStyle,
}

/// Scrollbar range and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollInfo {
    pub min: i32,
    pub max: i32,
    pub page: i32,
    pub pos: i32,
}

impl ScrollInfo {
    /// Largest position the thumb can reach.
    pub fn max_pos(&self) -> i32 {
        (self.max - self.page).max(self.min)
    }

    /// Clamp a position into `[min, max - page]`.
    pub fn clamp(&self, pos: i32) -> i32 {
        pos.clamp(self.min, self.max_pos())
    }
}

/// Character formatting applied to a rich edit control.
#[derive(Debug, Clone, PartialEq)]
pub struct CharFormat {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: Color,
    pub background: Color,
}

/// Capability interface over the native windowing system.
pub trait WindowHost: Send + Sync {
    /// Whether `window` names a live window.
    fn is_window(&self, window: WindowHandle) -> bool;

    /// Native class of `window`.
    fn window_class(&self, window: WindowHandle) -> HostResult<WindowClass>;

    /// Control ID of `window`.
    fn control_id(&self, window: WindowHandle) -> HostResult<i32>;

    /// Parent of `window`.
    fn parent(&self, window: WindowHandle) -> HostResult<WindowHandle>;

    /// Client area of `window`, origin at zero.
    fn client_rect(&self, window: WindowHandle) -> HostResult<Rect>;

    /// Caption of `window`.
    fn window_text(&self, window: WindowHandle) -> HostResult<String>;

    /// Route `window`'s messages through the subclass system.
    fn install_subclass(&self, window: WindowHandle) -> HostResult<()>;

    /// Restore `window`'s previous window procedure.
    fn remove_subclass(&self, window: WindowHandle) -> HostResult<()>;

    /// Schedule a repaint of `window`.
    fn invalidate(&self, window: WindowHandle);

    /// Arm a recurring timer. Re-arming an armed timer resets it.
    fn set_timer(&self, window: WindowHandle, id: TimerId, interval: Duration) -> HostResult<()>;

    /// Stop a timer. Returns whether it was armed.
    fn kill_timer(&self, window: WindowHandle, id: TimerId) -> bool;

    /// Ask for a `MouseLeave` message when the pointer leaves `window`.
    fn track_mouse_leave(&self, window: WindowHandle);

    fn set_capture(&self, window: WindowHandle);

    fn release_capture(&self);

    fn set_focus(&self, window: WindowHandle);

    /// The next (or previous) tab stop in `window`'s dialog.
    fn next_tab_stop(&self, window: WindowHandle, backward: bool) -> Option<WindowHandle>;

    /// Send a notification from `window` to its parent.
    fn notify_parent(&self, window: WindowHandle, notification: Notification);

    // Combo boxes

    fn combo_info(&self, combo: WindowHandle) -> HostResult<ComboInfo>;

    /// Remove the border and drop shadow from a combo popup.
    fn strip_popup_frame(&self, list: WindowHandle) -> HostResult<()>;

    fn set_item_height(&self, combo: WindowHandle, height: f32) -> HostResult<()>;

    fn is_dropped_down(&self, combo: WindowHandle) -> bool;

    fn show_dropdown(&self, combo: WindowHandle, show: bool);

    fn combo_items(&self, combo: WindowHandle) -> Vec<String>;

    fn combo_selection(&self, combo: WindowHandle) -> Option<usize>;

    // Scrollbars

    fn scroll_info(&self, scrollbar: WindowHandle) -> HostResult<ScrollInfo>;

    fn set_scroll_pos(&self, scrollbar: WindowHandle, pos: i32) -> HostResult<()>;

    /// Scroll the contents of `target` by `delta` pixels.
    fn scroll_window(&self, target: WindowHandle, delta: i32) -> HostResult<()>;

    // Edit controls

    fn set_char_format(&self, edit: WindowHandle, format: &CharFormat) -> HostResult<()>;
}
