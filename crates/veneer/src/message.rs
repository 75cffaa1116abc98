//! Window messages delivered to subclassed widgets.

use veneer_render::{Point, Size};

/// Identifier of a per-window timer.
pub type TimerId = u32;

/// Dialog code asking the dialog manager to route every key to the control.
pub const DLGC_WANT_ALL_KEYS: isize = 0x0004;

/// Keys widgets react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Tab,
    Escape,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Any other virtual key code.
    Other(u32),
}

/// A message sent to a subclassed window.
///
/// Points are in the receiving window's client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    EraseBackground,
    Paint,
    Timer(TimerId),
    GetDialogCode,
    KeyDown(Key),
    KeyUp(Key),
    LeftButtonDown(Point),
    LeftButtonUp(Point),
    MouseMove(Point),
    MouseLeave,
    /// Wheel rotation in notches; positive scrolls up.
    MouseWheel(i32),
    SetFocus,
    KillFocus,
    Size(Size),
    Destroy,
}

/// What a subclass procedure did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResult {
    /// The widget consumed the message and produced this result.
    Handled(isize),
    /// Pass the message on to the previous window procedure.
    Default,
}

impl MessageResult {
    /// Whether the widget consumed the message.
    pub fn is_handled(self) -> bool {
        matches!(self, MessageResult::Handled(_))
    }
}
