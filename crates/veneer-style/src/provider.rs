//! The theme provider capability interface.

use std::sync::Arc;

use veneer_render::{Bitmap, Color};

/// Which painted part of a control a color is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The control's body.
    Fill,
    /// The control's outline.
    Border,
    /// Caption text, or the check mark of a radio button.
    Text,
}

/// Visual look of push buttons, image buttons and drop-downs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonLook {
    Default,
    Hover,
    Active,
}

/// Visual look of radio buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioLook {
    Default,
    Hover,
    Down,
    Selected,
    SelectedHover,
    SelectedDown,
}

/// Visual look of scrollbar thumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbLook {
    Default,
    Hover,
    Dragging,
}

/// A themed color, named by widget, look and part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Dialog background behind the controls.
    Background,
    /// Keyboard focus ring.
    FocusRing,
    /// Push button colors.
    Button(ButtonLook, Part),
    /// Image button colors. `Part::Text` is unused.
    ImageButton(ButtonLook, Part),
    /// Radio button colors. `Part::Text` is the check mark.
    Radio(RadioLook, Part),
    /// Radio button caption.
    RadioCaption,
    /// Edit box border, resting or focused.
    EditBorder { selected: bool },
    /// Edit box body.
    EditFill,
    /// Edit box background behind the rounded border.
    EditBorderBackground,
    /// Edit box text.
    EditText,
    /// Drop-down colors. `ButtonLook::Hover` is never requested.
    Dropdown(ButtonLook, Part),
    /// Drop-down popup row background.
    DropdownItem { selected: bool },
    /// Drop-down popup row text.
    DropdownItemText { selected: bool },
    /// Drop-down popup outline.
    DropdownPopupBorder,
    /// Scrollbar track.
    ScrollTrack,
    /// Scrollbar thumb.
    ScrollThumb(ThumbLook),
    /// Static text.
    StaticText,
}

/// Supplies per-state colors, fonts and bitmaps to widgets.
pub trait ThemeProvider: Send + Sync {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Resolve a color.
    fn color(&self, role: ColorRole) -> Color;

    /// Font family used for every caption.
    fn font_family(&self) -> &str;

    /// Corner radius of rounded controls.
    fn corner_radius(&self) -> f32 {
        4.0
    }

    /// Look up a bitmap by resource name.
    fn bitmap(&self, name: &str) -> Option<Arc<Bitmap>>;
}
