//! Color palette definitions.

use veneer_render::Color;

/// The base colors a theme derives every widget color from.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    // Backgrounds
    /// Window/dialog background behind the controls.
    pub background: Color,
    /// Resting control surface.
    pub surface: Color,
    /// Control surface under the pointer.
    pub surface_hover: Color,
    /// Control surface while pressed.
    pub surface_pressed: Color,

    // Accent
    /// Accent used for selection and checked marks.
    pub accent: Color,
    /// Accent under the pointer.
    pub accent_hover: Color,
    /// Accent while pressed.
    pub accent_pressed: Color,
    /// Text/mark color drawn on top of the accent.
    pub on_accent: Color,

    // Text
    /// Primary text color.
    pub text: Color,
    /// Secondary/muted text color.
    pub text_muted: Color,

    // Borders
    /// Resting border.
    pub border: Color,
    /// Border under the pointer or while active.
    pub border_hover: Color,
    /// Keyboard focus ring.
    pub focus_ring: Color,

    // Scrollbars
    /// Scrollbar track.
    pub track: Color,
    /// Resting scrollbar thumb.
    pub thumb: Color,
    /// Thumb under the pointer.
    pub thumb_hover: Color,
    /// Thumb while dragged.
    pub thumb_dragging: Color,
}

impl ColorPalette {
    /// Create a light palette.
    pub const fn light() -> Self {
        Self {
            background: Color::from_rgb8(0xF3, 0xF3, 0xF3),
            surface: Color::from_rgb8(0xFB, 0xFB, 0xFB),
            surface_hover: Color::from_rgb8(0xF0, 0xF0, 0xF0),
            surface_pressed: Color::from_rgb8(0xE1, 0xE1, 0xE1),

            accent: Color::from_rgb8(0x00, 0x67, 0xC0),
            accent_hover: Color::from_rgb8(0x19, 0x75, 0xC5),
            accent_pressed: Color::from_rgb8(0x31, 0x83, 0xCA),
            on_accent: Color::WHITE,

            text: Color::from_rgb8(0x1B, 0x1B, 0x1B),
            text_muted: Color::from_rgb8(0x5F, 0x5F, 0x5F),

            border: Color::from_rgb8(0xD0, 0xD0, 0xD0),
            border_hover: Color::from_rgb8(0xA0, 0xA0, 0xA0),
            focus_ring: Color::from_rgb8(0x1B, 0x1B, 0x1B),

            track: Color::from_rgb8(0xF3, 0xF3, 0xF3),
            thumb: Color::from_rgb8(0x8A, 0x8A, 0x8A),
            thumb_hover: Color::from_rgb8(0x6E, 0x6E, 0x6E),
            thumb_dragging: Color::from_rgb8(0x52, 0x52, 0x52),
        }
    }

    /// Create a dark palette.
    pub const fn dark() -> Self {
        Self {
            background: Color::from_rgb8(0x20, 0x20, 0x20),
            surface: Color::from_rgb8(0x2D, 0x2D, 0x2D),
            surface_hover: Color::from_rgb8(0x32, 0x32, 0x32),
            surface_pressed: Color::from_rgb8(0x27, 0x27, 0x27),

            accent: Color::from_rgb8(0x4C, 0xC2, 0xFF),
            accent_hover: Color::from_rgb8(0x47, 0xB1, 0xE8),
            accent_pressed: Color::from_rgb8(0x42, 0xA1, 0xD2),
            on_accent: Color::BLACK,

            text: Color::WHITE,
            text_muted: Color::from_rgb8(0xC5, 0xC5, 0xC5),

            border: Color::from_rgb8(0x3F, 0x3F, 0x3F),
            border_hover: Color::from_rgb8(0x5A, 0x5A, 0x5A),
            focus_ring: Color::WHITE,

            track: Color::from_rgb8(0x20, 0x20, 0x20),
            thumb: Color::from_rgb8(0x9F, 0x9F, 0x9F),
            thumb_hover: Color::from_rgb8(0xBB, 0xBB, 0xBB),
            thumb_dragging: Color::from_rgb8(0xD6, 0xD6, 0xD6),
        }
    }

    /// Create a high-contrast palette.
    pub const fn high_contrast() -> Self {
        Self {
            background: Color::BLACK,
            surface: Color::BLACK,
            surface_hover: Color::from_rgb8(0x1A, 0xEB, 0xFF),
            surface_pressed: Color::from_rgb8(0x1A, 0xEB, 0xFF),

            accent: Color::from_rgb8(0xFF, 0xFF, 0x00),
            accent_hover: Color::from_rgb8(0x1A, 0xEB, 0xFF),
            accent_pressed: Color::from_rgb8(0x1A, 0xEB, 0xFF),
            on_accent: Color::BLACK,

            text: Color::WHITE,
            text_muted: Color::WHITE,

            border: Color::WHITE,
            border_hover: Color::from_rgb8(0xFF, 0xFF, 0x00),
            focus_ring: Color::WHITE,

            track: Color::BLACK,
            thumb: Color::WHITE,
            thumb_hover: Color::from_rgb8(0xFF, 0xFF, 0x00),
            thumb_dragging: Color::from_rgb8(0x1A, 0xEB, 0xFF),
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::light()
    }
}
