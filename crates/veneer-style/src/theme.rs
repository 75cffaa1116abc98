//! Built-in themes.

use std::collections::HashMap;
use std::sync::Arc;

use veneer_core::logging::targets;
use veneer_render::{Bitmap, Color};

use crate::palette::ColorPalette;
use crate::provider::{ButtonLook, ColorRole, Part, RadioLook, ThemeProvider, ThumbLook};

/// Default caption font.
pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI";

/// Theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    HighContrast,
}

/// A palette-driven [`ThemeProvider`].
#[derive(Debug, Clone)]
pub struct Theme {
    /// Theme mode.
    pub mode: ThemeMode,
    /// Color palette.
    pub palette: ColorPalette,
    /// Caption font family.
    pub font_family: String,
    /// Corner radius of rounded controls.
    pub corner_radius: f32,
    bitmaps: HashMap<String, Arc<Bitmap>>,
}

impl Theme {
    /// Create a light theme.
    pub fn light() -> Self {
        Self::custom(ThemeMode::Light, ColorPalette::light())
    }

    /// Create a dark theme.
    pub fn dark() -> Self {
        Self::custom(ThemeMode::Dark, ColorPalette::dark())
    }

    /// Create a high-contrast theme. Corners are square.
    pub fn high_contrast() -> Self {
        Self {
            corner_radius: 0.0,
            ..Self::custom(ThemeMode::HighContrast, ColorPalette::high_contrast())
        }
    }

    /// Create a theme from a custom palette.
    pub fn custom(mode: ThemeMode, palette: ColorPalette) -> Self {
        Self {
            mode,
            palette,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            corner_radius: 4.0,
            bitmaps: HashMap::new(),
        }
    }

    /// Register a bitmap under `name`.
    pub fn with_bitmap(mut self, name: impl Into<String>, bitmap: Bitmap) -> Self {
        let name = name.into();
        tracing::trace!(target: targets::THEME, %name, "bitmap registered");
        self.bitmaps.insert(name, Arc::new(bitmap));
        self
    }

    /// Use a different caption font.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    fn button(&self, look: ButtonLook, part: Part) -> Color {
        let p = &self.palette;
        match (look, part) {
            (ButtonLook::Default, Part::Fill) => p.surface,
            (ButtonLook::Hover, Part::Fill) => p.surface_hover,
            (ButtonLook::Active, Part::Fill) => p.surface_pressed,
            (ButtonLook::Default, Part::Border) => p.border,
            (ButtonLook::Hover | ButtonLook::Active, Part::Border) => p.border_hover,
            (ButtonLook::Active, Part::Text) => p.text_muted,
            (_, Part::Text) => p.text,
        }
    }

    fn radio(&self, look: RadioLook, part: Part) -> Color {
        let p = &self.palette;
        match (look, part) {
            (RadioLook::Default, Part::Fill) => p.surface,
            (RadioLook::Hover, Part::Fill) => p.surface_hover,
            (RadioLook::Down, Part::Fill) => p.surface_pressed,
            (RadioLook::Selected, Part::Fill) => p.accent,
            (RadioLook::SelectedHover, Part::Fill) => p.accent_hover,
            (RadioLook::SelectedDown, Part::Fill) => p.accent_pressed,
            (RadioLook::Default, Part::Border) => p.text_muted,
            (RadioLook::Hover | RadioLook::Down, Part::Border) => p.text,
            (_, Part::Border) => p.accent,
            // The check mark is invisible until selected.
            (RadioLook::Default, Part::Text) => p.surface,
            (RadioLook::Hover, Part::Text) => p.surface_hover,
            (RadioLook::Down, Part::Text) => p.surface_pressed,
            (_, Part::Text) => p.on_accent,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl ThemeProvider for Theme {
    fn name(&self) -> &str {
        match self.mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::HighContrast => "high-contrast",
        }
    }

    fn color(&self, role: ColorRole) -> Color {
        let p = &self.palette;
        match role {
            ColorRole::Background => p.background,
            ColorRole::FocusRing => p.focus_ring,
            ColorRole::Button(look, part) | ColorRole::ImageButton(look, part) => {
                self.button(look, part)
            }
            ColorRole::Radio(look, part) => self.radio(look, part),
            ColorRole::RadioCaption => p.text,
            ColorRole::EditBorder { selected: false } => p.border,
            ColorRole::EditBorder { selected: true } => p.accent,
            ColorRole::EditFill => p.surface,
            ColorRole::EditBorderBackground => p.background,
            ColorRole::EditText => p.text,
            ColorRole::Dropdown(look, part) => self.button(look, part),
            ColorRole::DropdownItem { selected: false } => p.surface,
            ColorRole::DropdownItem { selected: true } => p.accent,
            ColorRole::DropdownItemText { selected: false } => p.text,
            ColorRole::DropdownItemText { selected: true } => p.on_accent,
            ColorRole::DropdownPopupBorder => p.border,
            ColorRole::ScrollTrack => p.track,
            ColorRole::ScrollThumb(ThumbLook::Default) => p.thumb,
            ColorRole::ScrollThumb(ThumbLook::Hover) => p.thumb_hover,
            ColorRole::ScrollThumb(ThumbLook::Dragging) => p.thumb_dragging,
            ColorRole::StaticText => p.text,
        }
    }

    fn font_family(&self) -> &str {
        &self.font_family
    }

    fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    fn bitmap(&self, name: &str) -> Option<Arc<Bitmap>> {
        self.bitmaps.get(name).cloned()
    }
}

static_assertions::assert_impl_all!(Theme: Send, Sync);
