//! Drawing surfaces and the graphics engine capability interface.
//!
//! A [`GraphicsEngine`] binds a [`DrawSurface`] to a native window. The
//! surface creates brushes and draws a small vocabulary of primitives
//! between [`begin_draw`](DrawSurface::begin_draw) and
//! [`end_draw`](DrawSurface::end_draw). Device loss is reported by
//! `end_draw` as [`RenderError::RecreateTarget`](crate::RenderError).

use std::sync::Arc;

use veneer_core::WindowHandle;

use crate::error::RenderResult;
use crate::types::{Color, Rect, RoundedRect, Size};

/// Font weight, typically ranging from 100 (thin) to 900 (black).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal/regular weight (400).
    pub const NORMAL: Self = Self(400);
    /// Semi-bold weight (600).
    pub const SEMI_BOLD: Self = Self(600);
    /// Bold weight (700).
    pub const BOLD: Self = Self(700);

    /// Create a font weight from a numeric value (100-900).
    pub fn new(weight: u16) -> Self {
        Self(weight.clamp(100, 900))
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlign {
    /// Left-aligned text.
    #[default]
    Left,
    /// Center-aligned text.
    Center,
    /// Right-aligned text.
    Right,
}

/// Vertical text alignment within a layout rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlign {
    /// Top-aligned text.
    Top,
    /// Center-aligned text.
    #[default]
    Middle,
    /// Bottom-aligned text.
    Bottom,
}

/// Parameters for creating a [`TextFormat`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormatSpec {
    /// Font family name.
    pub family: String,
    /// Font size in device-independent pixels.
    pub size: f32,
    /// Font weight.
    pub weight: FontWeight,
    /// Horizontal alignment.
    pub align: HorizontalAlign,
    /// Vertical alignment.
    pub vertical_align: VerticalAlign,
}

impl TextFormatSpec {
    /// A regular-weight, centered format.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::NORMAL,
            align: HorizontalAlign::Center,
            vertical_align: VerticalAlign::Middle,
        }
    }

    /// Set the horizontal alignment.
    pub fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = align;
        self
    }

    /// Set the vertical alignment.
    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = align;
        self
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }
}

/// A created text format. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormat {
    spec: Arc<TextFormatSpec>,
}

impl TextFormat {
    /// Wrap a validated spec. Called by graphics engines.
    pub fn from_spec(spec: TextFormatSpec) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }

    /// The parameters this format was created with.
    pub fn spec(&self) -> &TextFormatSpec {
        &self.spec
    }

    /// Font size in device-independent pixels.
    pub fn font_size(&self) -> f32 {
        self.spec.size
    }
}

/// A solid-color brush created by a [`DrawSurface`].
///
/// Brushes are recolored in place while painting animated colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    color: Color,
}

impl Brush {
    /// Create a brush. Called by draw surfaces.
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Current color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Recolor the brush.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A decoded bitmap supplied by the theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    name: String,
    size: Size,
}

impl Bitmap {
    /// Describe a bitmap by name and pixel size.
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// The resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel size.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// A renderable target bound to one window.
pub trait DrawSurface: Send {
    /// The window this surface draws into.
    fn window(&self) -> WindowHandle;

    /// Current pixel size.
    fn size(&self) -> Size;

    /// Resize the backing store.
    fn resize(&mut self, size: Size) -> RenderResult<()>;

    /// Open a frame.
    fn begin_draw(&mut self) -> RenderResult<()>;

    /// Close and present the frame.
    ///
    /// Returns [`RenderError::RecreateTarget`](crate::RenderError::RecreateTarget)
    /// when the device was lost. The frame is discarded in that case.
    fn end_draw(&mut self) -> RenderResult<()>;

    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    /// Create a solid-color brush valid for this surface's device.
    fn create_solid_brush(&mut self, color: Color) -> RenderResult<Brush>;

    /// Stroke a rectangle outline.
    fn draw_rect(&mut self, rect: Rect, brush: &Brush, stroke_width: f32);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, brush: &Brush);

    /// Stroke a rounded rectangle outline.
    fn draw_round_rect(&mut self, rect: RoundedRect, brush: &Brush, stroke_width: f32);

    /// Fill a rounded rectangle.
    fn fill_round_rect(&mut self, rect: RoundedRect, brush: &Brush);

    /// Draw text laid out inside `rect`.
    fn draw_text(&mut self, text: &str, format: &TextFormat, rect: Rect, brush: &Brush);

    /// Draw a bitmap scaled into `rect`.
    fn draw_image(&mut self, image: &Bitmap, rect: Rect, opacity: f32);
}

/// Factory for surfaces and device-independent resources.
pub trait GraphicsEngine: Send + Sync {
    /// Create a surface drawing into `window`.
    fn bind_to_window(&self, window: WindowHandle, size: Size)
    -> RenderResult<Box<dyn DrawSurface>>;

    /// Create a text format.
    fn create_text_format(&self, spec: &TextFormatSpec) -> RenderResult<TextFormat>;

    /// Measure a single line of text laid out with `format`.
    fn measure_text(&self, text: &str, format: &TextFormat) -> RenderResult<Size>;
}
