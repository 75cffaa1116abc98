//! A graphics backend that records draw commands instead of rasterizing.
//!
//! [`HeadlessGraphics`] is useful for offscreen rendering, inspection of
//! what a widget painted, and tests. Every surface records its draw calls
//! and, on a successful `end_draw`, publishes them as the window's last
//! presented frame. Device loss can be simulated with
//! [`HeadlessGraphics::fail_end_draws`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use veneer_core::WindowHandle;
use veneer_core::logging::targets;

use crate::error::{RenderError, RenderResult};
use crate::surface::{Bitmap, Brush, DrawSurface, GraphicsEngine, TextFormat, TextFormatSpec};
use crate::types::{Color, Rect, RoundedRect, Size};

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.25;

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    DrawRect {
        rect: Rect,
        color: Color,
        stroke_width: f32,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    DrawRoundRect {
        rect: RoundedRect,
        color: Color,
        stroke_width: f32,
    },
    FillRoundRect {
        rect: RoundedRect,
        color: Color,
    },
    Text {
        text: String,
        rect: Rect,
        color: Color,
        font_size: f32,
    },
    Image {
        name: String,
        rect: Rect,
        opacity: f32,
    },
}

#[derive(Debug, Default)]
struct HeadlessState {
    frames: HashMap<WindowHandle, Vec<DrawCommand>>,
    pending_failures: u32,
    surfaces_created: usize,
    brushes_created: usize,
    text_formats_created: usize,
    frames_presented: usize,
}

/// The recording graphics engine. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessGraphics {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessGraphics {
    /// Create an engine with no recorded frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `end_draw` report device loss.
    pub fn fail_end_draws(&self, count: u32) {
        self.state.lock().pending_failures = count;
    }

    /// The last successfully presented frame of `window`.
    pub fn last_frame(&self, window: WindowHandle) -> Option<Vec<DrawCommand>> {
        self.state.lock().frames.get(&window).cloned()
    }

    /// Total surfaces bound so far.
    pub fn surfaces_created(&self) -> usize {
        self.state.lock().surfaces_created
    }

    /// Total brushes created so far, across all surfaces.
    pub fn brushes_created(&self) -> usize {
        self.state.lock().brushes_created
    }

    /// Total text formats created so far.
    pub fn text_formats_created(&self) -> usize {
        self.state.lock().text_formats_created
    }

    /// Total frames presented so far.
    pub fn frames_presented(&self) -> usize {
        self.state.lock().frames_presented
    }
}

impl GraphicsEngine for HeadlessGraphics {
    fn bind_to_window(
        &self,
        window: WindowHandle,
        size: Size,
    ) -> RenderResult<Box<dyn DrawSurface>> {
        if window.is_null() {
            return Err(RenderError::InvalidWindow(window));
        }
        check_size(size)?;

        self.state.lock().surfaces_created += 1;
        tracing::trace!(target: targets::RENDER, %window, ?size, "headless surface bound");
        Ok(Box::new(HeadlessSurface {
            window,
            size,
            drawing: false,
            commands: Vec::new(),
            state: self.state.clone(),
        }))
    }

    fn create_text_format(&self, spec: &TextFormatSpec) -> RenderResult<TextFormat> {
        if !(spec.size.is_finite() && spec.size > 0.0) {
            return Err(RenderError::ResourceCreation {
                kind: "text format",
                reason: format!("font size {} must be positive", spec.size),
            });
        }
        self.state.lock().text_formats_created += 1;
        Ok(TextFormat::from_spec(spec.clone()))
    }

    fn measure_text(&self, text: &str, format: &TextFormat) -> RenderResult<Size> {
        let size = format.font_size();
        let glyphs = text.chars().count() as f32;
        Ok(Size::new(glyphs * size * GLYPH_ADVANCE, size * LINE_HEIGHT))
    }
}

fn check_size(size: Size) -> RenderResult<()> {
    if size.width.is_finite() && size.height.is_finite() && size.width >= 0.0 && size.height >= 0.0
    {
        Ok(())
    } else {
        Err(RenderError::InvalidDimensions {
            width: size.width,
            height: size.height,
        })
    }
}

/// A surface recording into a [`HeadlessGraphics`].
pub struct HeadlessSurface {
    window: WindowHandle,
    size: Size,
    drawing: bool,
    commands: Vec<DrawCommand>,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    fn record(&mut self, command: DrawCommand) {
        if self.drawing {
            self.commands.push(command);
        }
    }
}

impl DrawSurface for HeadlessSurface {
    fn window(&self) -> WindowHandle {
        self.window
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) -> RenderResult<()> {
        check_size(size)?;
        self.size = size;
        Ok(())
    }

    fn begin_draw(&mut self) -> RenderResult<()> {
        if self.drawing {
            return Err(RenderError::AlreadyDrawing);
        }
        self.drawing = true;
        self.commands.clear();
        Ok(())
    }

    fn end_draw(&mut self) -> RenderResult<()> {
        if !self.drawing {
            return Err(RenderError::NotDrawing);
        }
        self.drawing = false;
        let commands = std::mem::take(&mut self.commands);

        let mut state = self.state.lock();
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(RenderError::RecreateTarget);
        }
        state.frames.insert(self.window, commands);
        state.frames_presented += 1;
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.record(DrawCommand::Clear(color));
    }

    fn create_solid_brush(&mut self, color: Color) -> RenderResult<Brush> {
        self.state.lock().brushes_created += 1;
        Ok(Brush::new(color))
    }

    fn draw_rect(&mut self, rect: Rect, brush: &Brush, stroke_width: f32) {
        self.record(DrawCommand::DrawRect {
            rect,
            color: brush.color(),
            stroke_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        self.record(DrawCommand::FillRect {
            rect,
            color: brush.color(),
        });
    }

    fn draw_round_rect(&mut self, rect: RoundedRect, brush: &Brush, stroke_width: f32) {
        self.record(DrawCommand::DrawRoundRect {
            rect,
            color: brush.color(),
            stroke_width,
        });
    }

    fn fill_round_rect(&mut self, rect: RoundedRect, brush: &Brush) {
        self.record(DrawCommand::FillRoundRect {
            rect,
            color: brush.color(),
        });
    }

    fn draw_text(&mut self, text: &str, format: &TextFormat, rect: Rect, brush: &Brush) {
        self.record(DrawCommand::Text {
            text: text.to_owned(),
            rect,
            color: brush.color(),
            font_size: format.font_size(),
        });
    }

    fn draw_image(&mut self, image: &Bitmap, rect: Rect, opacity: f32) {
        self.record(DrawCommand::Image {
            name: image.name().to_owned(),
            rect,
            opacity,
        });
    }
}

static_assertions::assert_impl_all!(HeadlessGraphics: Send, Sync);
static_assertions::assert_impl_all!(HeadlessSurface: Send);

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> WindowHandle {
        WindowHandle::from_raw(0x100)
    }

    #[test]
    fn test_frame_is_published_on_end_draw() {
        let gfx = HeadlessGraphics::new();
        let mut surface = gfx.bind_to_window(window(), Size::new(80.0, 24.0)).unwrap();
        let brush = surface.create_solid_brush(Color::WHITE).unwrap();

        surface.begin_draw().unwrap();
        surface.clear(Color::BLACK);
        surface.fill_rect(Rect::new(0.0, 0.0, 80.0, 24.0), &brush);
        assert!(gfx.last_frame(window()).is_none());
        surface.end_draw().unwrap();

        let frame = gfx.last_frame(window()).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(gfx.frames_presented(), 1);
        assert_eq!(gfx.brushes_created(), 1);
    }

    #[test]
    fn test_injected_failure_keeps_previous_frame() {
        let gfx = HeadlessGraphics::new();
        let mut surface = gfx.bind_to_window(window(), Size::new(10.0, 10.0)).unwrap();

        surface.begin_draw().unwrap();
        surface.clear(Color::WHITE);
        surface.end_draw().unwrap();

        gfx.fail_end_draws(1);
        surface.begin_draw().unwrap();
        surface.clear(Color::BLACK);
        assert_eq!(surface.end_draw(), Err(RenderError::RecreateTarget));

        assert_eq!(
            gfx.last_frame(window()).unwrap(),
            vec![DrawCommand::Clear(Color::WHITE)]
        );
    }

    #[test]
    fn test_draw_outside_frame_is_ignored() {
        let gfx = HeadlessGraphics::new();
        let mut surface = gfx.bind_to_window(window(), Size::new(10.0, 10.0)).unwrap();
        surface.clear(Color::BLACK);
        assert_eq!(surface.end_draw(), Err(RenderError::NotDrawing));

        surface.begin_draw().unwrap();
        assert_eq!(surface.begin_draw(), Err(RenderError::AlreadyDrawing));
        surface.end_draw().unwrap();
        assert!(gfx.last_frame(window()).unwrap().is_empty());
    }

    #[test]
    fn test_bind_rejects_null_window() {
        let gfx = HeadlessGraphics::new();
        assert!(matches!(
            gfx.bind_to_window(WindowHandle::NULL, Size::new(1.0, 1.0)),
            Err(RenderError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_measure_text() {
        let gfx = HeadlessGraphics::new();
        let format = gfx
            .create_text_format(&TextFormatSpec::new("Segoe UI", 20.0))
            .unwrap();
        let size = gfx.measure_text("abcd", &format).unwrap();
        assert_eq!(size, Size::new(40.0, 25.0));
        assert_eq!(gfx.text_formats_created(), 1);

        assert!(
            gfx.create_text_format(&TextFormatSpec::new("Segoe UI", 0.0))
                .is_err()
        );
    }
}
