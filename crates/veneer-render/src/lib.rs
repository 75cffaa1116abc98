//! Drawing layer for Veneer.
//!
//! This crate defines what widgets need from a graphics backend and how
//! device-dependent resources live and die:
//!
//! - [`GraphicsEngine`] and [`DrawSurface`]: capability interfaces over a
//!   2D drawing backend (surfaces bound to native windows, solid brushes,
//!   rectangles, rounded rectangles, text and bitmaps)
//! - [`UniqueResource`] / [`SharedResource`]: per-instance and per-type
//!   resource slots, with [`SharedResourceRegistry`] holding one
//!   [`SharedResourceSet`] per widget type
//! - [`paint_with_recovery`]: the bounded rebuild-and-retry loop run when a
//!   backend reports device loss
//! - [`HeadlessGraphics`]: a recording backend for offscreen use and tests
//!
//! # Painting with Recovery
//!
//! ```
//! use veneer_core::WindowHandle;
//! use veneer_render::{
//!     paint_with_recovery, Color, DrawSurface, GraphicsEngine, HeadlessGraphics, Size,
//!     MAX_PAINT_ATTEMPTS,
//! };
//!
//! let gfx = HeadlessGraphics::new();
//! let window = WindowHandle::from_raw(0x42);
//! let mut surface = gfx.bind_to_window(window, Size::new(120.0, 32.0)).unwrap();
//!
//! gfx.fail_end_draws(2);
//! let report = paint_with_recovery(
//!     &mut surface,
//!     MAX_PAINT_ATTEMPTS,
//!     |surface| {
//!         surface.begin_draw()?;
//!         surface.clear(Color::WHITE);
//!         surface.end_draw()
//!     },
//!     |surface| {
//!         *surface = gfx.bind_to_window(window, Size::new(120.0, 32.0))?;
//!         Ok(())
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(report.rebuilds, 2);
//! assert!(gfx.last_frame(window).is_some());
//! ```

mod error;
mod headless;
mod recovery;
mod resource;
mod surface;
mod types;

pub use error::{RenderError, RenderResult};
pub use headless::{DrawCommand, HeadlessGraphics, HeadlessSurface};
pub use recovery::{DeviceLoss, MAX_PAINT_ATTEMPTS, PaintReport, paint_with_recovery};
pub use resource::{SharedResource, SharedResourceRegistry, SharedResourceSet, UniqueResource};
pub use surface::{
    Bitmap, Brush, DrawSurface, FontWeight, GraphicsEngine, HorizontalAlign, TextFormat,
    TextFormatSpec, VerticalAlign,
};
pub use types::{Color, Point, Rect, RoundedRect, Size};
