//! Theme providers for Veneer.
//!
//! Widgets never hard-code colors. Every color they draw or animate towards
//! is resolved through a [`ThemeProvider`] by [`ColorRole`]: the widget, its
//! visual look and the painted part. Swapping the provider at runtime
//! re-themes every control.
//!
//! # Example
//!
//! ```
//! use veneer_style::{ButtonLook, ColorRole, Part, Theme, ThemeProvider};
//!
//! let theme = Theme::dark();
//! let hover_fill = theme.color(ColorRole::Button(ButtonLook::Hover, Part::Fill));
//! assert_eq!(hover_fill, theme.palette.surface_hover);
//! ```

mod palette;
mod provider;
mod theme;

pub use palette::ColorPalette;
pub use provider::{ButtonLook, ColorRole, Part, RadioLook, ThemeProvider, ThumbLook};
pub use theme::{DEFAULT_FONT_FAMILY, Theme, ThemeMode};
