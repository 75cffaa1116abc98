//! Logging facilities for Veneer.
//!
//! Veneer uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```
//!
//! Every log call in the workspace names its component through one of the
//! [`targets`] constants, so output can be filtered per widget type, e.g.
//! `RUST_LOG=veneer::scrollbar=debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Subclass system lifecycle and message dispatch.
    pub const SYSTEM: &str = "veneer::system";
    /// Animation engine and storyboard scheduling.
    pub const ANIMATION: &str = "veneer_core::animation";
    /// Draw surfaces, device resources and device-loss recovery.
    pub const RENDER: &str = "veneer_render";
    /// Theme providers and theme switching.
    pub const THEME: &str = "veneer_style::theme";
    /// Push buttons and image buttons.
    pub const BUTTON: &str = "veneer::button";
    /// Radio buttons and radio groups.
    pub const RADIO: &str = "veneer::radio";
    /// Edit boxes.
    pub const EDITBOX: &str = "veneer::editbox";
    /// Drop-down combo boxes.
    pub const DROPDOWN: &str = "veneer::dropdown";
    /// Vertical scrollbars.
    pub const SCROLLBAR: &str = "veneer::scrollbar";
    /// Static text labels.
    pub const STATIC_TEXT: &str = "veneer::static_text";
    /// Signal emission.
    pub const SIGNAL: &str = "veneer_core::signal";
}
