//! The owner-drawn widgets.
//!
//! Every widget is created against an initialized [`SubclassSystem`]
//! (`Widget::new` returns an `Arc<Mutex<Widget>>`), then bound to its native
//! window(s) once with `set_window`. From then on the system routes the
//! windows' messages to the widget until the primary window is destroyed.
//!
//! [`SubclassSystem`]: crate::SubclassSystem

mod abstract_button;
mod button;
mod dropdown;
mod editbox;
mod image_button;
mod radio_button;
mod radio_group;
mod scrollbar;
mod static_text;

use veneer_core::WindowHandle;
use veneer_core::logging::targets;
use veneer_render::PaintReport;

use crate::error::WidgetResult;
use crate::message::MessageResult;
use crate::widget::WidgetKind;

pub use abstract_button::ButtonState;
pub use button::ButtonWidget;
pub use dropdown::{DropdownState, DropdownWidget};
pub use editbox::{EditState, EditboxConfig, EditboxWidget, MULTILINE_FONT_SIZE};
pub use image_button::{ImageButtonConfig, ImageButtonWidget};
pub use radio_button::{RadioButtonWidget, RadioState};
pub use radio_group::RadioGroup;
pub use scrollbar::{ScrollbarConfig, ScrollbarWidget, ThumbState};
pub use static_text::{StaticTextConfig, StaticTextWidget};

/// Map the outcome of [`drive`](crate::widget::drive) to a message result.
///
/// Input the widget does not care about goes to the native procedure.
/// Failures are logged; the message still counts as handled.
pub(crate) fn input_result(
    kind: WidgetKind,
    window: WindowHandle,
    outcome: Option<WidgetResult<()>>,
) -> MessageResult {
    match outcome {
        None => MessageResult::Default,
        Some(Ok(())) => MessageResult::Handled(0),
        Some(Err(err)) => {
            tracing::warn!(target: targets::SYSTEM, %kind, %window, error = %err, "input handling failed");
            MessageResult::Handled(0)
        }
    }
}

/// Log the outcome of a paint. Paint messages are always handled.
pub(crate) fn paint_result(
    kind: WidgetKind,
    window: WindowHandle,
    report: WidgetResult<PaintReport>,
) -> MessageResult {
    match report {
        Ok(report) if report.rebuilds > 0 => {
            tracing::debug!(
                target: targets::RENDER,
                %kind,
                %window,
                attempts = report.attempts,
                rebuilds = report.rebuilds,
                "painted after device loss"
            );
        }
        Ok(_) => {}
        Err(err) => {
            tracing::error!(target: targets::RENDER, %kind, %window, error = %err, "paint failed");
        }
    }
    MessageResult::Handled(0)
}
