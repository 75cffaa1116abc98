//! Widget timers.
//!
//! Widgets own at most two recurring timers per window: the animation
//! invalidate timer, which repaints while visual-state storyboards play,
//! and the smooth-scroll timer. The animation timer stops once every
//! storyboard its [`Animator`](crate::widget::Animator) scheduled finished;
//! the scroll timer stops once no storyboard with the scroll tag is active.

use veneer_core::{AnimationEngine, StoryboardTag, WindowHandle};

use crate::config::ToolkitSettings;
use crate::error::WidgetResult;
use crate::host::WindowHost;
use crate::message::TimerId;

/// Repaints a window while its visual-state storyboard plays.
pub const ANIMATION_TIMER: TimerId = 1;

/// Drives a scrollbar's smooth-scroll storyboard.
pub const SCROLL_TIMER: TimerId = 2;

/// Start (or restart) a recurring widget timer.
///
/// # Arguments
///
/// * `host` - The window host that owns timers
/// * `window` - The window that will receive `Message::Timer(id)`
/// * `id` - Which widget timer to arm
/// * `settings` - Supplies the tick interval
pub fn start_widget_timer(
    host: &dyn WindowHost,
    window: WindowHandle,
    id: TimerId,
    settings: &ToolkitSettings,
) -> WidgetResult<()> {
    host.set_timer(window, id, settings.timer_interval())?;
    Ok(())
}

/// Stop a widget timer.
///
/// # Returns
///
/// `true` if the timer was armed.
pub fn stop_widget_timer(host: &dyn WindowHost, window: WindowHandle, id: TimerId) -> bool {
    host.kill_timer(window, id)
}

/// Stop the timer once no storyboard carrying `tag` is active.
///
/// # Returns
///
/// `true` while the storyboard is still running and the timer stays armed.
pub fn poll_storyboard(
    engine: &dyn AnimationEngine,
    host: &dyn WindowHost,
    window: WindowHandle,
    id: TimerId,
    tag: StoryboardTag,
) -> bool {
    if engine.is_tag_active(tag) {
        true
    } else {
        stop_widget_timer(host, window, id);
        false
    }
}
