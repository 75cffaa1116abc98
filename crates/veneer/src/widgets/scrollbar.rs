//! Scrollbar widget with smooth scrolling.
//!
//! A [`ScrollbarWidget`] pairs a native vertical scrollbar, which keeps the
//! range and position, with a static decoration window that paints the
//! track and thumb and receives pointer input. Every position change is
//! forwarded to a scroll target window as a pixel delta.
//!
//! # Smooth scrolling
//!
//! The scroll position is itself an animation variable. Smooth scrolls
//! schedule a storyboard tagged with the scrollbar's scroll channel and arm
//! the scroll timer; each tick reads the animated position, applies it with
//! [`ScrollbarWidget::scroll_window_by_pos`], and the timer stops once the
//! engine no longer reports the storyboard as active.
//!
//! # Signals
//!
//! - `position_changed(i32)`: Emitted after the position changed. Slots run
//!   while the widget is locked and must not lock it again.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{
    AnimationEngine, Rounding, Signal, StoryboardTag, TransitionSpec, VariableBounds, VariableId,
    WindowHandle,
};
use veneer_render::{
    Brush, Color, DrawSurface, PaintReport, Point, Rect, RoundedRect, SharedResource,
    SharedResourceSet, UniqueResource, paint_with_recovery,
};
use veneer_style::{ColorRole, ThumbLook};

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{ScrollInfo, WindowClass};
use crate::message::{Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::{check_class, check_window};
use crate::widget::timer::{self, ANIMATION_TIMER, SCROLL_TIMER};
use crate::widget::{
    Animator, Phase, PointerState, StateTarget, SubclassWidget, SurfaceSlot, VisualState,
    WidgetBase, WidgetKind,
};
use crate::widgets::{input_result, paint_result};

/// Shortest thumb, in pixels.
const MIN_THUMB: f32 = 16.0;
const THUMB_INSET: f32 = 2.0;

/// Configuration of a scrollbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarConfig {
    /// The static window that paints the scrollbar. Required.
    pub static_window: WindowHandle,
    /// The window whose contents scroll. Required.
    pub target: WindowHandle,
    /// Animate wheel and track-click scrolls.
    pub smooth: bool,
    /// Pixels per line; the toolkit setting when unset.
    pub line_step: Option<i32>,
    pub base: SubclassConfig,
}

impl ScrollbarConfig {
    pub fn new(static_window: WindowHandle, target: WindowHandle) -> Self {
        Self {
            static_window,
            target,
            smooth: false,
            line_step: None,
            base: SubclassConfig::default(),
        }
    }

    pub fn smooth(mut self) -> Self {
        self.smooth = true;
        self
    }

    pub fn with_line_step(mut self, step: i32) -> Self {
        self.line_step = Some(step);
        self
    }

    pub fn with_base(mut self, base: SubclassConfig) -> Self {
        self.base = base;
        self
    }

    fn validate(&self) -> WidgetResult<()> {
        if self.static_window.is_null() {
            return Err(WidgetError::InvalidConfig(
                "a scrollbar needs a static window".into(),
            ));
        }
        if self.target.is_null() {
            return Err(WidgetError::InvalidConfig(
                "a scrollbar needs a scroll target".into(),
            ));
        }
        if let Some(step) = self.line_step
            && step <= 0
        {
            return Err(WidgetError::InvalidConfig(format!(
                "line step {step} must be positive"
            )));
        }
        Ok(())
    }
}

/// Visual states of a scrollbar thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbState {
    Default,
    Hover,
    Dragging,
}

impl VisualState for ThumbState {
    fn phase(self) -> Phase {
        match self {
            ThumbState::Default => Phase::Default,
            ThumbState::Hover => Phase::Hover,
            ThumbState::Dragging => Phase::Active,
        }
    }
}

impl ThumbState {
    fn look(self) -> ThumbLook {
        match self {
            ThumbState::Default => ThumbLook::Default,
            ThumbState::Hover => ThumbLook::Hover,
            ThumbState::Dragging => ThumbLook::Dragging,
        }
    }
}

#[derive(Default)]
pub(crate) struct ScrollbarResources {
    track: SharedResource<Brush>,
}

impl SharedResourceSet for ScrollbarResources {
    fn release(&self) {
        self.track.release();
    }
}

/// The animated scroll position. Released with the widget.
struct ScrollPosition {
    engine: Arc<dyn AnimationEngine>,
    variable: VariableId,
}

impl ScrollPosition {
    fn new(engine: Arc<dyn AnimationEngine>, initial: i32) -> WidgetResult<Self> {
        let bounds = VariableBounds::new(f64::from(i32::MIN), f64::from(i32::MAX));
        let variable = engine.create_variable(f64::from(initial), bounds, Rounding::Nearest)?;
        Ok(Self { engine, variable })
    }

    fn value(&self) -> WidgetResult<i32> {
        let value = self.engine.integer_value(self.variable)?;
        Ok(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

impl Drop for ScrollPosition {
    fn drop(&mut self) {
        if let Err(err) = self.engine.release_variable(self.variable) {
            tracing::warn!(target: targets::SCROLLBAR, error = %err, "failed to release scroll variable");
        }
    }
}

/// Thumb rectangle for `info` inside `track`.
fn thumb_rect(track: Rect, info: &ScrollInfo) -> Rect {
    let range = (info.max - info.min) as f32;
    if range <= 0.0 || info.page as f32 >= range {
        return track;
    }
    let length = (track.height() * info.page as f32 / range)
        .max(MIN_THUMB)
        .min(track.height());
    let travel = track.height() - length;
    let span = (info.max_pos() - info.min) as f32;
    let offset = if span > 0.0 {
        (info.pos - info.min) as f32 / span * travel
    } else {
        0.0
    };
    Rect::new(track.left(), track.top() + offset, track.width(), length)
}

/// Position whose thumb starts `thumb_top` pixels into `track`.
fn position_at(track: Rect, info: &ScrollInfo, thumb_top: f32) -> i32 {
    let thumb = thumb_rect(track, info);
    let travel = track.height() - thumb.height();
    if travel <= 0.0 {
        return info.min;
    }
    let fraction = ((thumb_top - track.top()) / travel).clamp(0.0, 1.0);
    let span = (info.max_pos() - info.min) as f32;
    info.min + (fraction * span).round() as i32
}

/// An in-progress thumb drag.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    /// Pointer offset from the thumb's top edge.
    grab: f32,
}

/// An owner-drawn vertical scrollbar.
pub struct ScrollbarWidget {
    base: WidgetBase,
    animator: Option<Animator<ThumbState>>,
    position: Option<ScrollPosition>,
    pointer: PointerState,
    drag: Option<Drag>,
    /// Where the smooth scroll in flight ends.
    smooth_target: Option<i32>,
    decoration: WindowHandle,
    target: WindowHandle,
    smooth: bool,
    line_step: i32,
    surface: SurfaceSlot,
    thumb: UniqueResource<Brush>,
    shared: Arc<ScrollbarResources>,
    position_changed: Signal<i32>,
    this: Weak<Mutex<Self>>,
}

impl ScrollbarWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let base = WidgetBase::new(system, WidgetKind::Scrollbar)?;
        let shared = system.shared_resources().get_or_insert::<ScrollbarResources>();
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                base,
                animator: None,
                position: None,
                pointer: PointerState::default(),
                drag: None,
                smooth_target: None,
                decoration: WindowHandle::NULL,
                target: WindowHandle::NULL,
                smooth: false,
                line_step: 0,
                surface: SurfaceSlot::new(),
                thumb: UniqueResource::new(),
                shared,
                position_changed: Signal::new(),
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a native scrollbar.
    pub fn set_window(&mut self, window: WindowHandle, config: ScrollbarConfig) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.base.check_association(&providers, window, &config.base)?;
        config.validate()?;
        let host = providers.host.as_ref();
        check_class(host, window, WindowClass::ScrollBar, "scrollbar")?;
        check_window(host, config.static_window)?;
        check_class(host, config.static_window, WindowClass::Static, "static window")?;
        check_window(host, config.target)?;
        let info = host.scroll_info(window)?;
        let control_id = host.control_id(window)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;

        let rest = providers
            .theme
            .color(ColorRole::ScrollThumb(ThumbLook::Default));
        let animator = Animator::new(
            providers.animation.clone(),
            StoryboardTag::visual(control_id),
            ThumbState::Default,
            &[rest],
            false,
        )?;
        let position = ScrollPosition::new(providers.animation.clone(), info.pos)?;

        self.base.subclass(
            &providers,
            &[window, config.static_window],
            RegistryEntry::new(this),
        )?;
        self.base.associate(window, control_id, config.base);
        self.animator = Some(animator);
        self.position = Some(position);
        self.decoration = config.static_window;
        self.target = config.target;
        self.smooth = config.smooth;
        self.line_step = config
            .line_step
            .unwrap_or(providers.settings.scroll.line_step);

        if let Err(err) = self.create_device_resources() {
            tracing::error!(target: targets::SCROLLBAR, %window, error = %err, "device resource creation failed");
            self.abandon(&providers);
            return Err(err);
        }
        tracing::debug!(target: targets::SCROLLBAR, %window, ?info, smooth = self.smooth, "scrollbar associated");
        Ok(())
    }

    pub fn state(&self) -> ThumbState {
        self.animator
            .as_ref()
            .map_or(ThumbState::Default, Animator::state)
    }

    pub fn static_window(&self) -> WindowHandle {
        self.decoration
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether a smooth scroll is in flight.
    pub fn is_scrolling(&self) -> bool {
        self.smooth_target.is_some()
    }

    pub fn position_changed(&self) -> &Signal<i32> {
        &self.position_changed
    }

    /// The native scrollbar's range and position.
    pub fn scroll_info(&self) -> WidgetResult<ScrollInfo> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        Ok(providers.host.scroll_info(self.base.window())?)
    }

    pub fn position(&self) -> WidgetResult<i32> {
        Ok(self.scroll_info()?.pos)
    }

    /// The thumb's rectangle in decoration window coordinates.
    pub fn thumb_rect(&self) -> WidgetResult<Rect> {
        let providers = self.base.providers()?;
        let info = self.scroll_info()?;
        let track = providers.host.client_rect(self.decoration)?;
        Ok(thumb_rect(track, &info))
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Scroll by `delta` units immediately. Returns the new position.
    pub fn scroll_window_by_amount(&mut self, delta: i32) -> WidgetResult<i32> {
        let info = self.scroll_info()?;
        self.scroll_window_by_pos(info.pos.saturating_add(delta))
    }

    /// Scroll to `target` immediately, clamped to `[min, max - page]`.
    ///
    /// The scroll target window is scrolled by the distance actually
    /// covered; nothing is forwarded when the position does not change.
    /// Returns the new position.
    pub fn scroll_window_by_pos(&mut self, target: i32) -> WidgetResult<i32> {
        let providers = self.base.providers()?;
        let info = self.scroll_info()?;
        let pos = info.clamp(target);
        if pos == info.pos {
            return Ok(pos);
        }
        let host = providers.host.as_ref();
        host.scroll_window(self.target, pos - info.pos)?;
        host.set_scroll_pos(self.base.window(), pos)?;
        host.invalidate(self.decoration);
        tracing::trace!(target: targets::SCROLLBAR, window = %self.base.window(), from = info.pos, to = pos, "scrolled");
        self.position_changed.emit(pos);
        Ok(pos)
    }

    /// Scroll by `delta` units, animated at a speed that grows with the
    /// remaining distance.
    ///
    /// Deltas accumulate onto a scroll already in flight; reversing its
    /// direction speeds the animation up.
    pub fn scroll_window_by_amount_smooth(&mut self, delta: i32) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let info = self.scroll_info()?;
        let from = self.smooth_target.unwrap_or(info.pos);
        let target = info.clamp(from.saturating_add(delta));
        if target == info.pos && self.smooth_target.is_none() {
            return Ok(());
        }
        let reversing = self
            .smooth_target
            .is_some_and(|end| (end - info.pos).signum() * delta.signum() < 0);
        let speed = providers
            .settings
            .scroll
            .speed_for(f64::from(target - info.pos), reversing);
        self.start_smooth_scroll(
            &providers,
            info.pos,
            target,
            TransitionSpec::LinearFromSpeed {
                speed,
                final_value: f64::from(target),
            },
        )
    }

    /// Scroll to `target` with an eased animation lasting `duration`.
    pub fn scroll_window_by_pos_smooth(&mut self, target: i32, duration: Duration) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let info = self.scroll_info()?;
        let target = info.clamp(target);
        self.start_smooth_scroll(
            &providers,
            info.pos,
            target,
            TransitionSpec::eased(duration, f64::from(target)),
        )
    }

    /// Snap the position variable to `current`, then run `transition`.
    fn start_smooth_scroll(
        &mut self,
        providers: &Providers,
        current: i32,
        target: i32,
        transition: TransitionSpec,
    ) -> WidgetResult<()> {
        let position = self.position.as_ref().ok_or(WidgetError::NotAssociated)?;
        let engine = providers.animation.as_ref();
        let mut storyboard = engine.create_storyboard()?;
        storyboard.add_transition(
            position.variable,
            TransitionSpec::Instantaneous {
                final_value: f64::from(current),
            },
        )?;
        storyboard.add_transition(position.variable, transition)?;
        storyboard.set_tag(StoryboardTag::scroll(self.base.control_id()));
        engine.schedule(storyboard, engine.now())?;
        timer::start_widget_timer(
            providers.host.as_ref(),
            self.decoration,
            SCROLL_TIMER,
            &providers.settings,
        )?;
        self.smooth_target = Some(target);
        tracing::trace!(target: targets::SCROLLBAR, window = %self.base.window(), current, target, "smooth scroll started");
        Ok(())
    }

    /// Apply the animated position; stop the timer once the storyboard
    /// finished.
    fn on_scroll_timer(&mut self, providers: &Providers) -> WidgetResult<()> {
        let position = self.position.as_ref().ok_or(WidgetError::NotAssociated)?;
        let value = position.value()?;
        let result = self.scroll_window_by_pos(value).map(|_| ());
        let running = timer::poll_storyboard(
            providers.animation.as_ref(),
            providers.host.as_ref(),
            self.decoration,
            SCROLL_TIMER,
            StoryboardTag::scroll(self.base.control_id()),
        );
        if !running {
            self.smooth_target = None;
        }
        result
    }

    fn stop_smooth_scroll(&mut self, providers: &Providers) {
        if self.smooth_target.take().is_some() {
            timer::stop_widget_timer(providers.host.as_ref(), self.decoration, SCROLL_TIMER);
        }
    }

    /// Scroll to `target`, animated if the scrollbar is smooth.
    fn scroll_to(&mut self, providers: &Providers, target: i32) -> WidgetResult<()> {
        if self.smooth {
            self.scroll_window_by_pos_smooth(target, providers.settings.scroll.smooth_duration())
        } else {
            self.scroll_window_by_pos(target).map(|_| ())
        }
    }

    fn on_wheel(&mut self, providers: &Providers, notches: i32) -> WidgetResult<()> {
        let lines = i32::try_from(providers.settings.scroll.wheel_lines).unwrap_or(i32::MAX);
        let delta = notches
            .saturating_neg()
            .saturating_mul(lines)
            .saturating_mul(self.line_step);
        if self.smooth {
            self.scroll_window_by_amount_smooth(delta)
        } else {
            self.scroll_window_by_amount(delta).map(|_| ())
        }
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    fn transition(&mut self, state: ThumbState) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let target = StateTarget::colors([providers
            .theme
            .color(ColorRole::ScrollThumb(state.look()))]);
        let skip = self.base.config().skip;
        let decoration = self.decoration;
        let animator = self.animator.as_mut().ok_or(WidgetError::NotAssociated)?;
        animator.start(&providers, decoration, &skip, state, &target)
    }

    fn on_mouse_move(&mut self, providers: &Providers, at: Point) -> WidgetResult<()> {
        if let Some(drag) = self.drag {
            let info = self.scroll_info()?;
            let track = providers.host.client_rect(self.decoration)?;
            let pos = position_at(track, &info, at.y - drag.grab);
            return self.scroll_window_by_pos(pos).map(|_| ());
        }
        if self.pointer.hovered {
            return Ok(());
        }
        self.pointer.hovered = true;
        providers.host.track_mouse_leave(self.decoration);
        self.transition(ThumbState::Hover)
    }

    fn on_mouse_leave(&mut self) -> WidgetResult<()> {
        self.pointer.hovered = false;
        if self.drag.is_some() {
            return Ok(());
        }
        self.transition(ThumbState::Default)
    }

    /// Start a drag on the thumb, or jump to the clicked offset.
    fn on_button_down(&mut self, providers: &Providers, at: Point) -> WidgetResult<()> {
        let info = self.scroll_info()?;
        let track = providers.host.client_rect(self.decoration)?;
        let thumb = thumb_rect(track, &info);
        if thumb.contains(at) {
            self.stop_smooth_scroll(providers);
            self.drag = Some(Drag {
                grab: at.y - thumb.top(),
            });
            self.pointer.pressed = true;
            providers.host.set_capture(self.decoration);
            return self.transition(ThumbState::Dragging);
        }
        let pos = position_at(track, &info, at.y - thumb.height() / 2.0);
        self.scroll_to(providers, pos)
    }

    fn on_button_up(&mut self, providers: &Providers) -> WidgetResult<()> {
        if self.drag.take().is_none() {
            return Ok(());
        }
        self.pointer.pressed = false;
        providers.host.release_capture();
        self.transition(if self.pointer.hovered {
            ThumbState::Hover
        } else {
            ThumbState::Default
        })
    }

    // =========================================================================
    // Painting
    // =========================================================================

    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.device_resources(&providers)?;
        Ok(())
    }

    pub fn release_shared_device_resources(system: &SubclassSystem) {
        system.shared_resources().release::<ScrollbarResources>();
    }

    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let color = self
            .animator
            .as_ref()
            .ok_or(WidgetError::NotAssociated)?
            .color(0)?;
        let info = self.scroll_info()?;
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |scrollbar| scrollbar.draw(&providers, color, &info),
            |scrollbar| {
                scrollbar.release_instance_resources();
                scrollbar
                    .base
                    .system()
                    .shared_resources()
                    .release::<ScrollbarResources>();
                Ok(())
            },
        )
    }

    fn device_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, Arc<Brush>)> {
        let theme = providers.theme.as_ref();
        let surface = self.surface.get_or_bind(providers, self.decoration)?;
        let thumb = self
            .thumb
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let track = self.shared.track.get_or_try_create(|| {
            tracing::debug!(target: targets::SCROLLBAR, "creating shared track brush");
            surface.create_solid_brush(theme.color(ColorRole::ScrollTrack))
        })?;
        Ok((surface, thumb, track))
    }

    fn draw(&mut self, providers: &Providers, thumb_color: Color, info: &ScrollInfo) -> WidgetResult<()> {
        let background = self.base.background(providers);
        let (surface, thumb, track) = self.device_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        surface.clear(background);
        surface.fill_rect(bounds, &track);
        let body = thumb_rect(bounds, info).deflate(THUMB_INSET);
        thumb.set_color(thumb_color);
        surface.fill_round_rect(RoundedRect::new(body, body.width() / 2.0), thumb);
        surface.end_draw()?;
        Ok(())
    }

    fn release_instance_resources(&mut self) {
        self.surface.release();
        self.thumb.release();
    }

    fn abandon(&mut self, providers: &Providers) {
        if self.drag.take().is_some() {
            providers.host.release_capture();
        }
        self.base.reset(providers.host.as_ref());
        self.animator = None;
        self.position = None;
        self.pointer = PointerState::default();
        self.smooth_target = None;
        self.decoration = WindowHandle::NULL;
        self.target = WindowHandle::NULL;
        self.release_instance_resources();
    }
}

impl SubclassWidget for ScrollbarWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Scrollbar
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        let Ok(providers) = self.base.providers() else {
            return MessageResult::Default;
        };
        let outcome = match *message {
            Message::Destroy => {
                self.abandon(&providers);
                return MessageResult::Handled(0);
            }
            Message::Size(_) => {
                if let Err(err) = self.refresh() {
                    tracing::warn!(target: targets::SCROLLBAR, %window, error = %err, "resize failed");
                }
                return MessageResult::Default;
            }
            Message::MouseWheel(notches) => self.on_wheel(&providers, notches),
            _ if window != self.decoration => return MessageResult::Default,
            Message::EraseBackground => return MessageResult::Handled(1),
            Message::Paint => return paint_result(WidgetKind::Scrollbar, window, self.paint()),
            Message::Timer(ANIMATION_TIMER) => {
                if let Some(animator) = &mut self.animator {
                    animator.on_timer(&providers, window);
                }
                Ok(())
            }
            Message::Timer(SCROLL_TIMER) => self.on_scroll_timer(&providers),
            Message::MouseMove(at) => self.on_mouse_move(&providers, at),
            Message::MouseLeave => self.on_mouse_leave(),
            Message::LeftButtonDown(at) => self.on_button_down(&providers, at),
            Message::LeftButtonUp(_) => self.on_button_up(&providers),
            _ => return MessageResult::Default,
        };
        input_result(WidgetKind::Scrollbar, window, Some(outcome))
    }

    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        self.release_instance_resources();
        self.device_resources(&providers)?;
        self.transition(self.state())?;
        providers.host.invalidate(self.decoration);
        Ok(())
    }
}
