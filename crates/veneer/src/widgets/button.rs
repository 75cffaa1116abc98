//! Push button widget.
//!
//! [`ButtonWidget`] owner-draws a native push button: a rounded body whose
//! fill, border and caption colors animate between the default, hover and
//! pressed looks, and a focus ring that fades in and out with keyboard
//! focus.
//!
//! # Signals
//!
//! - `activated()`: Emitted when the button is clicked or activated from the
//!   keyboard, after the parent was notified
//!
//! # Example
//!
//! ```ignore
//! let button = ButtonWidget::new(&system)?;
//! button.lock().set_window(ok, SubclassConfig::default())?;
//! button.lock().activated().connect(|()| println!("OK"));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{Signal, WindowHandle};
use veneer_render::{
    Brush, FontWeight, PaintReport, SharedResource, SharedResourceSet, TextFormat, TextFormatSpec,
    UniqueResource, paint_with_recovery,
};
use veneer_style::ColorRole;

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::message::{Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::{
    Interactive, PointerState, StateMap, SubclassWidget, WidgetBase, WidgetKind, drive,
};
use crate::widgets::abstract_button::{AbstractButton, ButtonFrame, ButtonState, FocusRingSet};
use crate::widgets::{input_result, paint_result};

/// Caption size as a fraction of the button height.
const CAPTION_SCALE: f32 = 0.45;

/// Resources shared by every push button.
#[derive(Default)]
pub(crate) struct ButtonResources {
    focus_ring: SharedResource<Mutex<Brush>>,
}

impl SharedResourceSet for ButtonResources {
    fn release(&self) {
        self.focus_ring.release();
    }
}

impl FocusRingSet for ButtonResources {
    fn focus_ring(&self) -> &SharedResource<Mutex<Brush>> {
        &self.focus_ring
    }
}

/// An owner-drawn push button.
pub struct ButtonWidget {
    button: AbstractButton<ButtonResources>,
    caption_format: UniqueResource<TextFormat>,
    this: Weak<Mutex<Self>>,
}

impl ButtonWidget {
    /// Create a button on `system`.
    ///
    /// Fails with [`WidgetError::NotInitialized`] before
    /// [`SubclassSystem::initialize`].
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let button = AbstractButton::new(system, WidgetKind::Button, ColorRole::Button)?;
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                button,
                caption_format: UniqueResource::new(),
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a native push button.
    ///
    /// May succeed only once. On failure nothing stays subclassed and the
    /// widget can be associated again.
    pub fn set_window(&mut self, window: WindowHandle, config: SubclassConfig) -> WidgetResult<()> {
        let providers = self.button.base.providers()?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;
        self.button
            .associate(&providers, window, config, RegistryEntry::new(this))?;
        if let Err(err) = self.create_device_resources() {
            tracing::error!(target: targets::BUTTON, %window, error = %err, "device resource creation failed");
            self.button.abandon(&providers);
            return Err(err);
        }
        Ok(())
    }

    pub fn state(&self) -> ButtonState {
        self.button.state()
    }

    pub fn is_hovered(&self) -> bool {
        self.button.pointer.hovered
    }

    pub fn activated(&self) -> &Signal<()> {
        self.button.activated()
    }

    /// Create the surface and every resource a paint needs.
    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.button.base.providers()?;
        self.button.create_device_resources(&providers)?;
        self.caption_format(&providers)?;
        Ok(())
    }

    /// Release the resources every push button shares. The next paint of
    /// any button recreates them.
    pub fn release_shared_device_resources(system: &SubclassSystem) {
        system.shared_resources().release::<ButtonResources>();
    }

    /// Paint the current animation frame, rebuilding resources on device
    /// loss.
    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.button.base.providers()?;
        let colors = self.button.frame_colors()?;
        let caption = providers.host.window_text(self.button.base.window())?;
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |button| button.draw(&providers, &colors, &caption),
            |button| {
                button.rebuild();
                Ok(())
            },
        )
    }

    fn draw(&mut self, providers: &Providers, colors: &ButtonFrame, caption: &str) -> WidgetResult<()> {
        let format = self.caption_format(providers)?;
        self.button.draw_frame(providers, colors, |surface, brush, body| {
            brush.set_color(colors.content);
            surface.draw_text(caption, &format, body, brush);
        })
    }

    fn rebuild(&mut self) {
        self.button.release_device_resources();
        self.caption_format.release();
    }

    fn caption_format(&mut self, providers: &Providers) -> WidgetResult<TextFormat> {
        let height = providers.host.client_rect(self.button.base.window())?.height();
        let size = self.button.base.config().text_scale.font_size(height, CAPTION_SCALE);
        let format = self.caption_format.get_or_try_create(|| {
            let spec = TextFormatSpec::new(providers.theme.font_family(), size)
                .with_weight(FontWeight::SEMI_BOLD);
            providers.graphics.create_text_format(&spec)
        })?;
        Ok(format.clone())
    }
}

impl Interactive for ButtonWidget {
    type State = ButtonState;

    fn input_window(&self) -> WindowHandle {
        self.button.base.window()
    }

    fn pointer(&mut self) -> &mut PointerState {
        &mut self.button.pointer
    }

    fn state_map(&self) -> StateMap<ButtonState> {
        ButtonState::MAP
    }

    fn transition(&mut self, state: ButtonState) -> WidgetResult<()> {
        self.button.transition(state)
    }

    fn on_activate(&mut self) -> WidgetResult<()> {
        self.button.activate()
    }
}

impl SubclassWidget for ButtonWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Button
    }

    fn base(&self) -> &WidgetBase {
        &self.button.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        if let Some(result) = self.button.handle_common(message) {
            if matches!(message, Message::Destroy) {
                self.caption_format.release();
            }
            return result;
        }
        match message {
            Message::Paint => paint_result(WidgetKind::Button, window, self.paint()),
            Message::Size(_) => {
                self.caption_format.release();
                if let Err(err) = self.button.refresh() {
                    tracing::warn!(target: targets::BUTTON, %window, error = %err, "resize failed");
                }
                MessageResult::Handled(0)
            }
            _ => {
                let Ok(providers) = self.button.base.providers() else {
                    return MessageResult::Default;
                };
                let outcome = drive(self, providers.host.as_ref(), message);
                input_result(WidgetKind::Button, window, outcome)
            }
        }
    }

    fn refresh(&mut self) -> WidgetResult<()> {
        self.caption_format.release();
        self.button.refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimationSkip, TextScaleLimits};
    use crate::host::{Notification, WindowClass};
    use crate::test_support::Harness;
    use crate::widget::timer::ANIMATION_TIMER;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use veneer_render::{DrawCommand, Point, Rect, RenderError};
    use veneer_style::{ButtonLook, Part};

    fn setup() -> (Harness, Arc<Mutex<ButtonWidget>>, WindowHandle) {
        let h = Harness::new();
        let window = h.host.add_push_button(100, "OK");
        let button = ButtonWidget::new(&h.system).unwrap();
        button
            .lock()
            .set_window(window, SubclassConfig::default())
            .unwrap();
        (h, button, window)
    }

    #[test]
    fn test_set_window_registers_and_creates_variables() {
        let (h, button, window) = setup();
        assert!(h.host.is_subclassed(window));
        assert_eq!(button.lock().window(), window);
        assert_eq!(button.lock().control_id(), 100);
        // Three colors of three channels plus the focus opacity.
        assert_eq!(h.engine.variable_count(), 10);
        assert!(h.system.subclass_as::<ButtonWidget>(window).is_some());
    }

    #[test]
    fn test_set_window_twice_fails() {
        let (h, button, window) = setup();
        let other = h.host.add_push_button(101, "Cancel");
        let err = button
            .lock()
            .set_window(other, SubclassConfig::default())
            .unwrap_err();
        assert_eq!(err, WidgetError::AlreadyAssociated(window));
        assert_eq!(button.lock().window(), window);
        assert!(!h.host.is_subclassed(other));
    }

    #[test]
    fn test_rejects_wrong_class_and_dead_windows() {
        let h = Harness::new();
        let button = ButtonWidget::new(&h.system).unwrap();
        let label = h.host.add_static(5, Rect::new(0.0, 0.0, 50.0, 20.0), "x");

        let err = button
            .lock()
            .set_window(label, SubclassConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            WidgetError::WrongWindowClass { found: WindowClass::Static, .. }
        ));

        let err = button
            .lock()
            .set_window(WindowHandle::NULL, SubclassConfig::default())
            .unwrap_err();
        assert_eq!(err, WidgetError::InvalidWindow(WindowHandle::NULL));
        assert!(!button.lock().is_associated());
        assert_eq!(h.engine.variable_count(), 0);
    }

    #[test]
    fn test_failed_subclass_leaves_widget_reusable() {
        let h = Harness::new();
        let button = ButtonWidget::new(&h.system).unwrap();
        let window = h.host.add_push_button(100, "OK");
        h.host.fail_subclass(window);
        assert!(button.lock().set_window(window, SubclassConfig::default()).is_err());
        assert_eq!(h.system.registered_count(), 0);
        assert_eq!(h.engine.variable_count(), 0);

        let other = h.host.add_push_button(101, "Retry");
        button
            .lock()
            .set_window(other, SubclassConfig::default())
            .unwrap();
    }

    #[test]
    fn test_hover_press_release_activates_once() {
        let (h, button, window) = setup();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        button.lock().activated().connect(move |()| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let at = Point::new(10.0, 10.0);
        h.send(window, Message::MouseMove(at));
        assert_eq!(button.lock().state(), ButtonState::Hover);
        assert!(button.lock().is_hovered());
        h.send(window, Message::LeftButtonDown(at));
        assert_eq!(button.lock().state(), ButtonState::Active);
        h.send(window, Message::LeftButtonUp(at));
        assert_eq!(button.lock().state(), ButtonState::Hover);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(h.host.notifications(), vec![(window, Notification::Activated)]);
    }

    #[test]
    fn test_animation_reaches_hover_colors_and_timer_stops() {
        let (h, button, window) = setup();
        h.send(window, Message::MouseMove(Point::new(1.0, 1.0)));
        assert!(h.host.timer_armed(window, ANIMATION_TIMER));

        h.settle();
        assert!(!h.host.timer_armed(window, ANIMATION_TIMER));
        assert!(h.host.invalidation_count(window) > 0);

        let hover = h.theme().color(ColorRole::Button(ButtonLook::Hover, Part::Fill));
        let colors = button.lock().button.frame_colors().unwrap();
        assert_eq!(colors.fill.to_rgb8(), hover.to_rgb8());
    }

    #[test]
    fn test_short_focus_storyboard_keeps_timer_for_colors() {
        let h = Harness::new();
        let window = h.host.add_push_button(100, "OK");
        let button = ButtonWidget::new(&h.system).unwrap();
        let skip = AnimationSkip {
            focus: true,
            ..AnimationSkip::default()
        };
        button
            .lock()
            .set_window(window, SubclassConfig::default().with_skip(skip))
            .unwrap();

        h.send(window, Message::MouseMove(Point::new(1.0, 1.0)));
        h.send(window, Message::SetFocus);
        h.advance(10);
        h.tick_timers();
        assert!(h.host.timer_armed(window, ANIMATION_TIMER));

        h.settle();
        let hover = h.theme().color(ColorRole::Button(ButtonLook::Hover, Part::Fill));
        let colors = button.lock().button.frame_colors().unwrap();
        assert_eq!(colors.fill.to_rgb8(), hover.to_rgb8());
        assert_eq!(colors.focus, 1.0);
    }

    #[test]
    fn test_skipped_phase_snaps_to_target() {
        let h = Harness::new();
        let window = h.host.add_push_button(100, "OK");
        let button = ButtonWidget::new(&h.system).unwrap();
        button
            .lock()
            .set_window(window, SubclassConfig::default().with_skip(AnimationSkip::ALL))
            .unwrap();

        h.send(window, Message::MouseMove(Point::new(1.0, 1.0)));
        assert_eq!(button.lock().state(), ButtonState::Hover);
        let hover = h.theme().color(ColorRole::Button(ButtonLook::Hover, Part::Border));
        let colors = button.lock().button.frame_colors().unwrap();
        assert_eq!(colors.border.to_rgb8(), hover.to_rgb8());
    }

    #[test]
    fn test_failed_transition_keeps_state() {
        let (h, button, window) = setup();
        h.engine.fail_schedules(true);
        h.send(window, Message::MouseMove(Point::new(1.0, 1.0)));
        assert_eq!(button.lock().state(), ButtonState::Default);

        h.engine.fail_schedules(false);
        h.host.fail_timers(true);
        h.send(window, Message::SetFocus);
        assert_eq!(button.lock().state(), ButtonState::Default);
    }

    #[test]
    fn test_paint_draws_caption() {
        let (h, button, window) = setup();
        h.send(window, Message::Paint);
        let frame = h.graphics.last_frame(window).unwrap();
        let caption = frame.iter().find_map(|command| match command {
            DrawCommand::Text { text, font_size, .. } => Some((text.clone(), *font_size)),
            _ => None,
        });
        let expected = TextScaleLimits::default().font_size(32.0, CAPTION_SCALE);
        assert_eq!(caption, Some(("OK".to_string(), expected)));
        assert_eq!(button.lock().paint().unwrap().attempts, 1);
    }

    #[test]
    fn test_focus_ring_only_when_focused() {
        let (h, _button, window) = setup();
        let strokes = |h: &Harness| {
            h.graphics
                .last_frame(window)
                .unwrap()
                .iter()
                .filter(|c| matches!(c, DrawCommand::DrawRoundRect { .. }))
                .count()
        };
        h.send(window, Message::Paint);
        assert_eq!(strokes(&h), 1);

        h.send(window, Message::SetFocus);
        h.settle();
        h.send(window, Message::Paint);
        assert_eq!(strokes(&h), 2);
    }

    #[test]
    fn test_device_loss_is_recovered() {
        let (h, button, _window) = setup();
        h.graphics.fail_end_draws(3);
        let report = button.lock().paint().unwrap();
        assert_eq!(report.attempts, 4);
        assert_eq!(report.rebuilds, 3);
    }

    #[test]
    fn test_device_loss_gives_up_after_cap() {
        let (h, button, _window) = setup();
        h.graphics.fail_end_draws(11);
        let err = button.lock().paint().unwrap_err();
        assert_eq!(
            err,
            WidgetError::Render(RenderError::RecoveryExhausted { attempts: 10 })
        );
    }

    #[test]
    fn test_shared_focus_ring_recreated_once() {
        let h = Harness::new();
        let buttons: Vec<_> = (0..3)
            .map(|i| {
                let window = h.host.add_push_button(100 + i, "B");
                let button = ButtonWidget::new(&h.system).unwrap();
                button
                    .lock()
                    .set_window(window, SubclassConfig::default())
                    .unwrap();
                button
            })
            .collect();
        let shared = h.system.shared_resources().get_or_insert::<ButtonResources>();
        assert_eq!(shared.focus_ring().creation_count(), 1);

        ButtonWidget::release_shared_device_resources(&h.system);
        assert!(!shared.focus_ring().is_created());
        for button in &buttons {
            button.lock().create_device_resources().unwrap();
        }
        assert_eq!(shared.focus_ring().creation_count(), 2);
    }

    #[test]
    fn test_destroy_unregisters() {
        let (h, button, window) = setup();
        h.send(window, Message::MouseMove(Point::new(1.0, 1.0)));
        assert_eq!(h.send(window, Message::Destroy), MessageResult::Handled(0));
        assert!(!h.host.is_subclassed(window));
        assert_eq!(h.system.registered_count(), 0);
        assert!(h.host.armed_timers().is_empty());
        assert!(!button.lock().is_associated());
        assert_eq!(h.engine.variable_count(), 0);
        assert_eq!(h.send(window, Message::Paint), MessageResult::Default);
    }

    #[test]
    fn test_suppressed_and_dialog_messages() {
        let (h, _button, window) = setup();
        assert_eq!(h.send(window, Message::EraseBackground), MessageResult::Handled(1));
        assert_eq!(
            h.send(window, Message::GetDialogCode),
            MessageResult::Handled(crate::message::DLGC_WANT_ALL_KEYS)
        );
    }

    #[test]
    fn test_resize_rebuilds_caption_format() {
        let (h, button, window) = setup();
        h.send(window, Message::Paint);
        h.host.set_client_rect(window, Rect::new(0.0, 0.0, 120.0, 40.0));
        h.send(window, Message::Size(veneer_render::Size::new(120.0, 40.0)));
        h.send(window, Message::Paint);
        let expected = TextScaleLimits::default().font_size(40.0, CAPTION_SCALE);
        let frame = h.graphics.last_frame(window).unwrap();
        assert!(frame.iter().any(|c| matches!(
            c,
            DrawCommand::Text { font_size, .. } if *font_size == expected
        )));
        assert_eq!(button.lock().state(), ButtonState::Default);
    }
}
