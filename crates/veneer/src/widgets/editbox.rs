//! Edit box widget.
//!
//! An edit box spans two native windows: the rich edit control that owns
//! the text, and a static decoration window behind it that paints the
//! rounded body and border. The border color animates between the default
//! and selected looks as the edit control gains and loses focus.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{StoryboardTag, WindowHandle};
use veneer_render::{
    Brush, Color, DrawSurface, PaintReport, Rect, RoundedRect, SharedResource, SharedResourceSet,
    UniqueResource, paint_with_recovery,
};
use veneer_style::ColorRole;

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{CharFormat, WindowClass};
use crate::message::{Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::{check_class, check_window};
use crate::widget::timer::ANIMATION_TIMER;
use crate::widget::{
    Animator, Phase, StateTarget, SubclassWidget, SurfaceSlot, VisualState, WidgetBase, WidgetKind,
};
use crate::widgets::paint_result;

/// Font size of multi-line edit boxes without an explicit size.
pub const MULTILINE_FONT_SIZE: f32 = 16.0;

/// Font size of single-line edit boxes as a fraction of their height.
const FONT_SCALE: f32 = 0.5;

const BORDER_WIDTH: f32 = 1.5;

/// Configuration of an edit box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditboxConfig {
    /// The static window painted behind the edit control. Required.
    pub static_window: WindowHandle,
    /// Use this font size instead of deriving one.
    pub font_size: Option<f32>,
    pub multiline: bool,
    pub base: SubclassConfig,
}

impl EditboxConfig {
    pub fn new(static_window: WindowHandle) -> Self {
        Self {
            static_window,
            font_size: None,
            multiline: false,
            base: SubclassConfig::default(),
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn with_base(mut self, base: SubclassConfig) -> Self {
        self.base = base;
        self
    }

    fn validate(&self) -> WidgetResult<()> {
        if self.static_window.is_null() {
            return Err(WidgetError::InvalidConfig(
                "an edit box needs a static window".into(),
            ));
        }
        if let Some(size) = self.font_size
            && !(size.is_finite() && size > 0.0)
        {
            return Err(WidgetError::InvalidConfig(format!(
                "font size {size} must be positive"
            )));
        }
        Ok(())
    }
}

/// Visual states of an edit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditState {
    Default,
    Selected,
}

impl VisualState for EditState {
    fn phase(self) -> Phase {
        match self {
            EditState::Default => Phase::Default,
            EditState::Selected => Phase::Selected,
        }
    }
}

/// Brushes every edit box decoration shares.
#[derive(Default)]
pub(crate) struct EditboxResources {
    fill: SharedResource<Brush>,
    border_background: SharedResource<Brush>,
}

impl SharedResourceSet for EditboxResources {
    fn release(&self) {
        self.fill.release();
        self.border_background.release();
    }
}

/// An owner-drawn edit box.
pub struct EditboxWidget {
    base: WidgetBase,
    animator: Option<Animator<EditState>>,
    decoration: WindowHandle,
    font_size: f32,
    surface: SurfaceSlot,
    border: UniqueResource<Brush>,
    shared: Arc<EditboxResources>,
    this: Weak<Mutex<Self>>,
}

impl EditboxWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let base = WidgetBase::new(system, WidgetKind::Editbox)?;
        let shared = system.shared_resources().get_or_insert::<EditboxResources>();
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                base,
                animator: None,
                decoration: WindowHandle::NULL,
                font_size: 0.0,
                surface: SurfaceSlot::new(),
                border: UniqueResource::new(),
                shared,
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a rich edit control and its decoration.
    ///
    /// Computes the font size, applies the character format, subclasses
    /// both windows and creates the border animation.
    pub fn set_window(&mut self, window: WindowHandle, config: EditboxConfig) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.base.check_association(&providers, window, &config.base)?;
        config.validate()?;
        let host = providers.host.as_ref();
        check_class(host, window, WindowClass::Edit, "edit control")?;
        check_window(host, config.static_window)?;
        check_class(host, config.static_window, WindowClass::Static, "static window")?;
        let control_id = host.control_id(window)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;

        let height = host.client_rect(window)?.height();
        let font_size = match config.font_size {
            Some(size) => config.base.text_scale.clamp_size(height, size),
            None if config.multiline => MULTILINE_FONT_SIZE,
            None => config.base.text_scale.font_size(height, FONT_SCALE),
        };
        host.set_char_format(window, &char_format(&providers, font_size))?;

        let rest = providers.theme.color(ColorRole::EditBorder { selected: false });
        let animator = Animator::new(
            providers.animation.clone(),
            StoryboardTag::visual(control_id),
            EditState::Default,
            &[rest],
            false,
        )?;

        self.base.subclass(
            &providers,
            &[window, config.static_window],
            RegistryEntry::new(this),
        )?;
        self.base.associate(window, control_id, config.base);
        self.animator = Some(animator);
        self.decoration = config.static_window;
        self.font_size = font_size;
        tracing::debug!(target: targets::EDITBOX, %window, font_size, "edit box associated");

        if let Err(err) = self.create_device_resources() {
            tracing::error!(target: targets::EDITBOX, %window, error = %err, "device resource creation failed");
            self.abandon(&providers);
            return Err(err);
        }
        Ok(())
    }

    pub fn state(&self) -> EditState {
        self.animator
            .as_ref()
            .map_or(EditState::Default, Animator::state)
    }

    /// The decoration window, or the null handle before `set_window`.
    pub fn static_window(&self) -> WindowHandle {
        self.decoration
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Current contents of the edit control.
    pub fn text(&self) -> WidgetResult<String> {
        let providers = self.base.providers()?;
        Ok(providers.host.window_text(self.base.window())?)
    }

    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.device_resources(&providers)?;
        Ok(())
    }

    pub fn release_shared_device_resources(system: &SubclassSystem) {
        system.shared_resources().release::<EditboxResources>();
    }

    fn transition(&mut self, state: EditState) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let selected = state == EditState::Selected;
        let target = StateTarget::colors([
            providers.theme.color(ColorRole::EditBorder { selected })
        ]);
        let skip = self.base.config().skip;
        let decoration = self.decoration;
        let animator = self.animator.as_mut().ok_or(WidgetError::NotAssociated)?;
        animator.start(&providers, decoration, &skip, state, &target)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let border = self
            .animator
            .as_ref()
            .ok_or(WidgetError::NotAssociated)?
            .color(0)?;
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |edit| edit.draw(&providers, border),
            |edit| {
                edit.release_instance_resources();
                edit.base
                    .system()
                    .shared_resources()
                    .release::<EditboxResources>();
                Ok(())
            },
        )
    }

    #[allow(clippy::type_complexity)]
    fn device_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, Arc<Brush>, Arc<Brush>)> {
        let theme = providers.theme.as_ref();
        let surface = self.surface.get_or_bind(providers, self.decoration)?;
        let border = self
            .border
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let fill = self.shared.fill.get_or_try_create(|| {
            tracing::debug!(target: targets::EDITBOX, "creating shared fill brush");
            surface.create_solid_brush(theme.color(ColorRole::EditFill))
        })?;
        let border_background = self.shared.border_background.get_or_try_create(|| {
            surface.create_solid_brush(theme.color(ColorRole::EditBorderBackground))
        })?;
        Ok((surface, border, fill, border_background))
    }

    fn draw(&mut self, providers: &Providers, border_color: Color) -> WidgetResult<()> {
        let radius = providers.theme.corner_radius();
        let background = self.base.config().background;
        let (surface, border, fill, border_background) = self.device_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        match background {
            Some(color) => surface.clear(color),
            None => surface.fill_rect(bounds, &border_background),
        }
        let body = RoundedRect::new(bounds.deflate(BORDER_WIDTH), radius);
        surface.fill_round_rect(body, &fill);
        border.set_color(border_color);
        surface.draw_round_rect(body, border, BORDER_WIDTH);
        surface.end_draw()?;
        Ok(())
    }

    fn release_instance_resources(&mut self) {
        self.surface.release();
        self.border.release();
    }

    fn abandon(&mut self, providers: &Providers) {
        self.base.reset(providers.host.as_ref());
        self.animator = None;
        self.decoration = WindowHandle::NULL;
        self.release_instance_resources();
    }

    fn on_focus(&mut self, window: WindowHandle, state: EditState) -> MessageResult {
        if let Err(err) = self.transition(state) {
            tracing::warn!(target: targets::EDITBOX, %window, ?state, error = %err, "focus transition failed");
        }
        // The edit control still needs focus messages for its caret.
        MessageResult::Default
    }
}

fn char_format(providers: &Providers, font_size: f32) -> CharFormat {
    let theme = providers.theme.as_ref();
    CharFormat {
        font_family: theme.font_family().to_owned(),
        font_size,
        text_color: theme.color(ColorRole::EditText),
        background: theme.color(ColorRole::EditFill),
    }
}

impl SubclassWidget for EditboxWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Editbox
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        let Ok(providers) = self.base.providers() else {
            return MessageResult::Default;
        };
        let decoration = window == self.decoration;
        match *message {
            Message::Destroy => {
                self.abandon(&providers);
                MessageResult::Handled(0)
            }
            Message::Size(_) => {
                if let Err(err) = self.refresh() {
                    tracing::warn!(target: targets::EDITBOX, %window, error = %err, "resize failed");
                }
                MessageResult::Default
            }
            Message::SetFocus if !decoration => self.on_focus(window, EditState::Selected),
            Message::KillFocus if !decoration => self.on_focus(window, EditState::Default),
            Message::EraseBackground if decoration => MessageResult::Handled(1),
            Message::Paint if decoration => paint_result(WidgetKind::Editbox, window, self.paint()),
            Message::Timer(ANIMATION_TIMER) if decoration => {
                if let Some(animator) = &mut self.animator {
                    animator.on_timer(&providers, window);
                }
                MessageResult::Handled(0)
            }
            _ => MessageResult::Default,
        }
    }

    /// Reapply the character format, rebuild resources and replay the
    /// border state.
    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        let window = self.base.window();
        providers
            .host
            .set_char_format(window, &char_format(&providers, self.font_size))?;
        self.release_instance_resources();
        self.device_resources(&providers)?;
        self.transition(self.state())?;
        providers.host.invalidate(self.decoration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextScaleLimits;
    use crate::test_support::Harness;
    use veneer_render::DrawCommand;
    use veneer_style::Theme;

    fn setup(config: impl FnOnce(WindowHandle) -> EditboxConfig) -> (Harness, Arc<Mutex<EditboxWidget>>, WindowHandle, WindowHandle) {
        let h = Harness::new();
        let (edit, decoration) = h.host.add_edit(30);
        let widget = EditboxWidget::new(&h.system).unwrap();
        widget.lock().set_window(edit, config(decoration)).unwrap();
        (h, widget, edit, decoration)
    }

    #[test]
    fn test_static_window_is_required() {
        let h = Harness::new();
        let (edit, _) = h.host.add_edit(30);
        let widget = EditboxWidget::new(&h.system).unwrap();
        let err = widget
            .lock()
            .set_window(edit, EditboxConfig::new(WindowHandle::NULL))
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig(_)));
        assert!(h.host.char_format(edit).is_none());
    }

    #[test]
    fn test_set_window_twice_fails() {
        let (h, widget, edit, _) = setup(EditboxConfig::new);
        let variables = h.engine.variable_count();
        let (other, other_decoration) = h.host.add_edit(40);
        let err = widget
            .lock()
            .set_window(other, EditboxConfig::new(other_decoration))
            .unwrap_err();
        assert_eq!(err, WidgetError::AlreadyAssociated(edit));
        assert_eq!(widget.lock().base().window(), edit);
        assert!(!h.host.is_subclassed(other));
        assert!(!h.host.is_subclassed(other_decoration));
        assert!(h.host.char_format(other).is_none());
        assert_eq!(h.engine.variable_count(), variables);
    }

    #[test]
    fn test_subclasses_both_windows() {
        let (h, widget, edit, decoration) = setup(EditboxConfig::new);
        assert!(h.host.is_subclassed(edit));
        assert!(h.host.is_subclassed(decoration));
        assert_eq!(widget.lock().base().subclassed_windows(), &[edit, decoration]);
        assert!(h.system.subclass_as::<EditboxWidget>(decoration).is_some());
        // One animated border color.
        assert_eq!(h.engine.variable_count(), 3);
    }

    #[test]
    fn test_font_size_sources() {
        let (h, widget, edit, _) = setup(|d| EditboxConfig::new(d).with_font_size(11.0));
        assert_eq!(widget.lock().font_size(), 11.0);
        assert_eq!(h.host.char_format(edit).unwrap().font_size, 11.0);

        // Explicit sizes still respect the height bounds.
        let (_h, widget, _, _) = setup(|d| EditboxConfig::new(d).with_font_size(40.0));
        assert_eq!(widget.lock().font_size(), 28.0);

        let (_h, widget, _, _) = setup(|d| EditboxConfig::new(d).multiline());
        assert_eq!(widget.lock().font_size(), MULTILINE_FONT_SIZE);

        let (_h, widget, _, _) = setup(EditboxConfig::new);
        let expected = TextScaleLimits::default().font_size(28.0, FONT_SCALE);
        assert_eq!(widget.lock().font_size(), expected);
    }

    #[test]
    fn test_char_format_uses_theme() {
        let (h, _widget, edit, _) = setup(EditboxConfig::new);
        let format = h.host.char_format(edit).unwrap();
        assert_eq!(format.text_color, h.theme().color(ColorRole::EditText));
        assert_eq!(format.background, h.theme().color(ColorRole::EditFill));
    }

    #[test]
    fn test_focus_animates_border() {
        let (h, widget, edit, decoration) = setup(EditboxConfig::new);
        assert_eq!(h.send(edit, Message::SetFocus), MessageResult::Default);
        assert_eq!(widget.lock().state(), EditState::Selected);
        assert!(h.host.timer_armed(decoration, ANIMATION_TIMER));
        h.settle();

        h.send(decoration, Message::Paint);
        let selected = h.theme().color(ColorRole::EditBorder { selected: true });
        let frame = h.graphics.last_frame(decoration).unwrap();
        let stroke = frame
            .iter()
            .find_map(|c| match c {
                DrawCommand::DrawRoundRect { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap();
        assert_eq!(stroke.to_rgb8(), selected.to_rgb8());

        h.send(edit, Message::KillFocus);
        assert_eq!(widget.lock().state(), EditState::Default);
    }

    #[test]
    fn test_shared_brushes_are_reused() {
        let h = Harness::new();
        for id in [30, 40] {
            let (edit, decoration) = h.host.add_edit(id);
            let widget = EditboxWidget::new(&h.system).unwrap();
            widget
                .lock()
                .set_window(edit, EditboxConfig::new(decoration))
                .unwrap();
            h.send(decoration, Message::Paint);
        }
        let shared = h.system.shared_resources().get_or_insert::<EditboxResources>();
        assert_eq!(shared.fill.creation_count(), 1);
        assert_eq!(shared.border_background.creation_count(), 1);

        EditboxWidget::release_shared_device_resources(&h.system);
        assert!(!shared.fill.is_created());
    }

    #[test]
    fn test_theme_change_reapplies_format() {
        let (h, _widget, edit, _) = setup(EditboxConfig::new);
        h.system.apply_theme(Arc::new(Theme::dark())).unwrap();
        let format = h.host.char_format(edit).unwrap();
        assert_eq!(format.text_color, Theme::dark().palette.text);
    }

    #[test]
    fn test_destroy_unregisters_both_windows() {
        let (h, widget, edit, decoration) = setup(EditboxConfig::new);
        h.send(decoration, Message::Destroy);
        assert!(!h.host.is_subclassed(edit));
        assert!(!h.host.is_subclassed(decoration));
        assert!(!widget.lock().is_associated());
    }
}
