//! Radio button widget.
//!
//! A [`RadioButtonWidget`] owner-draws a native radio button: a round
//! indicator whose fill, outline and check mark animate through eight
//! states, followed by the window text as caption.
//!
//! Selection is orthogonal to hover and press. The `selected` flag picks the
//! `Selected*` variant of every input-driven state, and only a
//! [`RadioGroup`] changes it for other members. A radio button must belong
//! to a group before it can be activated.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{Signal, StoryboardTag, WindowHandle};
use veneer_render::{
    Brush, Color, DrawSurface, FontWeight, HorizontalAlign, PaintReport, Rect, RoundedRect,
    SharedResource, SharedResourceSet, TextFormat, TextFormatSpec, UniqueResource,
    paint_with_recovery,
};
use veneer_style::{ColorRole, Part, RadioLook};

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{Notification, WindowClass};
use crate::message::{DLGC_WANT_ALL_KEYS, Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::check_class;
use crate::widget::timer::ANIMATION_TIMER;
use crate::widget::{
    Animator, Interactive, Phase, PointerState, StateMap, StateTarget, SubclassWidget,
    SurfaceSlot, VisualState, WidgetBase, WidgetKind, drive,
};
use crate::widgets::RadioGroup;
use crate::widgets::{input_result, paint_result};

const FILL: usize = 0;
const BORDER: usize = 1;
const CHECK: usize = 2;

/// Indicator diameter as a fraction of the control height.
const INDICATOR_SCALE: f32 = 0.7;
const CAPTION_SCALE: f32 = 0.55;
const CAPTION_GAP: f32 = 6.0;

/// Visual states of a radio button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioState {
    Default,
    Hover,
    Down,
    Selected,
    SelectedHover,
    SelectedDown,
    Focus,
    FocusLost,
}

impl VisualState for RadioState {
    fn phase(self) -> Phase {
        match self {
            RadioState::Default => Phase::Default,
            RadioState::Hover | RadioState::SelectedHover => Phase::Hover,
            RadioState::Down | RadioState::SelectedDown => Phase::Active,
            RadioState::Selected => Phase::Selected,
            RadioState::Focus | RadioState::FocusLost => Phase::Focus,
        }
    }
}

impl RadioState {
    fn look(self) -> Option<RadioLook> {
        match self {
            RadioState::Default => Some(RadioLook::Default),
            RadioState::Hover => Some(RadioLook::Hover),
            RadioState::Down => Some(RadioLook::Down),
            RadioState::Selected => Some(RadioLook::Selected),
            RadioState::SelectedHover => Some(RadioLook::SelectedHover),
            RadioState::SelectedDown => Some(RadioLook::SelectedDown),
            RadioState::Focus | RadioState::FocusLost => None,
        }
    }
}

#[derive(Default)]
pub(crate) struct RadioResources {
    focus_ring: SharedResource<Mutex<Brush>>,
}

impl SharedResourceSet for RadioResources {
    fn release(&self) {
        self.focus_ring.release();
    }
}

/// An owner-drawn radio button.
pub struct RadioButtonWidget {
    base: WidgetBase,
    animator: Option<Animator<RadioState>>,
    pointer: PointerState,
    selected: bool,
    group: Weak<RadioGroup>,
    surface: SurfaceSlot,
    brush: UniqueResource<Brush>,
    caption_format: UniqueResource<TextFormat>,
    shared: Arc<RadioResources>,
    activated: Signal<()>,
    this: Weak<Mutex<Self>>,
}

impl RadioButtonWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let base = WidgetBase::new(system, WidgetKind::RadioButton)?;
        let shared = system.shared_resources().get_or_insert::<RadioResources>();
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                base,
                animator: None,
                pointer: PointerState::default(),
                selected: false,
                group: Weak::new(),
                surface: SurfaceSlot::new(),
                brush: UniqueResource::new(),
                caption_format: UniqueResource::new(),
                shared,
                activated: Signal::new(),
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a native radio button.
    pub fn set_window(&mut self, window: WindowHandle, config: SubclassConfig) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.base.check_association(&providers, window, &config)?;
        let host = providers.host.as_ref();
        check_class(host, window, WindowClass::RadioButton, "radio button")?;
        let control_id = host.control_id(window)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;

        let rest = target(&providers, RadioState::Default);
        let initial: Vec<Color> = rest.colors.iter().flatten().copied().collect();
        let animator = Animator::new(
            providers.animation.clone(),
            StoryboardTag::visual(control_id),
            RadioState::Default,
            &initial,
            true,
        )?;

        self.base.subclass(&providers, &[window], RegistryEntry::new(this))?;
        self.base.associate(window, control_id, config);
        self.animator = Some(animator);
        if let Err(err) = self.create_device_resources() {
            tracing::error!(target: targets::RADIO, %window, error = %err, "device resource creation failed");
            self.abandon(&providers);
            return Err(err);
        }
        Ok(())
    }

    pub fn state(&self) -> RadioState {
        self.animator
            .as_ref()
            .map_or(RadioState::Default, Animator::state)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The group this button belongs to.
    pub fn group(&self) -> Option<Arc<RadioGroup>> {
        self.group.upgrade()
    }

    pub fn activated(&self) -> &Signal<()> {
        &self.activated
    }

    /// Set the selection flag.
    ///
    /// Does nothing if the flag already has that value. Deselecting forces
    /// the default state at once; selecting only flips the flag, and the
    /// next input-driven transition picks a `Selected*` state.
    pub fn update_selection_state(&mut self, selected: bool) -> WidgetResult<()> {
        if self.selected == selected {
            return Ok(());
        }
        self.selected = selected;
        tracing::debug!(target: targets::RADIO, window = %self.base.window(), selected, "selection changed");
        if selected {
            Ok(())
        } else {
            self.transition(RadioState::Default)
        }
    }

    pub(crate) fn join_group(&mut self, group: Weak<RadioGroup>) {
        self.group = group;
    }

    pub(crate) fn leave_group(&mut self) {
        self.group = Weak::new();
    }

    pub(crate) fn has_group(&self) -> bool {
        self.group.strong_count() > 0
    }

    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.device_resources(&providers)?;
        Ok(())
    }

    pub fn release_shared_device_resources(system: &SubclassSystem) {
        system.shared_resources().release::<RadioResources>();
    }

    // =========================================================================
    // Painting
    // =========================================================================

    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let animator = self.animator.as_ref().ok_or(WidgetError::NotAssociated)?;
        let frame = RadioFrame {
            fill: animator.color(FILL)?,
            border: animator.color(BORDER)?,
            check: animator.color(CHECK)?,
            focus: animator.focus_opacity()?,
            caption: providers.host.window_text(self.base.window())?,
        };
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |radio| radio.draw(&providers, &frame),
            |radio| {
                radio.release_instance_resources();
                radio.base.system().shared_resources().release::<RadioResources>();
                Ok(())
            },
        )
    }

    #[allow(clippy::type_complexity)]
    fn device_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, TextFormat, Arc<Mutex<Brush>>)> {
        let theme = providers.theme.as_ref();
        let window = self.base.window();
        let height = providers.host.client_rect(window)?.height();
        let size = self.base.config().text_scale.font_size(height, CAPTION_SCALE);
        let format = self
            .caption_format
            .get_or_try_create(|| {
                let spec = TextFormatSpec::new(theme.font_family(), size)
                    .with_align(HorizontalAlign::Left)
                    .with_weight(FontWeight::NORMAL);
                providers.graphics.create_text_format(&spec)
            })?
            .clone();
        let surface = self.surface.get_or_bind(providers, window)?;
        let brush = self
            .brush
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let ring = self.shared.focus_ring.get_or_try_create(|| {
            tracing::debug!(target: targets::RADIO, "creating shared focus ring brush");
            surface
                .create_solid_brush(theme.color(ColorRole::FocusRing))
                .map(Mutex::new)
        })?;
        Ok((surface, brush, format, ring))
    }

    fn draw(&mut self, providers: &Providers, frame: &RadioFrame) -> WidgetResult<()> {
        let background = self.base.background(providers);
        let caption_color = providers.theme.color(ColorRole::RadioCaption);
        let (surface, brush, format, ring) = self.device_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        let diameter = (bounds.height() * INDICATOR_SCALE).max(1.0);
        let indicator = Rect::new(
            2.0,
            (bounds.height() - diameter) / 2.0,
            diameter,
            diameter,
        );
        let circle = RoundedRect::new(indicator, diameter / 2.0);
        surface.clear(background);

        brush.set_color(frame.fill);
        surface.fill_round_rect(circle, brush);
        brush.set_color(frame.border);
        surface.draw_round_rect(circle, brush, 1.5);
        let dot = indicator.deflate(diameter * 0.3);
        brush.set_color(frame.check);
        surface.fill_round_rect(RoundedRect::new(dot, dot.width() / 2.0), brush);

        let text_left = indicator.right() + CAPTION_GAP;
        let caption = Rect::new(
            text_left,
            0.0,
            (bounds.width() - text_left).max(0.0),
            bounds.height(),
        );
        brush.set_color(caption_color);
        surface.draw_text(&frame.caption, &format, caption, brush);

        if frame.focus > 0.0 {
            let mut ring = ring.lock();
            let color = ring.color().with_alpha(frame.focus as f32);
            ring.set_color(color);
            surface.draw_round_rect(RoundedRect::new(bounds.deflate(0.5), 2.0), &ring, 1.0);
        }
        surface.end_draw()?;
        Ok(())
    }

    fn release_instance_resources(&mut self) {
        self.surface.release();
        self.brush.release();
        self.caption_format.release();
    }

    fn abandon(&mut self, providers: &Providers) {
        if let Some(group) = self.group.upgrade() {
            group.forget(self.base.control_id());
        }
        self.leave_group();
        self.base.reset(providers.host.as_ref());
        self.animator = None;
        self.pointer = PointerState::default();
        self.selected = false;
        self.release_instance_resources();
    }
}

struct RadioFrame {
    fill: Color,
    border: Color,
    check: Color,
    focus: f64,
    caption: String,
}

fn target(providers: &Providers, state: RadioState) -> StateTarget {
    match state.look() {
        Some(look) => {
            let theme = providers.theme.as_ref();
            StateTarget::colors([
                theme.color(ColorRole::Radio(look, Part::Fill)),
                theme.color(ColorRole::Radio(look, Part::Border)),
                theme.color(ColorRole::Radio(look, Part::Text)),
            ])
        }
        None => StateTarget::focus(if state == RadioState::Focus { 1.0 } else { 0.0 }),
    }
}

impl Interactive for RadioButtonWidget {
    type State = RadioState;

    fn input_window(&self) -> WindowHandle {
        self.base.window()
    }

    fn pointer(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    fn state_map(&self) -> StateMap<RadioState> {
        if self.selected {
            StateMap {
                rest: RadioState::Selected,
                hover: RadioState::SelectedHover,
                pressed: RadioState::SelectedDown,
                focus: RadioState::Focus,
                focus_lost: RadioState::FocusLost,
            }
        } else {
            StateMap {
                rest: RadioState::Default,
                hover: RadioState::Hover,
                pressed: RadioState::Down,
                focus: RadioState::Focus,
                focus_lost: RadioState::FocusLost,
            }
        }
    }

    fn transition(&mut self, state: RadioState) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let target = target(&providers, state);
        let window = self.base.window();
        let skip = self.base.config().skip;
        let animator = self.animator.as_mut().ok_or(WidgetError::NotAssociated)?;
        animator.start(&providers, window, &skip, state, &target)
    }

    /// Select this button within its group, then notify.
    ///
    /// Activating an already selected button does nothing.
    fn on_activate(&mut self) -> WidgetResult<()> {
        if self.selected {
            return Ok(());
        }
        let control_id = self.base.control_id();
        let Some(group) = self.group.upgrade() else {
            tracing::error!(target: targets::RADIO, control_id, "radio button activated outside a group");
            return Err(WidgetError::NotInGroup(control_id));
        };
        self.update_selection_state(true)?;
        group.update_radio_state(control_id)?;

        let providers = self.base.providers()?;
        let window = self.base.window();
        providers.host.notify_parent(window, Notification::Activated);
        self.activated.emit(());
        Ok(())
    }
}

impl SubclassWidget for RadioButtonWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::RadioButton
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        let Ok(providers) = self.base.providers() else {
            return MessageResult::Default;
        };
        match *message {
            Message::EraseBackground => MessageResult::Handled(1),
            Message::GetDialogCode => MessageResult::Handled(DLGC_WANT_ALL_KEYS),
            Message::Paint => paint_result(WidgetKind::RadioButton, window, self.paint()),
            Message::Timer(ANIMATION_TIMER) => {
                if let Some(animator) = &mut self.animator {
                    animator.on_timer(&providers, window);
                }
                MessageResult::Handled(0)
            }
            Message::Size(_) => {
                if let Err(err) = self.refresh() {
                    tracing::warn!(target: targets::RADIO, %window, error = %err, "resize failed");
                }
                MessageResult::Handled(0)
            }
            Message::Destroy => {
                self.abandon(&providers);
                MessageResult::Handled(0)
            }
            _ => {
                let outcome = drive(self, providers.host.as_ref(), message);
                input_result(WidgetKind::RadioButton, window, outcome)
            }
        }
    }

    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        self.release_instance_resources();
        self.device_resources(&providers)?;
        self.transition(self.state())?;
        providers.host.invalidate(self.base.window());
        Ok(())
    }
}
