//! Abstract button base implementation.
//!
//! This module provides [`AbstractButton`], the shared core of
//! [`ButtonWidget`](super::ButtonWidget) and
//! [`ImageButtonWidget`](super::ImageButtonWidget).
//!
//! # Overview
//!
//! AbstractButton provides common push-button functionality:
//! - Association with a native push button
//! - The five-state visual machine (fill, border and content colors plus a
//!   focus ring)
//! - The chrome of every frame: background, rounded body, border, focus ring
//! - Activation (parent notification and the `activated` signal)
//!
//! Concrete buttons embed it, draw their content in the middle of the frame
//! and own whatever resources that content needs.

use std::sync::Arc;

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{Signal, StoryboardTag, WindowHandle};
use veneer_render::{
    Brush, Color, DrawSurface, Rect, RoundedRect, SharedResource, SharedResourceSet,
    UniqueResource,
};
use veneer_style::{ButtonLook, ColorRole, Part};

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{Notification, WindowClass};
use crate::message::{DLGC_WANT_ALL_KEYS, Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::check_class;
use crate::widget::interaction::{PointerState, StateMap};
use crate::widget::timer::ANIMATION_TIMER;
use crate::widget::{Animator, Phase, StateTarget, SurfaceSlot, VisualState, WidgetBase, WidgetKind};

pub(crate) const FILL: usize = 0;
pub(crate) const BORDER: usize = 1;
pub(crate) const CONTENT: usize = 2;

/// Visual states of push buttons and image buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Default,
    Hover,
    Active,
    Focus,
    FocusLost,
}

impl VisualState for ButtonState {
    fn phase(self) -> Phase {
        match self {
            ButtonState::Default => Phase::Default,
            ButtonState::Hover => Phase::Hover,
            ButtonState::Active => Phase::Active,
            ButtonState::Focus | ButtonState::FocusLost => Phase::Focus,
        }
    }
}

impl ButtonState {
    pub(crate) const MAP: StateMap<ButtonState> = StateMap {
        rest: ButtonState::Default,
        hover: ButtonState::Hover,
        pressed: ButtonState::Active,
        focus: ButtonState::Focus,
        focus_lost: ButtonState::FocusLost,
    };

    fn look(self) -> Option<ButtonLook> {
        match self {
            ButtonState::Default => Some(ButtonLook::Default),
            ButtonState::Hover => Some(ButtonLook::Hover),
            ButtonState::Active => Some(ButtonLook::Active),
            ButtonState::Focus | ButtonState::FocusLost => None,
        }
    }
}

/// A shared resource set holding a focus-ring brush.
pub(crate) trait FocusRingSet: SharedResourceSet + Default {
    fn focus_ring(&self) -> &SharedResource<Mutex<Brush>>;
}

/// Colors of one frame, sampled from the animation variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ButtonFrame {
    pub(crate) fill: Color,
    pub(crate) border: Color,
    pub(crate) content: Color,
    pub(crate) focus: f64,
}

/// Common functionality of push-style buttons.
pub(crate) struct AbstractButton<R: FocusRingSet> {
    pub(crate) base: WidgetBase,
    role: fn(ButtonLook, Part) -> ColorRole,
    animator: Option<Animator<ButtonState>>,
    pub(crate) pointer: PointerState,
    surface: SurfaceSlot,
    brush: UniqueResource<Brush>,
    shared: Arc<R>,
    activated: Signal<()>,
}

impl<R: FocusRingSet> AbstractButton<R> {
    pub(crate) fn new(
        system: &SubclassSystem,
        kind: WidgetKind,
        role: fn(ButtonLook, Part) -> ColorRole,
    ) -> WidgetResult<Self> {
        let base = WidgetBase::new(system, kind)?;
        let shared = system.shared_resources().get_or_insert::<R>();
        Ok(Self {
            base,
            role,
            animator: None,
            pointer: PointerState::default(),
            surface: SurfaceSlot::new(),
            brush: UniqueResource::new(),
            shared,
            activated: Signal::new(),
        })
    }

    // =========================================================================
    // Association
    // =========================================================================

    /// Validate `window`, create the animation variables and subclass it.
    pub(crate) fn associate(
        &mut self,
        providers: &Providers,
        window: WindowHandle,
        config: SubclassConfig,
        entry: RegistryEntry,
    ) -> WidgetResult<()> {
        self.base.check_association(providers, window, &config)?;
        let host = providers.host.as_ref();
        check_class(host, window, WindowClass::PushButton, "push button")?;
        let control_id = host.control_id(window)?;

        let rest = self.target(providers, ButtonState::Default);
        let initial: Vec<Color> = rest.colors.iter().flatten().copied().collect();
        let animator = Animator::new(
            providers.animation.clone(),
            StoryboardTag::visual(control_id),
            ButtonState::Default,
            &initial,
            true,
        )?;

        self.base.subclass(providers, &[window], entry)?;
        self.base.associate(window, control_id, config);
        self.animator = Some(animator);
        Ok(())
    }

    // =========================================================================
    // Visual State
    // =========================================================================

    pub(crate) fn state(&self) -> ButtonState {
        self.animator
            .as_ref()
            .map_or(ButtonState::Default, Animator::state)
    }

    pub(crate) fn target(&self, providers: &Providers, state: ButtonState) -> StateTarget {
        match state.look() {
            Some(look) => {
                let theme = providers.theme.as_ref();
                StateTarget::colors([
                    theme.color((self.role)(look, Part::Fill)),
                    theme.color((self.role)(look, Part::Border)),
                    theme.color((self.role)(look, Part::Text)),
                ])
            }
            None => StateTarget::focus(if state == ButtonState::Focus { 1.0 } else { 0.0 }),
        }
    }

    pub(crate) fn transition(&mut self, state: ButtonState) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let target = self.target(&providers, state);
        let window = self.base.window();
        let skip = self.base.config().skip;
        let animator = self.animator.as_mut().ok_or(WidgetError::NotAssociated)?;
        animator.start(&providers, window, &skip, state, &target)
    }

    /// Replay the current state with freshly resolved theme colors.
    pub(crate) fn replay(&mut self) -> WidgetResult<()> {
        let state = self.state();
        self.transition(state)
    }

    pub(crate) fn frame_colors(&self) -> WidgetResult<ButtonFrame> {
        let animator = self.animator.as_ref().ok_or(WidgetError::NotAssociated)?;
        Ok(ButtonFrame {
            fill: animator.color(FILL)?,
            border: animator.color(BORDER)?,
            content: animator.color(CONTENT)?,
            focus: animator.focus_opacity()?,
        })
    }

    // =========================================================================
    // Activation
    // =========================================================================

    pub(crate) fn activated(&self) -> &Signal<()> {
        &self.activated
    }

    /// Notify the parent and emit `activated`.
    pub(crate) fn activate(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let window = self.base.window();
        if window.is_null() {
            return Err(WidgetError::NotAssociated);
        }
        tracing::debug!(target: targets::BUTTON, %window, "activated");
        providers.host.notify_parent(window, Notification::Activated);
        self.activated.emit(());
        Ok(())
    }

    // =========================================================================
    // Device Resources
    // =========================================================================

    /// The surface, the per-instance brush and the shared focus ring,
    /// creating whichever is missing.
    fn device_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, Arc<Mutex<Brush>>)> {
        let theme = providers.theme.as_ref();
        let surface = self.surface.get_or_bind(providers, self.base.window())?;
        let brush = self
            .brush
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let ring = self.shared.focus_ring().get_or_try_create(|| {
            tracing::debug!(target: targets::BUTTON, "creating shared focus ring brush");
            surface
                .create_solid_brush(theme.color(ColorRole::FocusRing))
                .map(Mutex::new)
        })?;
        Ok((surface, brush, ring))
    }

    pub(crate) fn create_device_resources(&mut self, providers: &Providers) -> WidgetResult<()> {
        self.device_resources(providers).map(|_| ())
    }

    /// Drop the surface and per-instance resources, plus this type's shared
    /// resources.
    pub(crate) fn release_device_resources(&mut self) {
        self.release_instance_resources();
        self.base.system().shared_resources().release::<R>();
    }

    pub(crate) fn release_instance_resources(&mut self) {
        self.surface.release();
        self.brush.release();
    }

    /// Rebuild per-instance resources and replay the current state.
    pub(crate) fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        self.release_instance_resources();
        self.create_device_resources(&providers)?;
        self.replay()?;
        providers.host.invalidate(self.base.window());
        Ok(())
    }

    /// Undo a partial `set_window`, or tear down after the window died.
    pub(crate) fn abandon(&mut self, providers: &Providers) {
        self.base.reset(providers.host.as_ref());
        self.animator = None;
        self.pointer = PointerState::default();
        self.release_instance_resources();
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Draw one frame: background, body, border, `content`, focus ring.
    ///
    /// Every resource is created before drawing begins, so only
    /// `begin_draw`/`end_draw` can fail once a frame is open.
    pub(crate) fn draw_frame(
        &mut self,
        providers: &Providers,
        colors: &ButtonFrame,
        content: impl FnOnce(&mut dyn DrawSurface, &mut Brush, Rect),
    ) -> WidgetResult<()> {
        let background = self.base.background(providers);
        let radius = providers.theme.corner_radius();
        let (surface, brush, ring) = self.device_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        let body = RoundedRect::new(bounds.deflate(2.0), radius);
        surface.clear(background);

        brush.set_color(colors.fill);
        surface.fill_round_rect(body, brush);
        brush.set_color(colors.border);
        surface.draw_round_rect(body, brush, 1.0);

        content(&mut **surface, brush, body.rect);

        if colors.focus > 0.0 {
            let mut ring = ring.lock();
            let color = ring.color().with_alpha(colors.focus as f32);
            ring.set_color(color);
            surface.draw_round_rect(RoundedRect::new(bounds.deflate(0.5), radius + 1.5), &ring, 1.0);
        }
        surface.end_draw()?;
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Messages every push-style button handles the same way.
    pub(crate) fn handle_common(&mut self, message: &Message) -> Option<MessageResult> {
        match *message {
            Message::EraseBackground => Some(MessageResult::Handled(1)),
            Message::GetDialogCode => Some(MessageResult::Handled(DLGC_WANT_ALL_KEYS)),
            Message::Timer(ANIMATION_TIMER) => {
                let window = self.base.window();
                if let (Ok(providers), Some(animator)) = (self.base.providers(), &mut self.animator) {
                    animator.on_timer(&providers, window);
                }
                Some(MessageResult::Handled(0))
            }
            Message::Destroy => {
                if let Ok(providers) = self.base.providers() {
                    self.abandon(&providers);
                }
                Some(MessageResult::Handled(0))
            }
            _ => None,
        }
    }
}
