//! Drop-down list widget.
//!
//! [`DropdownWidget`] owner-draws a drop-down-list combo box and its popup
//! list. The popup is opened and closed by the widget itself (click, Enter
//! or Space toggles it, Escape and focus loss close it) so both windows are
//! always painted by this crate.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{StoryboardTag, WindowHandle};
use veneer_render::{
    Brush, Color, DrawSurface, HorizontalAlign, PaintReport, Rect, RoundedRect, SharedResource,
    SharedResourceSet, TextFormat, TextFormatSpec, UniqueResource, paint_with_recovery,
};
use veneer_style::{ButtonLook, ColorRole, Part};

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{ComboStyle, WindowClass};
use crate::message::{DLGC_WANT_ALL_KEYS, Key, Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::check_class;
use crate::widget::timer::ANIMATION_TIMER;
use crate::widget::{
    Animator, Interactive, Phase, PointerState, StateMap, StateTarget, SubclassWidget, SurfaceSlot,
    VisualState, WidgetBase, WidgetKind, drive,
};
use crate::widgets::{input_result, paint_result};

const CAPTION_SCALE: f32 = 0.45;
/// Vertical space added around the measured line height of a popup row.
const ITEM_PADDING: f32 = 8.0;
const TEXT_INSET: f32 = 8.0;
const ARROW_WIDTH: f32 = 20.0;
const ARROW: &str = "\u{25BE}";

const FILL: usize = 0;
const BORDER: usize = 1;
const TEXT: usize = 2;

/// Visual states of a drop-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownState {
    Default,
    /// Pressed, or the popup is open.
    Active,
    Focus,
    FocusLost,
}

impl VisualState for DropdownState {
    fn phase(self) -> Phase {
        match self {
            DropdownState::Default => Phase::Default,
            DropdownState::Active => Phase::Active,
            DropdownState::Focus | DropdownState::FocusLost => Phase::Focus,
        }
    }
}

impl DropdownState {
    fn look(self) -> Option<ButtonLook> {
        match self {
            DropdownState::Default => Some(ButtonLook::Default),
            DropdownState::Active => Some(ButtonLook::Active),
            DropdownState::Focus | DropdownState::FocusLost => None,
        }
    }
}

#[derive(Default)]
pub(crate) struct DropdownResources {
    focus_ring: SharedResource<Mutex<Brush>>,
    popup_border: SharedResource<Brush>,
}

impl SharedResourceSet for DropdownResources {
    fn release(&self) {
        self.focus_ring.release();
        self.popup_border.release();
    }
}

/// An owner-drawn drop-down list.
pub struct DropdownWidget {
    base: WidgetBase,
    animator: Option<Animator<DropdownState>>,
    pointer: PointerState,
    list: WindowHandle,
    open: bool,
    item_height: f32,
    surface: SurfaceSlot,
    popup_surface: SurfaceSlot,
    brush: UniqueResource<Brush>,
    popup_brush: UniqueResource<Brush>,
    caption_format: UniqueResource<TextFormat>,
    shared: Arc<DropdownResources>,
    this: Weak<Mutex<Self>>,
}

impl DropdownWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let base = WidgetBase::new(system, WidgetKind::Dropdown)?;
        let shared = system.shared_resources().get_or_insert::<DropdownResources>();
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                base,
                animator: None,
                pointer: PointerState::default(),
                list: WindowHandle::NULL,
                open: false,
                item_height: 0.0,
                surface: SurfaceSlot::new(),
                popup_surface: SurfaceSlot::new(),
                brush: UniqueResource::new(),
                popup_brush: UniqueResource::new(),
                caption_format: UniqueResource::new(),
                shared,
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a drop-down-list combo box.
    ///
    /// Subclasses the combo box and its popup list, strips the popup's
    /// native frame and sizes the popup rows to fit the caption font.
    pub fn set_window(&mut self, window: WindowHandle, config: SubclassConfig) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.base.check_association(&providers, window, &config)?;
        let host = providers.host.as_ref();
        check_class(host, window, WindowClass::ComboBox, "combo box")?;
        let info = host.combo_info(window)?;
        if info.style != ComboStyle::DropDownList {
            return Err(WidgetError::InvalidConfig(format!(
                "combo box {window} has style {:?}, expected a drop-down list",
                info.style
            )));
        }
        let control_id = host.control_id(window)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;

        let rest = target(&providers, DropdownState::Default);
        let initial: Vec<Color> = rest.colors.iter().flatten().copied().collect();
        let animator = Animator::new(
            providers.animation.clone(),
            StoryboardTag::visual(control_id),
            DropdownState::Default,
            &initial,
            true,
        )?;

        self.base
            .subclass(&providers, &[window, info.list], RegistryEntry::new(this))?;
        self.base.associate(window, control_id, config);
        self.animator = Some(animator);
        self.list = info.list;

        if let Err(err) = self.finish_setup(&providers) {
            tracing::error!(target: targets::DROPDOWN, %window, error = %err, "drop-down setup failed");
            self.abandon(&providers);
            return Err(err);
        }
        tracing::debug!(target: targets::DROPDOWN, %window, list = %self.list, item_height = self.item_height, "drop-down associated");
        Ok(())
    }

    fn finish_setup(&mut self, providers: &Providers) -> WidgetResult<()> {
        let host = providers.host.as_ref();
        host.strip_popup_frame(self.list)?;
        self.create_device_resources()?;
        self.apply_item_height(providers)
    }

    /// Size popup rows from the caption font's line height.
    fn apply_item_height(&mut self, providers: &Providers) -> WidgetResult<()> {
        let format = self.caption_format(providers)?;
        let line = providers.graphics.measure_text("Ag", &format)?;
        self.item_height = line.height + ITEM_PADDING;
        providers
            .host
            .set_item_height(self.base.window(), self.item_height)?;
        Ok(())
    }

    pub fn state(&self) -> DropdownState {
        self.animator
            .as_ref()
            .map_or(DropdownState::Default, Animator::state)
    }

    /// The popup list window, or the null handle before `set_window`.
    pub fn list_window(&self) -> WindowHandle {
        self.list
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    /// Text of the selected item.
    pub fn selected_text(&self) -> WidgetResult<Option<String>> {
        let providers = self.base.providers()?;
        let combo = self.base.window();
        let items = providers.host.combo_items(combo);
        Ok(providers
            .host
            .combo_selection(combo)
            .and_then(|index| items.get(index).cloned()))
    }

    /// Open or close the popup.
    pub fn show_popup(&mut self, open: bool) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        let combo = self.base.window();
        providers.host.show_dropdown(combo, open);
        self.open = open;
        providers.host.invalidate(combo);
        tracing::trace!(target: targets::DROPDOWN, window = %combo, open, "popup toggled");
        Ok(())
    }

    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.combo_resources(&providers)?;
        self.caption_format(&providers)?;
        Ok(())
    }

    pub fn release_shared_device_resources(system: &SubclassSystem) {
        system.shared_resources().release::<DropdownResources>();
    }

    fn transition(&mut self, state: DropdownState) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        let target = target(&providers, state);
        let window = self.base.window();
        let skip = self.base.config().skip;
        let animator = self.animator.as_mut().ok_or(WidgetError::NotAssociated)?;
        animator.start(&providers, window, &skip, state, &target)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint the combo box.
    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let animator = self.animator.as_ref().ok_or(WidgetError::NotAssociated)?;
        let colors = animator.colors()?;
        let focus = animator.focus_opacity()?;
        let caption = self.selected_text()?.unwrap_or_default();
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |dropdown| dropdown.draw_combo(&providers, &colors, focus, &caption),
            |dropdown| {
                dropdown.rebuild();
                Ok(())
            },
        )
    }

    /// Paint the popup list.
    pub fn paint_popup(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let combo = self.base.window();
        if combo.is_null() {
            return Err(WidgetError::NotAssociated);
        }
        let items = providers.host.combo_items(combo);
        let selection = providers.host.combo_selection(combo);
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |dropdown| dropdown.draw_popup(&providers, &items, selection),
            |dropdown| {
                dropdown.rebuild();
                Ok(())
            },
        )
    }

    fn combo_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, Arc<Mutex<Brush>>)> {
        let theme = providers.theme.as_ref();
        let surface = self.surface.get_or_bind(providers, self.base.window())?;
        let brush = self
            .brush
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let ring = self.shared.focus_ring.get_or_try_create(|| {
            tracing::debug!(target: targets::DROPDOWN, "creating shared focus ring brush");
            surface
                .create_solid_brush(theme.color(ColorRole::FocusRing))
                .map(Mutex::new)
        })?;
        Ok((surface, brush, ring))
    }

    fn popup_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, Arc<Brush>)> {
        let theme = providers.theme.as_ref();
        let surface = self.popup_surface.get_or_bind(providers, self.list)?;
        let brush = self
            .popup_brush
            .get_or_try_create(|| surface.create_solid_brush(Color::TRANSPARENT))?;
        let border = self.shared.popup_border.get_or_try_create(|| {
            surface.create_solid_brush(theme.color(ColorRole::DropdownPopupBorder))
        })?;
        Ok((surface, brush, border))
    }

    fn draw_combo(
        &mut self,
        providers: &Providers,
        colors: &[Color],
        focus: f64,
        caption: &str,
    ) -> WidgetResult<()> {
        let format = self.caption_format(providers)?;
        let background = self.base.background(providers);
        let radius = providers.theme.corner_radius();
        let (surface, brush, ring) = self.combo_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        let body = RoundedRect::new(bounds.deflate(2.0), radius);
        surface.clear(background);
        brush.set_color(colors[FILL]);
        surface.fill_round_rect(body, brush);
        brush.set_color(colors[BORDER]);
        surface.draw_round_rect(body, brush, 1.0);

        let text = Rect::new(
            body.rect.left() + TEXT_INSET,
            body.rect.top(),
            (body.rect.width() - TEXT_INSET - ARROW_WIDTH).max(0.0),
            body.rect.height(),
        );
        let arrow = Rect::new(
            body.rect.right() - ARROW_WIDTH,
            body.rect.top(),
            ARROW_WIDTH,
            body.rect.height(),
        );
        brush.set_color(colors[TEXT]);
        surface.draw_text(caption, &format, text, brush);
        surface.draw_text(ARROW, &format, arrow, brush);

        if focus > 0.0 {
            let mut ring = ring.lock();
            let color = ring.color().with_alpha(focus as f32);
            ring.set_color(color);
            surface.draw_round_rect(RoundedRect::new(bounds.deflate(0.5), radius + 1.5), &ring, 1.0);
        }
        surface.end_draw()?;
        Ok(())
    }

    fn draw_popup(
        &mut self,
        providers: &Providers,
        items: &[String],
        selection: Option<usize>,
    ) -> WidgetResult<()> {
        let format = self.caption_format(providers)?;
        let theme = providers.theme.clone();
        let row_height = self.item_height;
        let (surface, brush, border) = self.popup_resources(providers)?;

        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        surface.clear(theme.color(ColorRole::DropdownItem { selected: false }));
        for (index, item) in items.iter().enumerate() {
            let selected = selection == Some(index);
            let row = Rect::new(0.0, index as f32 * row_height, bounds.width(), row_height);
            brush.set_color(theme.color(ColorRole::DropdownItem { selected }));
            surface.fill_rect(row, brush);
            brush.set_color(theme.color(ColorRole::DropdownItemText { selected }));
            let text = Rect::new(
                row.left() + TEXT_INSET,
                row.top(),
                (row.width() - 2.0 * TEXT_INSET).max(0.0),
                row.height(),
            );
            surface.draw_text(item, &format, text, brush);
        }
        surface.draw_rect(bounds.deflate(0.5), &border, 1.0);
        surface.end_draw()?;
        Ok(())
    }

    fn caption_format(&mut self, providers: &Providers) -> WidgetResult<TextFormat> {
        let height = providers.host.client_rect(self.base.window())?.height();
        let size = self.base.config().text_scale.font_size(height, CAPTION_SCALE);
        let format = self.caption_format.get_or_try_create(|| {
            let spec = TextFormatSpec::new(providers.theme.font_family(), size)
                .with_align(HorizontalAlign::Left);
            providers.graphics.create_text_format(&spec)
        })?;
        Ok(format.clone())
    }

    fn release_instance_resources(&mut self) {
        self.surface.release();
        self.popup_surface.release();
        self.brush.release();
        self.popup_brush.release();
        self.caption_format.release();
    }

    fn rebuild(&mut self) {
        self.release_instance_resources();
        self.base
            .system()
            .shared_resources()
            .release::<DropdownResources>();
    }

    fn abandon(&mut self, providers: &Providers) {
        self.base.reset(providers.host.as_ref());
        self.animator = None;
        self.pointer = PointerState::default();
        self.list = WindowHandle::NULL;
        self.open = false;
        self.release_instance_resources();
    }

    fn close_popup(&mut self) -> bool {
        if !self.open {
            return false;
        }
        if let Err(err) = self.show_popup(false) {
            tracing::warn!(target: targets::DROPDOWN, error = %err, "failed to close popup");
        }
        true
    }

    fn handle_combo_message(&mut self, providers: &Providers, window: WindowHandle, message: &Message) -> MessageResult {
        match *message {
            Message::GetDialogCode => MessageResult::Handled(DLGC_WANT_ALL_KEYS),
            Message::Paint => paint_result(WidgetKind::Dropdown, window, self.paint()),
            Message::Timer(ANIMATION_TIMER) => {
                if let Some(animator) = &mut self.animator {
                    animator.on_timer(providers, window);
                }
                MessageResult::Handled(0)
            }
            Message::KeyDown(Key::Escape) => {
                if !self.close_popup() {
                    return MessageResult::Default;
                }
                let result = self.transition(DropdownState::Default);
                input_result(WidgetKind::Dropdown, window, Some(result))
            }
            Message::KeyDown(Key::Up | Key::Down) => {
                // The native control moves the selection; both windows show it.
                providers.host.invalidate(window);
                providers.host.invalidate(self.list);
                MessageResult::Default
            }
            Message::KillFocus => {
                self.close_popup();
                let outcome = drive(self, providers.host.as_ref(), message);
                input_result(WidgetKind::Dropdown, window, outcome)
            }
            _ => {
                let outcome = drive(self, providers.host.as_ref(), message);
                input_result(WidgetKind::Dropdown, window, outcome)
            }
        }
    }
}

fn target(providers: &Providers, state: DropdownState) -> StateTarget {
    match state.look() {
        Some(look) => {
            let theme = providers.theme.as_ref();
            StateTarget::colors([
                theme.color(ColorRole::Dropdown(look, Part::Fill)),
                theme.color(ColorRole::Dropdown(look, Part::Border)),
                theme.color(ColorRole::Dropdown(look, Part::Text)),
            ])
        }
        None => StateTarget::focus(if state == DropdownState::Focus { 1.0 } else { 0.0 }),
    }
}

impl Interactive for DropdownWidget {
    type State = DropdownState;

    fn input_window(&self) -> WindowHandle {
        self.base.window()
    }

    fn pointer(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    /// A drop-down has no hover look; it stays active while open.
    fn state_map(&self) -> StateMap<DropdownState> {
        let rest = if self.open {
            DropdownState::Active
        } else {
            DropdownState::Default
        };
        StateMap {
            rest,
            hover: rest,
            pressed: DropdownState::Active,
            focus: DropdownState::Focus,
            focus_lost: DropdownState::FocusLost,
        }
    }

    fn transition(&mut self, state: DropdownState) -> WidgetResult<()> {
        DropdownWidget::transition(self, state)
    }

    fn on_activate(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        // The native control may have closed the popup on a selection.
        let open = !providers.host.is_dropped_down(self.base.window());
        self.show_popup(open)
    }
}

impl SubclassWidget for DropdownWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Dropdown
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        let Ok(providers) = self.base.providers() else {
            return MessageResult::Default;
        };
        match *message {
            Message::Destroy => {
                self.abandon(&providers);
                MessageResult::Handled(0)
            }
            Message::EraseBackground => MessageResult::Handled(1),
            Message::Size(_) => {
                if let Err(err) = self.refresh() {
                    tracing::warn!(target: targets::DROPDOWN, %window, error = %err, "resize failed");
                }
                MessageResult::Default
            }
            Message::Paint if window == self.list => {
                paint_result(WidgetKind::Dropdown, window, self.paint_popup())
            }
            _ if window == self.list => MessageResult::Default,
            _ => self.handle_combo_message(&providers, window, message),
        }
    }

    /// Rebuild resources, resize the popup rows and replay the state.
    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        self.release_instance_resources();
        self.create_device_resources()?;
        self.apply_item_height(&providers)?;
        self.transition(self.state())?;
        providers.host.invalidate(self.base.window());
        providers.host.invalidate(self.list);
        Ok(())
    }
}
